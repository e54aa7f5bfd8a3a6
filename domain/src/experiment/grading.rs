//! Answer extraction and grading for math-reasoning responses
//!
//! An answer is correct when it matches the ground truth after either of two
//! string normalizations:
//!
//! 1. [`strip_answer`]: the MATH-dataset style cleanup (`\dfrac` → `\frac`,
//!    `\frac12` → `\frac{1}{2}`, `3/4` → `\frac{3}{4}`, units and spaces
//!    removed, `k = ` prefixes dropped).
//! 2. [`normalize_answer`]: a looser form (no braces, no units, lowercase,
//!    integer-valued decimals collapsed), compared element-wise for tuples
//!    and intervals with numeric equality for plain numbers.
//!
//! There is no symbolic algebra here; expressions that only agree after
//! simplification are graded incorrect.

use regex::Regex;
use std::sync::LazyLock;

const ANSWER_OPEN: &str = "<answer>";
const ANSWER_CLOSE: &str = "</answer>";
const TUPLE_CHARS: &[char] = &['(', ')', '[', ']'];

static TEXT_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\text\{(?P<text>.+?)\}$").expect("valid regex"));
static UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(degree|cm|centimeter|meter|mile|second|minute|hour|day|week|month|year|foot|feet|inch|yard)(es)?(s)? *(\^[0-9]+)?",
    )
    .expect("valid regex")
});
static DEGREE_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^ *\\circ").expect("valid regex"));
static THIN_SPACE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\\! *").expect("valid regex"));
static LATEX_FRAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\frac\{([^{}]*)\}\{([^{}]*)\}").expect("valid regex"));
static NEGATIVE_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"- *").expect("valid regex"));
static MIXED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]) +([0-9])").expect("valid regex"));
static THOUSANDS_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d),(\d\d\d)($|\D)").expect("valid regex"));
static SIMPLE_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+\.?/0*[1-9][0-9]*\.?$").expect("valid regex"));

/// Text between the first `<answer>` and the first `</answer>`.
///
/// Returns an empty string when either tag is missing or they are out of order.
pub fn extract_answer(response: &str) -> String {
    let (Some(start), Some(end)) = (response.find(ANSWER_OPEN), response.find(ANSWER_CLOSE)) else {
        return String::new();
    };
    let from = start + ANSWER_OPEN.len();
    if end < from {
        return String::new();
    }
    response[from..end].to_string()
}

/// Grade `given` against `ground_truth`.
pub fn grade_answer(given: &str, ground_truth: &str) -> bool {
    if given.trim().is_empty() {
        return false;
    }

    if strip_answer(given) == strip_answer(ground_truth) {
        return true;
    }

    let truth = normalize_answer(ground_truth);
    let given = normalize_answer(given);
    if truth == given {
        return true;
    }
    if given.is_empty() {
        return false;
    }

    let truth_elems = split_tuple(&truth);
    let given_elems = split_tuple(&given);

    if truth_elems.len() > 1 && (truth.chars().next() != given.chars().next()
        || truth.chars().last() != given.chars().last())
    {
        return false;
    }
    if truth_elems.len() != given_elems.len() {
        return false;
    }

    truth_elems
        .iter()
        .zip(&given_elems)
        .all(|(t, g)| elements_equal(t, g))
}

fn elements_equal(truth: &str, given: &str) -> bool {
    if SIMPLE_FRACTION.is_match(truth) && SIMPLE_FRACTION.is_match(given) {
        // Unreduced fractions must match exactly.
        return truth == given;
    }
    if str_is_int(truth) != str_is_int(given) {
        return false;
    }
    match (evaluate(truth), evaluate(given)) {
        (Some(a), Some(b)) => (a - b).abs() <= 1e-6 * a.abs().max(1.0),
        _ => truth == given,
    }
}

/// Evaluate a plain number or an `a/b` fraction.
fn evaluate(expr: &str) -> Option<f64> {
    if let Ok(value) = expr.parse::<f64>() {
        return Some(value);
    }
    let (num, den) = expr.split_once('/')?;
    let num: f64 = num.trim_end_matches('.').parse().ok()?;
    let den: f64 = den.trim_end_matches('.').parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn str_is_int(expr: &str) -> bool {
    let cleaned = expr.replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) => (value - value.round()).abs() <= 1e-7,
        Err(_) => false,
    }
}

fn split_tuple(expr: &str) -> Vec<String> {
    let expr = strip_thousands_commas(expr);
    if expr.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = expr.chars().collect();
    let first = chars[0];
    let last = chars[chars.len() - 1];
    let inner: String = chars[1..chars.len().saturating_sub(1).max(1)].iter().collect();
    if chars.len() > 2
        && TUPLE_CHARS.contains(&first)
        && TUPLE_CHARS.contains(&last)
        && !inner.contains(TUPLE_CHARS)
    {
        inner.split(',').map(|e| e.trim().to_string()).collect()
    } else {
        vec![expr]
    }
}

fn strip_thousands_commas(expr: &str) -> String {
    let mut current = expr.to_string();
    loop {
        let next = THOUSANDS_COMMA.replace_all(&current, "$1$2$3").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn unwrap_text(expr: &str) -> String {
    match TEXT_WRAPPER.captures(expr) {
        Some(caps) => caps["text"].to_string(),
        None => expr.to_string(),
    }
}

/// MATH-dataset style normalization.
pub fn strip_answer(answer: &str) -> String {
    let mut s = unwrap_text(answer.trim()).trim().to_string();
    if s.is_empty() {
        return s;
    }

    for (old, new) in [
        ("\n", ""),
        ("\\\\", "\\"),
        ("tfrac", "frac"),
        ("dfrac", "frac"),
        ("\\left", ""),
        ("\\right", ""),
        ("^{\\circ}", ""),
        ("^\\circ", ""),
        ("\\$", ""),
        ("\\%", ""),
        (" .", " 0."),
        ("{.", "{0."),
        ("\\!", ""),
    ] {
        s = s.replace(old, new);
    }

    if s.starts_with('.') {
        s.insert(0, '0');
    }

    // Units written as "\text{ cm}" trail the value.
    if let Some((value, _)) = s.split_once("\\text{ ") {
        s = value.to_string();
    }

    // "k = 3" -> "3"
    let parts: Vec<&str> = s.split('=').collect();
    if parts.len() == 2 && parts[0].len() <= 2 {
        s = parts[1].to_string();
    }

    s = fix_sqrt(&s);
    s.retain(|c| c != ' ');
    s = fix_fracs(&s);

    if s == "0.5" {
        s = "\\frac{1}{2}".to_string();
    }

    fix_a_slash_b(&s)
}

fn fix_sqrt(s: &str) -> String {
    if !s.contains("\\sqrt") {
        return s.to_string();
    }
    let mut parts = s.split("\\sqrt");
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str("\\sqrt");
        let mut chars = part.chars();
        match chars.next() {
            Some('{') | None => out.push_str(part),
            Some(c) => {
                out.push('{');
                out.push(c);
                out.push('}');
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn fix_fracs(s: &str) -> String {
    let mut parts = s.split("\\frac");
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str("\\frac");
        let chars: Vec<char> = part.chars().collect();
        if chars.first() == Some(&'{') {
            out.push_str(part);
            continue;
        }
        if chars.len() < 2 {
            return s.to_string();
        }
        let (a, b) = (chars[0], chars[1]);
        let tail: String = chars[2..].iter().collect();
        if b == '{' {
            out.push_str(&format!("{{{}}}{}{}", a, b, tail));
        } else {
            out.push_str(&format!("{{{}}}{{{}}}{}", a, b, tail));
        }
    }
    out
}

fn fix_a_slash_b(s: &str) -> String {
    let Some((a, b)) = s.split_once('/') else {
        return s.to_string();
    };
    if b.contains('/') {
        return s.to_string();
    }
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a_num), Ok(b_num)) if s == format!("{}/{}", a_num, b_num) => {
            format!("\\frac{{{}}}{{{}}}", a_num, b_num)
        }
        _ => s.to_string(),
    }
}

/// Loose normalization used for element-wise comparison.
pub fn normalize_answer(answer: &str) -> String {
    let mut s = unwrap_text(answer);

    for (old, new) in [
        ("\\%", "%"),
        ("\\$", "$"),
        ("$", ""),
        ("%", ""),
        (" or ", " , "),
        (" and ", " , "),
        ("million", "*10^6"),
        ("billion", "*10^9"),
        ("trillion", "*10^12"),
    ] {
        s = s.replace(old, new);
    }

    s = UNITS.replace_all(&s, "").into_owned();
    s = DEGREE_MARK.replace_all(&s, "").into_owned();

    if s.len() > 1 && s.starts_with('{') && s.ends_with('}') {
        s = s[1..s.len() - 1].to_string();
    }

    s = THIN_SPACE_COMMA.replace_all(&s, "").into_owned();

    if let Ok(value) = s.trim().parse::<f64>()
        && (value - value.round()).abs() <= 1e-7
    {
        s = format!("{}", value.round() as i64);
    }

    if s.contains('\\') {
        s = s.replace("\\left", "").replace("\\right", "");
        s = s.replace("\\dfrac", "\\frac").replace("\\tfrac", "\\frac");
        s = LATEX_FRAC.replace_all(&s, "$1/$2").into_owned();
        s = s.replace("\\pi", "pi").replace("\\cdot", "*").replace("\\", "");
    }

    s = NEGATIVE_GAP.replace_all(&s, "-").into_owned();
    s = MIXED_NUMBER.replace_all(&s, "$1+$2").into_owned();
    s.retain(|c| c != ' ' && c != '{' && c != '}');
    s = s.to_lowercase();

    let cleaned = s.replace(',', "");
    if str_is_int(&s)
        && let Ok(value) = cleaned.parse::<f64>()
    {
        s = format!("{}", value.round() as i64);
    }

    s
}
