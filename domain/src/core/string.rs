//! String utilities for the domain layer.

/// Replace characters that are not valid in a regression formula term.
///
/// Spaces, hyphens and parentheses become underscores, matching the column
/// names the analysis tooling expects.
pub fn sanitize_column_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '-' | '(' | ')' => '_',
            other => other,
        })
        .collect()
}

/// Replace every character outside `[A-Za-z0-9_-]` with an underscore.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Single-line preview of a prompt for log output (char-count based).
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let kept: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!(sanitize_column_name("Chain of Thought"), "Chain_of_Thought");
        assert_eq!(sanitize_column_name("self-check (v2)"), "self_check__v2_");
        assert_eq!(sanitize_column_name("Role_Assignment"), "Role_Assignment");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("3_test/algebra"), "3_test_algebra");
        assert_eq!(sanitize_identifier("a.b:c"), "a_b_c");
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("Expert.\n\n2+2?", 40), "Expert. 2+2?");
        assert_eq!(preview("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_preview_multibyte() {
        assert_eq!(preview("日本語テスト", 10), "日本語テスト");
        assert_eq!(preview("日本語テスト文字列", 6), "日本語...");
    }
}
