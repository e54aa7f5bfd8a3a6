//! Placeholder filling for assembled prompts
//!
//! Component texts may carry `{name}` placeholders (for example a worked
//! solution framed as `{example_problem}` / `{example_solution}`) that are
//! filled per problem after assembly. Only keys that have a value are
//! replaced; every other brace is left alone so LaTeX such as `\frac{1}{2}`
//! passes through untouched.

use std::collections::BTreeMap;

/// Placeholder used for the problem statement itself.
pub const PROBLEM_KEY: &str = "problem";
/// Placeholder for a worked example's problem text.
pub const EXAMPLE_PROBLEM_KEY: &str = "example_problem";
/// Placeholder for a worked example's solution text.
pub const EXAMPLE_SOLUTION_KEY: &str = "example_solution";

/// Values to substitute into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues {
    values: BTreeMap<String, String>,
}

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Single-pass placeholder renderer
pub struct PromptTemplate;

impl PromptTemplate {
    /// Replace every `{key}` that has a value. Substituted text is never
    /// re-scanned.
    pub fn render(template: &str, values: &TemplateValues) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    if let Some(value) = values.get(key) {
                        out.push_str(value);
                        rest = &after[close + 1..];
                    } else {
                        out.push('{');
                        rest = after;
                    }
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholder keys referenced in a template (in order, with repeats).
    pub fn placeholders(template: &str) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let key = &after[..close];
            if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                keys.push(key);
            }
            rest = after;
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_known_keys() {
        let values = TemplateValues::new()
            .with(EXAMPLE_PROBLEM_KEY, "1+1?")
            .with(EXAMPLE_SOLUTION_KEY, "2");
        let rendered = PromptTemplate::render(
            "Example problem:\n{example_problem}\nExample solution:\n{example_solution}",
            &values,
        );
        assert_eq!(rendered, "Example problem:\n1+1?\nExample solution:\n2");
    }

    #[test]
    fn test_render_leaves_latex_alone() {
        let values = TemplateValues::new().with(PROBLEM_KEY, "x");
        let rendered = PromptTemplate::render(r"Compute \frac{1}{2} for {problem}", &values);
        assert_eq!(rendered, r"Compute \frac{1}{2} for x");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let values = TemplateValues::new()
            .with(PROBLEM_KEY, "{example_solution}")
            .with(EXAMPLE_SOLUTION_KEY, "leak");
        let rendered = PromptTemplate::render("{problem}", &values);
        assert_eq!(rendered, "{example_solution}");
    }

    #[test]
    fn test_render_unbalanced_brace() {
        let rendered = PromptTemplate::render("open { only", &TemplateValues::new());
        assert_eq!(rendered, "open { only");
    }

    #[test]
    fn test_placeholders() {
        let keys = PromptTemplate::placeholders(r"{example_problem} and \frac{1}{2} {example_solution}");
        assert_eq!(keys, vec!["example_problem", "1", "2", "example_solution"]);
    }
}
