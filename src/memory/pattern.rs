//! LIKE-style name patterns: `%` matches any run of characters, `_` exactly
//! one. Matching is case-sensitive and anchored at both ends.

use crate::error::{Result, Status};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    regex: Regex,
}

impl LikePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("(?s)^");
        let mut literal = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '%' => source.push_str(".*"),
                '_' => source.push('.'),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| {
            Status::invalid_argument(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Compile an optional filter.
    pub fn compile(pattern: Option<&str>) -> Result<Option<Self>> {
        pattern.map(Self::new).transpose()
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Whether `name` passes an optional filter. An unnamed object only passes
/// when there is no filter.
pub fn passes(filter: Option<&LikePattern>, name: Option<&str>) -> bool {
    match (filter, name) {
        (None, _) => true,
        (Some(pattern), Some(name)) => pattern.is_match(name),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        let pattern = LikePattern::new("user%").unwrap();
        assert!(pattern.is_match("user"));
        assert!(pattern.is_match("users"));
        assert!(pattern.is_match("user_roles"));
        assert!(!pattern.is_match("superuser"));

        let pattern = LikePattern::new("t_").unwrap();
        assert!(pattern.is_match("t1"));
        assert!(!pattern.is_match("t"));
        assert!(!pattern.is_match("t12"));
    }

    #[test]
    fn test_literal_and_case_sensitive() {
        let pattern = LikePattern::new("a.b").unwrap();
        assert!(pattern.is_match("a.b"));
        assert!(!pattern.is_match("axb"));
        assert!(!LikePattern::new("Users").unwrap().is_match("users"));
    }

    #[test]
    fn test_passes() {
        let pattern = LikePattern::new("%").unwrap();
        assert!(passes(None, None));
        assert!(passes(Some(&pattern), Some("")));
        assert!(!passes(Some(&pattern), None));
    }

    #[test]
    fn test_compile_none() {
        assert!(LikePattern::compile(None).unwrap().is_none());
        assert_eq!(
            LikePattern::compile(Some("x%")).unwrap().unwrap().as_str(),
            "x%"
        );
    }
}
