use anyhow::{Context, Result, bail};
use regex::Regex;

/// Compiled vulnerability signature: a regex with exactly one capture group
/// that extracts the evidence string from a response body.
#[derive(Debug, Clone)]
pub struct Signature {
    pattern: Regex,
}

impl Signature {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("invalid signature pattern: {pattern}"))?;
        // Group 0 is the whole match, so one capture group means len == 2.
        if pattern.captures_len() != 2 {
            bail!("signature pattern must have exactly one capture group");
        }
        Ok(Self { pattern })
    }

    /// Returns the captured evidence when the body matches.
    pub fn matches(&self, body: &str) -> Option<String> {
        self.pattern
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|evidence| evidence.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_body_yields_evidence() {
        let signature = Signature::new(r"vul_function\(\) in <b>(.+?)</b>").unwrap();
        let body = "<html>Warning: vul_function() in <b>/var/www/wp-content/plugin.php</b> on line 12</html>";
        assert_eq!(
            signature.matches(body).as_deref(),
            Some("/var/www/wp-content/plugin.php")
        );
    }

    #[test]
    fn test_clean_body_yields_nothing() {
        let signature = Signature::new(r"vul_function\(\) in <b>(.+?)</b>").unwrap();
        assert!(signature.matches("<html>all good</html>").is_none());
    }

    #[test]
    fn test_rejects_pattern_without_capture_group() {
        assert!(Signature::new(r"vul_function").is_err());
    }

    #[test]
    fn test_rejects_pattern_with_two_capture_groups() {
        assert!(Signature::new(r"(a)(b)").is_err());
    }

    #[test]
    fn test_rejects_invalid_regex() {
        assert!(Signature::new(r"(unclosed").is_err());
    }
}
