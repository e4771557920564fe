//! Joke text validation.
//!
//! Every text that reaches the store passes through [`JokeText::parse`], so the
//! store never sees blank input and never has to trim.

use std::fmt;

use super::error::DomainError;

/// Trimmed, non-empty joke text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JokeText(String);

impl JokeText {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("joke", "text must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JokeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let text = JokeText::parse("  What's orange and sounds like a parrot?\n").expect("text");
        assert_eq!(text.as_str(), "What's orange and sounds like a parrot?");
    }

    #[test]
    fn parse_rejects_empty_input() {
        let err = JokeText::parse("").expect_err("empty text must fail");
        assert!(matches!(err, DomainError::Validation { field: "joke", .. }));
    }

    #[test]
    fn parse_rejects_whitespace_only_input() {
        assert!(JokeText::parse(" \t\r\n ").is_err());
    }
}
