//! String operations exposed by the service.

use thiserror::Error;

/// Message carried by [`ServiceError::EmptyInput`].
pub const EMPTY_INPUT_MESSAGE: &str = "Empty string";

/// Errors produced by the string operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The input string was empty.
    #[error("Empty string")]
    EmptyInput,
}

/// Operations provided by the string service.
pub trait StringService: Send + Sync + 'static {
    /// Upper-case the input one character at a time. Fails on the empty string.
    fn uppercase(&self, s: &str) -> Result<String, ServiceError>;

    /// Number of characters in the input.
    fn count(&self, s: &str) -> usize;
}

/// The stateless default implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStringService;

impl StringService for BasicStringService {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        if s.is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        Ok(s.chars().map(upper_char).collect())
    }

    fn count(&self, s: &str) -> usize {
        s.chars().count()
    }
}

/// Upper-case of a single character, or the character itself when its
/// upper-case form is not exactly one character (`ß`, `ﬁ`).
fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase() {
        let svc = BasicStringService;
        assert_eq!(svc.uppercase("abc").unwrap(), "ABC");
        assert_eq!(svc.uppercase("go kit").unwrap(), "GO KIT");
        assert_eq!(svc.uppercase("Already UPPER 123").unwrap(), "ALREADY UPPER 123");
        assert_eq!(svc.uppercase("héllo").unwrap(), "HÉLLO");
    }

    #[test]
    fn test_uppercase_keeps_character_count() {
        let svc = BasicStringService;
        let input = "straße ﬁ";
        let upper = svc.uppercase(input).unwrap();
        assert_eq!(upper, "STRAßE ﬁ");
        assert_eq!(svc.count(&upper), svc.count(input));
    }

    #[test]
    fn test_uppercase_empty() {
        let svc = BasicStringService;
        let err = svc.uppercase("").unwrap_err();
        assert_eq!(err, ServiceError::EmptyInput);
        assert_eq!(err.to_string(), EMPTY_INPUT_MESSAGE);
    }

    #[test]
    fn test_count() {
        let svc = BasicStringService;
        assert_eq!(svc.count(""), 0);
        assert_eq!(svc.count("abc"), 3);
        assert_eq!(svc.count("go kit"), 6);
        // Characters, not bytes
        assert_eq!(svc.count("héllo"), 5);
    }
}
