//! Error types for loading signatures and matching responses.
//!
//! Loading and matching fail in different ways, so each phase has its own
//! error enum. A header rule that is not `KEY:VALUE` is an error in both
//! phases and is shared between them.

use std::path::PathBuf;

use crate::severity::UnknownSeverity;

/// A `headers`/`no_headers` entry that does not contain exactly one `:`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid header format: {header} should be \"KEY:VALUE\"")]
pub struct InvalidHeaderFormat {
    /// The raw header rule as written in the signature.
    pub header: String,
}

impl InvalidHeaderFormat {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

/// Errors raised while reading, parsing or validating a signatures file.
///
/// Any of these rejects the whole signature set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("path of signatures file is not valid: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("failed to read signatures: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to deserialize signatures: {0}")]
    Deserialization(#[from] serde_yaml::Error),

    #[error("missing or empty {field} in {check} plugin checks.")]
    MissingField { check: String, field: &'static str },

    #[error(transparent)]
    InvalidSeverity(#[from] UnknownSeverity),

    #[error(transparent)]
    InvalidHeaderFormat(#[from] InvalidHeaderFormat),
}

/// Errors raised by the match engine.
///
/// A check that simply does not match is `Ok(false)`, never one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A required input was absent. Holds the parameter name
    /// (`check`, `check.StatusCode` or `resp`).
    #[error("nil parameter: {0}")]
    NilParameter(&'static str),

    #[error(transparent)]
    InvalidHeaderFormat(#[from] InvalidHeaderFormat),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = LoadError::MissingField {
            check: "wp-version".to_string(),
            field: "remediation",
        };
        assert_eq!(
            err.to_string(),
            "missing or empty remediation in wp-version plugin checks."
        );
    }

    #[test]
    fn test_invalid_header_message() {
        let err = InvalidHeaderFormat::new("X-Foo");
        assert_eq!(
            err.to_string(),
            "invalid header format: X-Foo should be \"KEY:VALUE\""
        );
    }

    #[test]
    fn test_header_error_converts_into_both_phases() {
        let load: LoadError = InvalidHeaderFormat::new("a").into();
        assert!(matches!(load, LoadError::InvalidHeaderFormat(_)));

        let matching: MatchError = InvalidHeaderFormat::new("a").into();
        assert_eq!(
            matching,
            MatchError::InvalidHeaderFormat(InvalidHeaderFormat::new("a"))
        );
    }
}
