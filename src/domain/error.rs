//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the outline format or its
/// document schema. These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("format error on line {line}: {reason}: {text:?}")]
    Format {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("schema error at {path}: {reason}")]
    Schema { path: String, reason: String },

    #[error("source is {size} bytes, limit is {limit}")]
    SizeLimit { size: u64, limit: u64 },

    #[error("source contains markup the sanitizer would alter: {offending:?}")]
    Integrity { offending: String },

    #[error("invalid mastery string: {reason}")]
    InvalidMastery { reason: String },
}

impl DomainError {
    pub(crate) fn format(line: usize, text: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
