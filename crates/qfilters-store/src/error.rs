//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur when building predicates or executing queries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Lookup name is not one of the supported operators.
    #[error("unknown lookup '{0}'")]
    UnknownLookup(String),

    /// Operand shape does not fit the lookup.
    #[error("lookup '{lookup}' on '{field}' expects {expected}")]
    InvalidOperand {
        field: String,
        lookup: &'static str,
        expected: &'static str,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
