//! Error types for filter construction and evaluation.

use qfilters_store::StoreError;

/// Errors that abort filter construction or evaluation.
///
/// Invalid user input is not among them: a field that fails validation is
/// recorded as a [`FieldError`] and otherwise ignored.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The record store rejected a predicate or query.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A filter was configured without a parameter its class needs.
    #[error("Filter '{filter}' requires the '{param}' parameter.")]
    MissingParameter { filter: String, param: &'static str },

    /// A filter received a cleaned value of the wrong shape.
    #[error("Filter '{filter}' expected {expected}.")]
    UnsupportedValue {
        filter: String,
        expected: &'static str,
    },

    /// A field subset named a field the model does not have.
    #[error("Unknown field '{0}'.")]
    UnknownField(String),

    /// Submitted JSON could not be turned into form data.
    #[error("Invalid JSON input: {0}")]
    InvalidJson(String),
}

impl FilterError {
    /// Create a missing-parameter error.
    pub fn missing(filter: impl Into<String>, param: &'static str) -> Self {
        Self::MissingParameter {
            filter: filter.into(),
            param,
        }
    }

    /// Create an unsupported-value error.
    pub fn unsupported(filter: impl Into<String>, expected: &'static str) -> Self {
        Self::UnsupportedValue {
            filter: filter.into(),
            expected,
        }
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// A submitted value failed a field's cleaning step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why cleaning a field did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// The input is invalid for this field.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Listing the field's choices failed.
    #[error(transparent)]
    Source(#[from] FilterError),
}

impl From<StoreError> for CleanError {
    fn from(err: StoreError) -> Self {
        CleanError::Source(FilterError::Store(err))
    }
}

/// A validation failure attributed to one filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub error: ValidationError,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: ValidationError) -> Self {
        FieldError {
            field: field.into(),
            error,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            FilterError::missing("dept", "relation").to_string(),
            "Filter 'dept' requires the 'relation' parameter."
        );
        assert_eq!(
            FilterError::unsupported("grade", "a range").to_string(),
            "Filter 'grade' expected a range."
        );
        let field = FieldError::new("grade", ValidationError::new("Enter a number."));
        assert_eq!(field.to_string(), "grade: Enter a number.");
    }

    #[test]
    fn store_errors_convert() {
        let err: FilterError = StoreError::UnknownLookup("near".into()).into();
        assert!(matches!(err, FilterError::Store(_)));

        let clean: CleanError = StoreError::UnknownLookup("near".into()).into();
        assert!(matches!(clean, CleanError::Source(FilterError::Store(_))));
    }
}
