//! Error types for the resolution tree

use thiserror::Error;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the resolution tree
///
/// Every variant is raised synchronously by the operation that detected it.
/// A rejected operation leaves the tree exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required value was not provided
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    /// A value is present but has the wrong shape
    #[error("Type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A value is well typed but fails its grammar or range
    #[error("Invalid {field} '{value}': {reason}")]
    FormatViolation {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Attempt to rebind a value that is fixed after first assignment
    #[error("Cannot change {field} from '{current}' to '{attempted}'")]
    ImmutabilityViolation {
        field: &'static str,
        current: String,
        attempted: String,
    },

    /// Operation has no implementation yet
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Export refused because at least one location is invalid
    #[error("Resolution tree is not valid; refusing to export")]
    InvalidTree,
}

impl Error {
    pub(crate) fn format(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::FormatViolation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(field: &'static str, expected: &'static str, found: &serde_json::Value) -> Self {
        Error::TypeMismatch {
            field,
            expected,
            found: json_kind(found).to_string(),
        }
    }
}

/// Human readable name of a JSON value's shape
fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mismatch_reports_found_kind() {
        let err = Error::mismatch("signature", "string", &json!(42));
        assert_eq!(
            err.to_string(),
            "Type mismatch for 'signature': expected string, found number"
        );
    }

    #[test]
    fn test_format_violation_message() {
        let err = Error::format("port", "77777", "must be between 1 and 65535");
        assert_eq!(err.to_string(), "Invalid port '77777': must be between 1 and 65535");
    }
}
