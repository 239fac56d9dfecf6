use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed field check on a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors collected while validating one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Errors reported against one field.
    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Error, Debug)]
pub enum OpsdeskError {
    #[error("Not in an opsdesk project. Run 'opsdesk init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .opsdesk/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Not signed in. Run 'opsdesk login' first.")]
    NotAuthenticated,

    #[error("Sign-in failed: {0}")]
    AuthFailed(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Ambiguous id prefix '{0}'. Use more characters or the sequence number.")]
    AmbiguousReference(String),

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("Duplicate entity id: {0}")]
    DuplicateId(String),

    #[error("Cannot {action} an entity with status '{status}'")]
    InvalidTransition { status: String, action: String },

    #[error(
        "Invalid entity type: {0}. Valid types: contact, opportunity, expense, document, invoice, quality_check, signature"
    )]
    InvalidEntityType(String),

    #[error("Index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Workspace changed on disk (loaded revision {expected}, found {found}). Reload and retry.")]
    Conflict { expected: i64, found: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Loro error: {0}")]
    Loro(#[from] loro::LoroError),

    #[error("Loro encode error: {0}")]
    LoroEncode(#[from] loro::LoroEncodeError),
}

pub type Result<T> = std::result::Result<T, OpsdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "is required");
        errors.push("amount", "must be a number");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "name: is required; amount: must be a number");
        assert_eq!(errors.for_field("amount").len(), 1);
    }

    #[test]
    fn test_validation_error_converts_into_crate_error() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "is required");

        let err: OpsdeskError = errors.into();
        assert!(matches!(err, OpsdeskError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("email: is required"));
    }
}
