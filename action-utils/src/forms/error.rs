//! Form errors and per-field validation messages

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while creating or reading a form
#[derive(Debug, Error)]
pub enum FormError {
    /// No form type registered under this name
    #[error("could not load form type \"{0}\"")]
    UnknownType(String),

    /// Initial data was not an object
    #[error("form data must be an object, got {0}")]
    InvalidData(String),

    /// A form type failed to build its fields
    #[error("failed to build form \"{form}\": {reason}")]
    Build {
        /// Form name
        form: String,
        /// What went wrong
        reason: String,
    },

    /// Bound data could not be converted into the requested type
    #[error("form data does not match the target type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// A single validation message for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The error message
    pub message: String,
    /// Optional error code for programmatic handling
    pub code: Option<String>,
}

impl FieldError {
    /// Create a field error with just a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create a field error with a message and code
    #[must_use]
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validation messages keyed by field name
///
/// ```rust
/// use action_utils::forms::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("email", "is required");
/// errors.add("email", "must be a valid email address");
///
/// assert!(errors.has_errors());
/// assert_eq!(errors.for_field("email").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, FieldError::new(message));
    }

    /// Add a message with a code for a field
    pub fn add_with_code(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.push(field, FieldError::with_code(message, code));
    }

    fn push(&mut self, field: impl Into<String>, error: FieldError) {
        self.errors.entry(field.into()).or_default().push(error);
    }

    /// Whether any field has a message
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether `field` has a message
    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages for `field`
    #[must_use]
    pub fn for_field(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Total number of messages
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Remove every message
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Iterate in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.errors
            .iter()
            .map(|(field, errors)| (field.as_str(), errors.as_slice()))
    }
}
