//! Validation Support
//!
//! Every data type reports rejected values as a [`ValidationError`]. The error
//! carries the field it was raised for, the offending value and a
//! [`ValidationKind`] so that callers can tell a malformed pattern apart from a
//! plain type mismatch.
//!
//! # Example
//!
//! ```rust
//! use modelkit::data_types::{DataType, IntType};
//! use modelkit::validation::ValidationKind;
//! use serde_json::json;
//!
//! let err = IntType.validate(&json!("five")).unwrap_err();
//! assert_eq!(err.kind, ValidationKind::Type);
//! assert_eq!(err.value, json!("five"));
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// What kind of constraint a value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// A non-nullable field held null
    Required,
    /// The JSON type did not match the data type
    Type,
    /// The value is not one of the allowed enum values
    Enum,
    /// A string did not match the expected pattern or format
    Pattern,
    /// A string was too short or too long
    Length,
    /// A number was outside the accepted range
    Range,
    /// Anything raised by user code
    Custom,
}

/// Validation error with field name, offending value and message
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// The field that failed validation (empty until attached to a field)
    pub field: String,
    /// Which constraint was violated
    pub kind: ValidationKind,
    /// Human-readable error message
    pub message: String,
    /// The rejected value
    pub value: Value,
}

impl ValidationError {
    /// Create a new validation error for a field
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationKind::Custom,
            message: message.into(),
            value: Value::Null,
        }
    }

    /// Create an error not yet attached to a field, as data types do
    #[must_use]
    pub fn rejected(kind: ValidationKind, message: impl Into<String>, value: &Value) -> Self {
        Self {
            field: String::new(),
            kind,
            message: message.into(),
            value: value.clone(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ValidationKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Attach the error to a field.
    ///
    /// Nested errors (list elements, object members) already carry a path;
    /// the field name is prefixed to it.
    #[must_use]
    pub fn in_field(mut self, field: &str) -> Self {
        self.field = if self.field.is_empty() {
            field.to_string()
        } else if self.field.starts_with('[') {
            format!("{field}{}", self.field)
        } else {
            format!("{field}.{}", self.field)
        };
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a validation error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if there are any errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was collected.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Helper validators shared by the built-in data types
pub mod validators {
    use super::{ValidationError, ValidationKind};
    use regex::Regex;
    use serde_json::Value;
    use std::fmt;

    /// Validate string length (in characters) is within range
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationKind::Length`] error when out of bounds.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min
            && len < min_len
        {
            return Err(ValidationError::new(
                field,
                format!("Must be at least {min_len} characters"),
            )
            .with_kind(ValidationKind::Length)
            .with_value(Value::from(value)));
        }

        if let Some(max_len) = max
            && len > max_len
        {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max_len} characters"),
            )
            .with_kind(ValidationKind::Length)
            .with_value(Value::from(value)));
        }

        Ok(())
    }

    /// Validate number is within range
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationKind::Range`] error when out of bounds.
    pub fn validate_range<T: PartialOrd + fmt::Display + Into<Value> + Copy>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min
            && value < min_val
        {
            return Err(
                ValidationError::new(field, format!("Must be at least {min_val}"))
                    .with_kind(ValidationKind::Range)
                    .with_value(value.into()),
            );
        }

        if let Some(max_val) = max
            && value > max_val
        {
            return Err(
                ValidationError::new(field, format!("Must be at most {max_val}"))
                    .with_kind(ValidationKind::Range)
                    .with_value(value.into()),
            );
        }

        Ok(())
    }

    /// Validate a string matches a pattern
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationKind::Pattern`] error on mismatch.
    pub fn validate_pattern(field: &str, value: &str, pattern: &Regex) -> Result<(), ValidationError> {
        if pattern.is_match(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("Does not match pattern '{pattern}'"))
                    .with_kind(ValidationKind::Pattern)
                    .with_value(Value::from(value)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error_creation() {
        let err = ValidationError::new("email", "Invalid email");
        assert_eq!(err.field, "email");
        assert_eq!(err.message, "Invalid email");
        assert_eq!(err.kind, ValidationKind::Custom);
    }

    #[test]
    fn test_in_field_prefixes_nested_paths() {
        let err = ValidationError::rejected(ValidationKind::Type, "expected integer", &json!("a"));
        assert_eq!(err.clone().in_field("age").field, "age");

        let nested = err.in_field("[2]").in_field("scores");
        assert_eq!(nested.field, "scores[2]");

        let member = ValidationError::new("street", "bad").in_field("address");
        assert_eq!(member.field, "address.street");
    }

    #[test]
    fn test_display() {
        let err = ValidationError::new("name", "too short");
        assert_eq!(err.to_string(), "name: too short");

        let unattached = ValidationError::rejected(ValidationKind::Enum, "not allowed", &json!(3));
        assert_eq!(unattached.to_string(), "not allowed");
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add(ValidationError::new("field1", "error1"));
        assert_eq!(errors.len(), 1);

        errors.add(ValidationError::new("field2", "error2"));
        assert_eq!(errors.len(), 2);
        assert!(errors.to_string().contains("2 error(s)"));

        assert!(errors.result().is_err());
        assert!(ValidationErrors::default().result().is_ok());
    }

    #[test]
    fn test_validate_length() {
        use validators::validate_length;

        // Too short
        assert!(validate_length("name", "ab", Some(3), None).is_err());

        // Too long
        let err = validate_length("name", "abcdef", None, Some(5)).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Length);
        assert_eq!(err.value, json!("abcdef"));

        // Just right, counted in characters
        assert!(validate_length("name", "äöü", Some(3), Some(3)).is_ok());
    }

    #[test]
    fn test_validate_range() {
        use validators::validate_range;

        // Too small
        assert!(validate_range("age", 5, Some(10), None).is_err());

        // Too large
        let err = validate_range("age", 150, None, Some(120)).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Range);

        // Just right
        assert!(validate_range("age", 25, Some(0), Some(120)).is_ok());
    }

    #[test]
    fn test_validate_pattern() {
        use validators::validate_pattern;

        let code = regex::Regex::new(r"^[A-Z]{3}$").unwrap();
        assert!(validate_pattern("code", "ABC", &code).is_ok());

        let err = validate_pattern("code", "abc", &code).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Pattern);
        assert_eq!(err.field, "code");
    }
}
