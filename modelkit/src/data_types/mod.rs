//! Data types: what a field holds.
//!
//! A data type knows how to produce a sample value, how to turn a value into
//! its serialized form and how to reject values that do not belong to it.
//! The registry never looks inside a data type; it only relies on this trait.

mod composite;
mod scalar;

pub use composite::{ListType, ObjectType};
pub use scalar::{
    BoolType, DateTimeType, EnumType, FloatRange, FloatType, IntRange, IntType, StringType, UuidType,
};

use crate::schema::ModelSchema;
use crate::validation::ValidationError;
use serde_json::Value;
use utoipa::openapi::schema::{KnownFormat, Type};

/// Capability set every field type provides.
///
/// Implementations are stateless or configured once at declaration time, and
/// are shared between threads behind an `Arc`.
pub trait DataType: Send + Sync {
    /// Type name used in diagnostics, e.g. `IntType`
    fn name(&self) -> &'static str;

    /// Produce a sample value
    fn mock(&self) -> Value;

    /// Turn a stored value into its serialized form. Null stays null.
    fn marshal(&self, value: &Value) -> Value;

    /// Reject values of the wrong shape or outside the type's constraints.
    ///
    /// Null handling belongs to the field, so data types never see null from
    /// [`Field::validate`](crate::Field::validate).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the violated constraint.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Interpret a raw string argument (query string, form, header).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the string cannot represent a value
    /// of this type.
    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::String(raw.to_string()))
    }

    /// JSON schema type for API documentation
    fn schema_type(&self) -> Type;

    fn schema_format(&self) -> Option<KnownFormat> {
        None
    }

    /// Closed value set, if the type itself restricts values
    fn allowed_values(&self) -> Option<Vec<Value>> {
        None
    }

    /// Element type of a list type
    fn element_type(&self) -> Option<&dyn DataType> {
        None
    }

    /// Nested registry of an object type
    fn nested_schema(&self) -> Option<&ModelSchema> {
        None
    }
}

impl std::fmt::Debug for dyn DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for dyn DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable JSON type of a value, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
