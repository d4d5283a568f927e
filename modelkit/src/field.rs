//! Field descriptors.
//!
//! A [`Field`] describes one attribute of a model: its data type, whether it
//! may be null, the values it is restricted to, how it is marshalled and how a
//! sample value is produced. Fields are declared without a name; the registry
//! builder names them after the key they are declared under.

use crate::data_types::DataType;
use crate::validation::{ValidationError, ValidationKind};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Produces a sample value for a field
pub type MockFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Turns a stored value into its serialized form
pub type MarshalFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

pub struct Field {
    name: String,
    data_type: Arc<dyn DataType>,
    mock_fn: Option<MockFn>,
    enum_values: Vec<Value>,
    comment: String,
    nullable: bool,
    marshal_fn: MarshalFn,
}

impl Field {
    /// Declare a nullable field whose marshalling is the data type's own.
    pub fn new(data_type: impl DataType + 'static) -> Self {
        Self::from_arc(Arc::new(data_type))
    }

    /// Declare a field over a data type shared with other fields.
    #[must_use]
    pub fn from_arc(data_type: Arc<dyn DataType>) -> Self {
        let marshal_type = Arc::clone(&data_type);
        Self {
            name: String::new(),
            data_type,
            mock_fn: None,
            enum_values: Vec::new(),
            comment: String::new(),
            nullable: true,
            marshal_fn: Arc::new(move |value| marshal_type.marshal(value)),
        }
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Restrict the field to a fixed, ordered set of literal values
    #[must_use]
    pub fn with_enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mock(mut self, mock: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.mock_fn = Some(Arc::new(mock));
        self
    }

    /// Replace the data type's marshalling for this field only
    #[must_use]
    pub fn with_marshal(mut self, marshal: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.marshal_fn = Arc::new(marshal);
        self
    }

    /// Registered name; empty until the field is claimed by a registry
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn claim(&mut self, name: &str) {
        if !self.name.is_empty() && self.name != name {
            tracing::trace!(from = %self.name, to = name, "renaming field descriptor");
        }
        self.name = name.to_string();
    }

    #[must_use]
    pub fn data_type(&self) -> &dyn DataType {
        self.data_type.as_ref()
    }

    #[must_use]
    pub fn enum_values(&self) -> &[Value] {
        &self.enum_values
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn has_mock(&self) -> bool {
        self.mock_fn.is_some()
    }

    pub fn marshal(&self, value: &Value) -> Value {
        (self.marshal_fn)(value)
    }

    /// A sample value: the field's generator, else one of its enum values,
    /// else the data type's own mock.
    pub fn mock(&self) -> Value {
        if let Some(mock) = &self.mock_fn {
            return mock();
        }
        if let Some(value) = self.enum_values.choose(&mut thread_rng()) {
            return value.clone();
        }
        self.data_type.mock()
    }

    /// Check a candidate value against nullability, the enum restriction and
    /// the data type, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, tagged with this field's name.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.nullable {
                return Ok(());
            }
            return Err(
                ValidationError::rejected(ValidationKind::Required, "field must not be null", value)
                    .in_field(&self.name),
            );
        }

        if !self.enum_values.is_empty() && !self.enum_values.contains(value) {
            let allowed: Vec<String> = self.enum_values.iter().map(Value::to_string).collect();
            return Err(ValidationError::rejected(
                ValidationKind::Enum,
                format!("{value} is not one of [{}]", allowed.join(", ")),
                value,
            )
            .in_field(&self.name));
        }

        self.data_type
            .validate(value)
            .map_err(|err| err.in_field(&self.name))
    }
}

/// Copies the declaration; the copy is unnamed until claimed again.
impl Clone for Field {
    fn clone(&self) -> Self {
        Self {
            name: String::new(),
            data_type: Arc::clone(&self.data_type),
            mock_fn: self.mock_fn.clone(),
            enum_values: self.enum_values.clone(),
            comment: self.comment.clone(),
            nullable: self.nullable,
            marshal_fn: Arc::clone(&self.marshal_fn),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.data_type.name())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Field [{}]: {}>", self.name, self.data_type.name())
    }
}
