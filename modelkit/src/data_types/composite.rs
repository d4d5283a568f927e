use super::{DataType, json_type_name};
use crate::record::FieldSource;
use crate::schema::ModelSchema;
use crate::validation::{ValidationError, ValidationKind};
use serde_json::Value;
use std::sync::Arc;
use utoipa::openapi::schema::Type;

const MOCK_LIST_LEN: usize = 3;

/// Homogeneous arrays of an element type
#[derive(Clone)]
pub struct ListType {
    element: Arc<dyn DataType>,
}

impl ListType {
    pub fn of(element: impl DataType + 'static) -> Self {
        Self {
            element: Arc::new(element),
        }
    }
}

impl DataType for ListType {
    fn name(&self) -> &'static str {
        "ListType"
    }

    fn mock(&self) -> Value {
        Value::Array((0..MOCK_LIST_LEN).map(|_| self.element.mock()).collect())
    }

    fn marshal(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.element.marshal(v)).collect()),
            _ => value.clone(),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::Array(items) = value else {
            return Err(ValidationError::rejected(
                ValidationKind::Type,
                format!("expected array, got {}", json_type_name(value)),
                value,
            ));
        };
        for (index, item) in items.iter().enumerate() {
            self.element
                .validate(item)
                .map_err(|err| err.in_field(&format!("[{index}]")))?;
        }
        Ok(())
    }

    /// Comma-separated elements, each parsed by the element type
    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        if raw.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        raw.split(',')
            .enumerate()
            .map(|(index, part)| {
                self.element
                    .parse_str(part.trim())
                    .map_err(|err| err.in_field(&format!("[{index}]")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn schema_type(&self) -> Type {
        Type::Array
    }

    fn element_type(&self) -> Option<&dyn DataType> {
        Some(self.element.as_ref())
    }
}

/// A nested model, marshalled and validated through its own registry
#[derive(Clone)]
pub struct ObjectType {
    schema: ModelSchema,
}

impl ObjectType {
    #[must_use]
    pub fn new(schema: ModelSchema) -> Self {
        Self { schema }
    }
}

impl DataType for ObjectType {
    fn name(&self) -> &'static str {
        "ObjectType"
    }

    fn mock(&self) -> Value {
        Value::Object(self.schema.mock())
    }

    fn marshal(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.schema.marshal(map as &dyn FieldSource)),
            _ => value.clone(),
        }
    }

    /// Reports the first failing member; use [`ModelSchema::validate`] on the
    /// nested payload to collect all of them.
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::rejected(
                ValidationKind::Type,
                format!("expected object, got {}", json_type_name(value)),
                value,
            ));
        };
        match self.schema.validate(map as &dyn FieldSource) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .into_iter()
                .next()
                .unwrap_or_else(|| ValidationError::rejected(ValidationKind::Custom, "invalid object", value))),
        }
    }

    fn schema_type(&self) -> Type {
        Type::Object
    }

    fn nested_schema(&self) -> Option<&ModelSchema> {
        Some(&self.schema)
    }
}
