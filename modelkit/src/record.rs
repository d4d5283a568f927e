//! Model instances.
//!
//! A [`Record`] holds exactly one value slot per field of its registry.
//! Records are built with [`Record::construct`], which enforces required
//! fields, and can be written by name only for registered fields.
//!
//! [`FieldSource`] is the read side shared by records, derived models and
//! plain key-value containers: anything that can hand out a value by field
//! name can be marshalled or validated through a registry.

use crate::errors::ModelError;
use crate::schema::ModelSchema;
use crate::validation::ValidationErrors;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Read access to values by field name
pub trait FieldSource {
    /// The stored value for `name`, if there is one
    fn lookup(&self, name: &str) -> Option<&Value>;

    /// The stored value for `name`, or `default`. Never fails.
    fn get(&self, name: &str, default: Value) -> Value {
        self.lookup(name).cloned().unwrap_or(default)
    }
}

impl FieldSource for Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        Map::get(self, name)
    }
}

impl<S: BuildHasher> FieldSource for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        HashMap::get(self, name)
    }
}

impl FieldSource for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        BTreeMap::get(self, name)
    }
}

/// Objects expose their members; every other value is an empty source.
impl FieldSource for Value {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(name))
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn lookup(&self, name: &str) -> Option<&Value> {
        (**self).lookup(name)
    }
}

#[derive(Clone)]
pub struct Record {
    schema: ModelSchema,
    values: Vec<Value>,
}

impl Record {
    /// Build a record from `values`.
    ///
    /// Every registered field takes its value from `values` (absent → null).
    /// Unless `drop_missing` is set, the first non-nullable field left null
    /// aborts construction. Keys that are not registered are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiredFieldMissing`] naming the first missing
    /// required field.
    pub fn construct(
        schema: &ModelSchema,
        values: &dyn FieldSource,
        drop_missing: bool,
    ) -> Result<Self, ModelError> {
        let mut slots = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let value = values.get(field.name(), Value::Null);
            if !drop_missing && !field.is_nullable() && value.is_null() {
                return Err(ModelError::RequiredFieldMissing {
                    field: field.name().to_string(),
                });
            }
            slots.push(value);
        }
        Ok(Self {
            schema: schema.clone(),
            values: slots,
        })
    }

    /// A record with every slot null
    #[must_use]
    pub fn empty(schema: &ModelSchema) -> Self {
        Self {
            schema: schema.clone(),
            values: vec![Value::Null; schema.len()],
        }
    }

    /// A record filled with sample values
    #[must_use]
    pub fn mock(schema: &ModelSchema) -> Self {
        Self {
            schema: schema.clone(),
            values: schema.fields().iter().map(|f| f.mock()).collect(),
        }
    }

    /// Copy the registered values out of any source without checks
    #[must_use]
    pub fn capture(schema: &ModelSchema, source: &dyn FieldSource) -> Self {
        Self {
            schema: schema.clone(),
            values: schema
                .fields()
                .iter()
                .map(|f| source.get(f.name(), Value::Null))
                .collect(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Overwrite the slot of a registered field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AttributeRejected`] if `name` is not a field of
    /// this record's registry.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let Some(pos) = self.schema.position(name) else {
            return Err(ModelError::AttributeRejected {
                model: self.schema.name().to_string(),
                attribute: name.to_string(),
            });
        };
        self.values[pos] = value.into();
        Ok(())
    }

    /// Marshal this record's own values
    #[must_use]
    pub fn marshal(&self) -> Map<String, Value> {
        self.schema.marshal(self)
    }

    /// Marshal another source through this record's field rules
    #[must_use]
    pub fn marshal_from(&self, source: &dyn FieldSource) -> Map<String, Value> {
        self.schema.marshal(source)
    }

    /// Validate every slot against its field
    ///
    /// # Errors
    ///
    /// Returns every failing field, in registry order.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.schema.validate(self)
    }

    /// `(name, value)` pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema.field_names().zip(self.values.iter())
    }

    /// Raw (unmarshalled) values keyed by field name
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.schema
            .field_names()
            .map(str::to_string)
            .zip(self.values)
            .collect()
    }
}

impl FieldSource for Record {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|pos| &self.values[pos])
    }
}

/// Serializes the marshalled form.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.marshal().serialize(serializer)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.iter() {
            map.entry(&name, value);
        }
        map.finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = serde_json::to_string_pretty(&self.marshal()).map_err(|_| fmt::Error)?;
        write!(f, "[<{}>: \n{}]", self.schema.name(), body)
    }
}
