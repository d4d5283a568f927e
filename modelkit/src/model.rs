//! Fixed-shape models.
//!
//! `#[derive(ApiModel)]` turns a struct whose fields are `serde_json::Value`
//! slots into a model with a registry built once on first use. Inheritance
//! is expressed by embedding base models in fields marked `#[model(base)]`:
//!
//! ```rust
//! use modelkit::data_types::{IntType, StringType};
//! use modelkit::{ApiModel, FieldSource};
//! use serde_json::{Value, json};
//!
//! #[derive(Debug, ApiModel)]
//! struct A {
//!     #[field(IntType, nullable = false)]
//!     x: Value,
//! }
//!
//! #[derive(Debug, ApiModel)]
//! struct B {
//!     #[model(base)]
//!     a: A,
//!     #[field(StringType::new(), comment = "free text")]
//!     y: Value,
//! }
//!
//! let b = B::construct(&json!({"x": 5})).unwrap();
//! assert_eq!(Value::Object(b.marshal()), json!({"x": 5, "y": null}));
//! assert!(B::construct(&json!({})).is_err());
//! assert!(B::construct_with(&json!({}), true).is_ok());
//! ```
//!
//! Unknown attributes cannot be named on the struct itself; the by-name
//! [`set`](ApiModel::set) path rejects them at runtime.

use crate::errors::ModelError;
use crate::record::{FieldSource, Record};
use crate::schema::ModelSchema;
use crate::validation::ValidationErrors;
use serde_json::{Map, Value};

pub trait ApiModel: FieldSource + Sized {
    /// The model's registry, built once
    fn schema() -> &'static ModelSchema;

    /// Fill every slot from `source` without any checks; absent names are
    /// stored as null.
    fn from_source(source: &dyn FieldSource) -> Self;

    /// Write `value` into every slot named `name`, including slots of
    /// embedded bases. Returns whether any slot matched.
    fn set_slot(&mut self, name: &str, value: &Value) -> bool;

    /// Construct with required-field enforcement.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiredFieldMissing`] for the first
    /// non-nullable field without a value.
    fn construct(values: &dyn FieldSource) -> Result<Self, ModelError> {
        Self::construct_with(values, false)
    }

    /// Construct, optionally suspending required-field enforcement for
    /// partial updates.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiredFieldMissing`] unless `drop_missing`.
    fn construct_with(values: &dyn FieldSource, drop_missing: bool) -> Result<Self, ModelError> {
        let record = Record::construct(Self::schema(), values, drop_missing)?;
        Ok(Self::from_source(&record))
    }

    /// Write a field by name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AttributeRejected`] for names outside the
    /// registry.
    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = value.into();
        if Self::schema().contains(name) && self.set_slot(name, &value) {
            return Ok(());
        }
        Err(ModelError::AttributeRejected {
            model: Self::schema().name().to_string(),
            attribute: name.to_string(),
        })
    }

    fn marshal(&self) -> Map<String, Value> {
        Self::schema().marshal(self)
    }

    /// Marshal an arbitrary source through this model's field rules
    fn marshal_from(source: &dyn FieldSource) -> Map<String, Value> {
        Self::schema().marshal(source)
    }

    /// # Errors
    ///
    /// Returns every failing field, in registry order.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Self::schema().validate(self)
    }

    fn mock() -> Self {
        Self::from_source(&Self::schema().mock())
    }

    fn to_record(&self) -> Record {
        Record::capture(Self::schema(), self)
    }
}
