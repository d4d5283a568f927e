//! # modelkit
//!
//! Declarative API models. A model is an ordered registry of typed fields,
//! assembled once from the model's own declarations and the registries of
//! the models it extends. Instances hold one value per registered field and
//! can be validated, marshalled into JSON-ready maps and mocked.
//!
//! ```rust
//! use modelkit::data_types::{IntType, StringType};
//! use modelkit::{Field, FieldSource, ModelSchema, Record};
//! use serde_json::{Value, json};
//!
//! let a = ModelSchema::builder("A")
//!     .field("x", Field::new(IntType).nullable(false))
//!     .build();
//! let b = ModelSchema::builder("B")
//!     .extends(&a)
//!     .field("y", Field::new(StringType::new()))
//!     .build();
//!
//! let record = Record::construct(&b, &json!({"x": 5}), false).unwrap();
//! assert_eq!(Value::Object(record.marshal()), json!({"x": 5, "y": null}));
//! assert_eq!(record.get("z", json!("none")), json!("none"));
//! ```
//!
//! Fixed-shape models are declared with `#[derive(ApiModel)]`, see [`model`].

pub mod config;
pub mod data_types;
pub mod errors;
pub mod field;
pub mod model;
pub mod openapi;
pub mod pagination;
pub mod persistence;
pub mod query;
pub mod record;
pub mod schema;
pub mod validation;

pub use config::{Settings, init_settings, settings};
pub use errors::{ApiError, ModelError};
pub use field::Field;
pub use model::ApiModel;
pub use pagination::Pagination;
pub use persistence::parse_record_id;
pub use query::{Location, QueryField, QuerySchema, RequestArgs};
pub use record::{FieldSource, Record};
pub use schema::{ModelSchema, SchemaBuilder};
pub use validation::{ValidationError, ValidationErrors, ValidationKind};

#[cfg(feature = "derive")]
pub use modelkit_derive::ApiModel;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
