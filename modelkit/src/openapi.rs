//! OpenAPI schemas generated from model registries.
//!
//! ```rust
//! use modelkit::data_types::IntType;
//! use modelkit::{Field, ModelSchema};
//!
//! let schema = ModelSchema::builder("Counter")
//!     .field("count", Field::new(IntType).nullable(false))
//!     .build();
//! let json = serde_json::to_value(schema.openapi_schema()).unwrap();
//! assert_eq!(json["properties"]["count"]["type"], "integer");
//! assert_eq!(json["required"][0], "count");
//! ```

use crate::data_types::DataType;
use crate::field::Field;
use crate::schema::ModelSchema;
use serde_json::Value;
use utoipa::openapi::RefOr;
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Schema, SchemaFormat, Type};

impl ModelSchema {
    /// Object schema with one property per field, in registry order
    #[must_use]
    pub fn openapi_schema(&self) -> Schema {
        let mut object = ObjectBuilder::new()
            .schema_type(Type::Object)
            .title(Some(self.name()));

        for field in self.fields() {
            object = object.property(field.name(), field_schema(field));
            if !field.is_nullable() {
                object = object.required(field.name());
            }
        }

        Schema::Object(object.build())
    }
}

fn field_schema(field: &Field) -> RefOr<Schema> {
    let description = Some(field.comment()).filter(|c| !c.is_empty());
    let enum_values = if field.enum_values().is_empty() {
        field.data_type().allowed_values()
    } else {
        Some(field.enum_values().to_vec())
    };
    type_schema(field.data_type(), description, enum_values)
}

fn type_schema(
    data_type: &dyn DataType,
    description: Option<&str>,
    enum_values: Option<Vec<Value>>,
) -> RefOr<Schema> {
    if let Some(nested) = data_type.nested_schema() {
        let mut schema = nested.openapi_schema();
        if let Schema::Object(object) = &mut schema {
            object.description = description.map(str::to_string);
        }
        return RefOr::T(schema);
    }

    if let Some(element) = data_type.element_type() {
        let items = type_schema(element, None, element.allowed_values());
        return RefOr::T(Schema::Array(
            ArrayBuilder::new().items(items).description(description).build(),
        ));
    }

    let mut builder = ObjectBuilder::new()
        .schema_type(data_type.schema_type())
        .description(description);
    if let Some(format) = data_type.schema_format() {
        builder = builder.format(Some(SchemaFormat::KnownFormat(format)));
    }
    if let Some(values) = enum_values {
        builder = builder.enum_values(Some(values));
    }
    RefOr::T(Schema::Object(builder.build()))
}
