//! Query models.
//!
//! A query model describes the arguments an endpoint accepts. Each field is
//! a regular [`Field`] plus the request location it is read from and a value
//! to fall back to when the caller omits it. Query models inherit and
//! override exactly like plain models.
//!
//! ```rust
//! use modelkit::data_types::{IntType, StringType};
//! use modelkit::query::{Location, QueryField, QuerySchema, RequestArgs};
//! use modelkit::FieldSource;
//! use serde_json::{Value, json};
//!
//! let search = QuerySchema::builder("PostSearch")
//!     .field("q", QueryField::new(StringType::new()).located_in(Location::Query))
//!     .field("author_id", QueryField::new(IntType).located_in(Location::Query))
//!     .paginated_in(Location::Query)
//!     .build();
//!
//! let args = RequestArgs::new().with_query([("author_id", "7"), ("per_page", "5")]);
//! let bound = search.bind(&args).unwrap();
//! assert_eq!(bound.get("author_id", Value::Null), json!(7));
//! assert_eq!(bound.get("per_page", Value::Null), json!(5));
//! assert_eq!(bound.get("offset", Value::Null), json!(0));
//! ```

use crate::config::{Settings, settings};
use crate::data_types::{DataType, IntType};
use crate::errors::ModelError;
use crate::field::Field;
use crate::record::Record;
use crate::schema::{ModelSchema, SchemaBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Where in a request an argument is read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Json,
    Query,
    Form,
    Headers,
    Path,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Query => "query",
            Self::Form => "form",
            Self::Headers => "headers",
            Self::Path => "path",
        })
    }
}

/// A field of a query model
#[derive(Debug, Clone)]
pub struct QueryField {
    field: Field,
    binding: Binding,
}

#[derive(Debug, Clone, Default)]
struct Binding {
    default: Option<Value>,
    location: Location,
}

impl QueryField {
    pub fn new(data_type: impl DataType + 'static) -> Self {
        Self::from(Field::new(data_type))
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.field = self.field.nullable(nullable);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.field = self.field.with_comment(comment);
        self
    }

    #[must_use]
    pub fn with_enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.field = self.field.with_enum_values(values);
        self
    }

    /// Value used when the argument is absent or null
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.binding.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn located_in(mut self, location: Location) -> Self {
        self.binding.location = location;
        self
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.binding.default.as_ref()
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.binding.location
    }
}

impl From<Field> for QueryField {
    fn from(field: Field) -> Self {
        Self {
            field,
            binding: Binding::default(),
        }
    }
}

/// The registry of a query model plus per-field binding rules
#[derive(Clone)]
pub struct QuerySchema {
    model: ModelSchema,
    bindings: Arc<HashMap<String, Binding>>,
}

impl QuerySchema {
    pub fn builder(name: impl Into<String>) -> QuerySchemaBuilder {
        QuerySchemaBuilder {
            model: ModelSchema::builder(name),
            bases: Vec::new(),
            own: Vec::new(),
        }
    }

    /// The underlying field registry
    #[must_use]
    pub fn model(&self) -> &ModelSchema {
        &self.model
    }

    #[must_use]
    pub fn location(&self, name: &str) -> Option<Location> {
        self.bindings.get(name).map(|b| b.location)
    }

    #[must_use]
    pub fn default(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).and_then(|b| b.default.as_ref())
    }

    /// Bind request arguments to a record of this query model.
    ///
    /// Fields are processed in registry order. Each value is read from the
    /// field's location; strings from anywhere but the JSON body are parsed
    /// by the field's data type. Absent or null values take the field's
    /// default. The resulting value must then satisfy the field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiredFieldMissing`] for a non-nullable field
    /// that ends up null and [`ModelError::ValidationFailed`] for the first
    /// value the field rejects.
    pub fn bind(&self, args: &RequestArgs) -> Result<Record, ModelError> {
        let mut values = Map::new();

        for field in self.model.fields() {
            let name = field.name();
            let binding = self.bindings.get(name).cloned().unwrap_or_default();

            let mut value = match args.lookup(binding.location, name) {
                Some(Value::String(raw)) if binding.location != Location::Json => field
                    .data_type()
                    .parse_str(raw)
                    .map_err(|err| err.in_field(name))?,
                Some(value) => value.clone(),
                None => Value::Null,
            };

            if value.is_null()
                && let Some(default) = &binding.default
            {
                value = default.clone();
            }

            if value.is_null() && !field.is_nullable() {
                return Err(ModelError::RequiredFieldMissing {
                    field: name.to_string(),
                });
            }

            field.validate(&value)?;
            values.insert(name.to_string(), value);
        }

        tracing::debug!(model = %self.model.name(), fields = values.len(), "bound request arguments");
        Record::construct(&self.model, &values, true)
    }
}

impl fmt::Debug for QuerySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySchema")
            .field("model", &self.model)
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[must_use]
pub struct QuerySchemaBuilder {
    model: SchemaBuilder,
    bases: Vec<QuerySchema>,
    own: Vec<(String, Binding)>,
}

impl QuerySchemaBuilder {
    pub fn extends(mut self, base: &QuerySchema) -> Self {
        self.model = self.model.extends(&base.model);
        self.bases.push(base.clone());
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: QueryField) -> Self {
        let name = name.into();
        self.model = self.model.field(name.clone(), field.field);
        self.own.push((name, field.binding));
        self
    }

    /// Add `per_page` and `offset` with the process-wide defaults, read
    /// from the JSON body
    pub fn paginated(self) -> Self {
        self.paginated_with(settings())
    }

    pub fn paginated_with(self, settings: &Settings) -> Self {
        self.paginated_with_in(settings, Location::Json)
    }

    /// Like [`paginated`](Self::paginated), reading both arguments from
    /// `location`. List endpoints served over GET want [`Location::Query`].
    pub fn paginated_in(self, location: Location) -> Self {
        self.paginated_with_in(settings(), location)
    }

    pub fn paginated_with_in(self, settings: &Settings, location: Location) -> Self {
        self.field(
            "per_page",
            QueryField::new(IntType)
                .with_default(settings.per_page)
                .with_comment("page size")
                .located_in(location),
        )
        .field(
            "offset",
            QueryField::new(IntType)
                .with_default(0)
                .with_comment("index of the first item")
                .located_in(location),
        )
    }

    /// Bindings follow the same precedence as fields: first base wins,
    /// own declarations override.
    #[must_use]
    pub fn build(self) -> QuerySchema {
        let mut bindings: HashMap<String, Binding> = HashMap::new();
        for base in &self.bases {
            for (name, binding) in base.bindings.iter() {
                bindings
                    .entry(name.clone())
                    .or_insert_with(|| binding.clone());
            }
        }
        bindings.extend(self.own);

        QuerySchema {
            model: self.model.build(),
            bindings: Arc::new(bindings),
        }
    }
}

/// Raw request arguments, one map per location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestArgs {
    pub json: Map<String, Value>,
    pub query: Map<String, Value>,
    pub form: Map<String, Value>,
    pub headers: Map<String, Value>,
    pub path: Map<String, Value>,
}

impl RequestArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `body` as the JSON payload; anything but an object is ignored
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.json = map;
        } else {
            tracing::debug!("ignoring non-object JSON body");
        }
        self
    }

    #[must_use]
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        insert_strings(&mut self.query, pairs);
        self
    }

    #[must_use]
    pub fn with_form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        insert_strings(&mut self.form, pairs);
        self
    }

    /// Header names are stored lowercased
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let lowered = pairs
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v));
        insert_strings(&mut self.headers, lowered);
        self
    }

    #[must_use]
    pub fn with_path<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        insert_strings(&mut self.path, pairs);
        self
    }

    #[must_use]
    pub fn at(&self, location: Location) -> &Map<String, Value> {
        match location {
            Location::Json => &self.json,
            Location::Query => &self.query,
            Location::Form => &self.form,
            Location::Headers => &self.headers,
            Location::Path => &self.path,
        }
    }

    /// Headers match case-insensitively, with `_` in the field name standing
    /// for `-` in the header name.
    fn lookup(&self, location: Location, name: &str) -> Option<&Value> {
        let map = self.at(location);
        if location == Location::Headers {
            let lowered = name.to_ascii_lowercase();
            return map
                .get(&lowered)
                .or_else(|| map.get(&lowered.replace('_', "-")));
        }
        map.get(name)
    }
}

fn insert_strings<I, K, V>(map: &mut Map<String, Value>, pairs: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    for (key, value) in pairs {
        map.insert(key.into(), Value::String(value.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{BoolType, ListType, StringType};
    use crate::record::FieldSource;
    use crate::validation::ValidationKind;
    use serde_json::json;

    fn page_settings() -> Settings {
        Settings {
            per_page: 25,
            ..Settings::default()
        }
    }

    fn post_query() -> QuerySchema {
        QuerySchema::builder("PostQuery")
            .field("title", QueryField::new(StringType::new()).nullable(false))
            .field(
                "published",
                QueryField::new(BoolType)
                    .with_default(false)
                    .located_in(Location::Query),
            )
            .paginated_with(&page_settings())
            .build()
    }

    #[test]
    fn test_defaults_fill_absent_arguments() {
        let args = RequestArgs::new().with_json(json!({"title": "hello"}));
        let bound = post_query().bind(&args).unwrap();
        assert_eq!(
            Value::Object(bound.into_map()),
            json!({"title": "hello", "published": false, "per_page": 25, "offset": 0})
        );
    }

    #[test]
    fn test_query_strings_are_parsed() {
        let args = RequestArgs::new()
            .with_json(json!({"title": "hello", "per_page": 5}))
            .with_query([("published", "true")]);
        let bound = post_query().bind(&args).unwrap();
        assert_eq!(bound.get("published", Value::Null), json!(true));
        assert_eq!(bound.get("per_page", Value::Null), json!(5));
    }

    #[test]
    fn test_arguments_are_read_from_their_location_only() {
        let args = RequestArgs::new()
            .with_json(json!({"title": "hello", "published": true}))
            .with_query([("title", "ignored")]);
        let bound = post_query().bind(&args).unwrap();
        assert_eq!(bound.get("published", Value::Null), json!(false));
        assert_eq!(bound.get("title", Value::Null), json!("hello"));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = post_query().bind(&RequestArgs::new()).unwrap_err();
        assert!(matches!(err, ModelError::RequiredFieldMissing { ref field } if field == "title"));
    }

    #[test]
    fn test_unparsable_argument() {
        let args = RequestArgs::new()
            .with_json(json!({"title": "hello"}))
            .with_query([("published", "maybe")]);
        let err = post_query().bind(&args).unwrap_err();
        assert_eq!(err.field(), "published");
    }

    #[test]
    fn test_json_values_are_validated_not_parsed() {
        let args = RequestArgs::new().with_json(json!({"title": "hello", "offset": "3"}));
        let err = post_query().bind(&args).unwrap_err();
        let ModelError::ValidationFailed(err) = err else {
            panic!("expected a validation failure");
        };
        assert_eq!(err.field, "offset");
        assert_eq!(err.kind, ValidationKind::Type);
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let schema = QuerySchema::builder("Auth")
            .field(
                "x_api_key",
                QueryField::new(StringType::new())
                    .nullable(false)
                    .located_in(Location::Headers),
            )
            .build();
        let args = RequestArgs::new().with_headers([("X-Api-Key", "secret")]);
        let bound = schema.bind(&args).unwrap();
        assert_eq!(bound.get("x_api_key", Value::Null), json!("secret"));
    }

    #[test]
    fn test_list_arguments_from_query_string() {
        let schema = QuerySchema::builder("ByIds")
            .field("ids", QueryField::new(ListType::of(IntType)).located_in(Location::Query))
            .build();
        let bound = schema
            .bind(&RequestArgs::new().with_query([("ids", "1, 2,3")]))
            .unwrap();
        assert_eq!(bound.get("ids", Value::Null), json!([1, 2, 3]));

        let err = schema
            .bind(&RequestArgs::new().with_query([("ids", "1,x")]))
            .unwrap_err();
        assert_eq!(err.field(), "ids[1]");
    }

    #[test]
    fn test_inherited_bindings_follow_field_precedence() {
        let base = post_query();
        let override_location = QuerySchema::builder("Drafts")
            .extends(&base)
            .field(
                "published",
                QueryField::new(BoolType)
                    .with_default(false)
                    .located_in(Location::Path),
            )
            .build();

        assert_eq!(base.location("published"), Some(Location::Query));
        assert_eq!(override_location.location("published"), Some(Location::Path));
        assert_eq!(override_location.location("title"), Some(Location::Json));
        assert_eq!(override_location.default("per_page"), Some(&json!(25)));
        assert_eq!(
            override_location.model().field_names().collect::<Vec<_>>(),
            ["title", "published", "per_page", "offset"]
        );
    }

    #[test]
    fn test_pagination_read_from_query_string() {
        let schema = QuerySchema::builder("PostList")
            .paginated_with_in(&page_settings(), Location::Query)
            .build();
        assert_eq!(schema.location("per_page"), Some(Location::Query));
        assert_eq!(schema.location("offset"), Some(Location::Query));

        let bound = schema
            .bind(&RequestArgs::new().with_query([("offset", "20"), ("per_page", "10")]))
            .unwrap();
        assert_eq!(Value::Object(bound.into_map()), json!({"per_page": 10, "offset": 20}));

        // a JSON body no longer feeds query-located pagination
        let bound = schema
            .bind(&RequestArgs::new().with_json(json!({"offset": 20})))
            .unwrap();
        assert_eq!(bound.get("offset", Value::Null), json!(0));

        let err = schema
            .bind(&RequestArgs::new().with_query([("offset", "ten")]))
            .unwrap_err();
        assert_eq!(err.field(), "offset");
    }

    #[test]
    fn test_location_serde() {
        assert_eq!(serde_json::to_value(Location::Headers).unwrap(), json!("headers"));
        assert_eq!(Location::default(), Location::Json);
        assert_eq!(Location::Form.to_string(), "form");
    }
}
