//! Model registries.
//!
//! A [`ModelSchema`] is the frozen, ordered set of fields a model exposes,
//! including everything it inherits. It is produced once by a
//! [`SchemaBuilder`] and is cheap to clone and safe to share between threads.
//!
//! Merge rules applied by [`SchemaBuilder::build`]:
//!
//! 1. Bases are walked in the order they were passed to
//!    [`extends`](SchemaBuilder::extends), each in its own stored order. A name
//!    already collected from an earlier base is skipped, so the first base
//!    wins on collisions.
//! 2. Fields declared on the model itself are then named after their key and
//!    replace any inherited field of the same name in place. New names are
//!    appended.
//!
//! Inherited descriptors are shared with the base registry, not copied.

use crate::field::Field;
use crate::record::FieldSource;
use crate::validation::ValidationErrors;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static NULL: Value = Value::Null;

#[derive(Clone)]
pub struct ModelSchema {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    name: String,
    fields: Vec<Arc<Field>>,
    positions: HashMap<String, usize>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            bases: Vec::new(),
            own: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Fields in registry order
    #[must_use]
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.inner.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.position(name).map(|pos| &self.inner.fields[pos])
    }

    /// Slot index of a field name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.inner.positions.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.positions.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.iter().map(|f| f.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Marshal every registered field read from `source`.
    ///
    /// Names the source does not provide are marshalled from null; keys the
    /// registry does not know are never read.
    pub fn marshal(&self, source: &dyn FieldSource) -> Map<String, Value> {
        self.inner
            .fields
            .iter()
            .map(|field| {
                let value = source.lookup(field.name()).unwrap_or(&NULL);
                (field.name().to_string(), field.marshal(value))
            })
            .collect()
    }

    /// Validate every registered field read from `source`, collecting all
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns one error per failing field, in registry order.
    pub fn validate(&self, source: &dyn FieldSource) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for field in &self.inner.fields {
            let value = source.lookup(field.name()).unwrap_or(&NULL);
            if let Err(err) = field.validate(value) {
                errors.add(err);
            }
        }
        errors.result()
    }

    /// A complete sample payload
    #[must_use]
    pub fn mock(&self) -> Map<String, Value> {
        self.inner
            .fields
            .iter()
            .map(|field| (field.name().to_string(), field.mock()))
            .collect()
    }

    /// Drop every key that is not a registered field
    #[must_use]
    pub fn retain_known(&self, mut payload: Map<String, Value>) -> Map<String, Value> {
        payload.retain(|key, _| {
            let known = self.contains(key);
            if !known {
                tracing::trace!(model = %self.name(), key = %key, "dropping unknown key");
            }
            known
        });
        payload
    }

    /// Whether two handles refer to the same registry
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields)
            .finish()
    }
}

impl fmt::Display for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>(", self.inner.name)?;
        for (i, field) in self.inner.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name(), field.data_type().name())?;
        }
        f.write_str(")")
    }
}

/// Collects base registries and own field declarations for one model
#[must_use]
pub struct SchemaBuilder {
    name: String,
    bases: Vec<ModelSchema>,
    own: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Inherit every field of `base`; call once per base, in declaration order
    pub fn extends(mut self, base: &ModelSchema) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Declare a field on the model itself
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.own.push((name.into(), field));
        self
    }

    #[must_use]
    pub fn build(self) -> ModelSchema {
        let mut fields: Vec<Arc<Field>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for base in &self.bases {
            for field in base.fields() {
                if positions.contains_key(field.name()) {
                    tracing::trace!(
                        model = %self.name,
                        base = %base.name(),
                        field = %field.name(),
                        "field already inherited from an earlier base"
                    );
                    continue;
                }
                positions.insert(field.name().to_string(), fields.len());
                fields.push(Arc::clone(field));
            }
        }

        for (name, mut field) in self.own {
            field.claim(&name);
            let field = Arc::new(field);
            if let Some(&pos) = positions.get(&name) {
                tracing::trace!(model = %self.name, field = %name, "overriding inherited field");
                fields[pos] = field;
            } else {
                positions.insert(name, fields.len());
                fields.push(field);
            }
        }

        tracing::debug!(
            model = %self.name,
            bases = self.bases.len(),
            fields = fields.len(),
            "built model schema"
        );

        ModelSchema {
            inner: Arc::new(SchemaInner {
                name: self.name,
                fields,
                positions,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{BoolType, IntType, StringType};
    use serde_json::json;

    fn base_a() -> ModelSchema {
        ModelSchema::builder("A")
            .field("x", Field::new(IntType).nullable(false))
            .field("shared", Field::new(IntType).with_comment("from A"))
            .build()
    }

    fn base_c() -> ModelSchema {
        ModelSchema::builder("C")
            .field("shared", Field::new(StringType::new()).with_comment("from C"))
            .field("z", Field::new(BoolType))
            .build()
    }

    #[test]
    fn test_own_fields_are_named_and_ordered() {
        let a = base_a();
        assert_eq!(a.field_names().collect::<Vec<_>>(), ["x", "shared"]);
        assert_eq!(a.field("x").unwrap().name(), "x");
        assert_eq!(a.position("shared"), Some(1));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_inherited_fields_come_first() {
        let b = ModelSchema::builder("B")
            .extends(&base_a())
            .field("y", Field::new(StringType::new()))
            .build();
        assert_eq!(b.field_names().collect::<Vec<_>>(), ["x", "shared", "y"]);
    }

    #[test]
    fn test_first_base_wins_on_collision() {
        let d = ModelSchema::builder("D")
            .extends(&base_a())
            .extends(&base_c())
            .build();
        assert_eq!(d.field_names().collect::<Vec<_>>(), ["x", "shared", "z"]);
        assert_eq!(d.field("shared").unwrap().comment(), "from A");

        let reversed = ModelSchema::builder("D2")
            .extends(&base_c())
            .extends(&base_a())
            .build();
        assert_eq!(reversed.field("shared").unwrap().comment(), "from C");
    }

    #[test]
    fn test_own_declaration_overrides_in_place() {
        let a = base_a();
        let b = ModelSchema::builder("B")
            .extends(&a)
            .field("x", Field::new(StringType::new()))
            .build();

        assert_eq!(b.field_names().collect::<Vec<_>>(), ["x", "shared"]);
        let x = b.field("x").unwrap();
        assert_eq!(x.data_type().name(), "StringType");
        assert!(x.is_nullable());
        // the base registry is untouched
        assert!(!a.field("x").unwrap().is_nullable());
    }

    #[test]
    fn test_inherited_descriptors_are_shared() {
        let a = base_a();
        let b = ModelSchema::builder("B").extends(&a).build();
        assert!(Arc::ptr_eq(a.field("x").unwrap(), b.field("x").unwrap()));
    }

    #[test]
    fn test_duplicate_own_declaration_last_wins() {
        let s = ModelSchema::builder("S")
            .field("v", Field::new(IntType))
            .field("v", Field::new(BoolType))
            .build();
        assert_eq!(s.len(), 1);
        assert_eq!(s.field("v").unwrap().data_type().name(), "BoolType");
    }

    #[test]
    fn test_marshal_reads_registered_names_only() {
        let a = base_a();
        let payload = json!({"x": 1, "unknown": 2});
        let out = a.marshal(&payload);
        assert_eq!(Value::Object(out), json!({"x": 1, "shared": null}));
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let a = base_a();
        let errors = a.validate(&json!({"shared": "nope"})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].field, "x");
        assert_eq!(errors.errors()[1].field, "shared");
    }

    #[test]
    fn test_mock_covers_all_fields() {
        let a = base_a();
        let sample = a.mock();
        assert_eq!(sample.len(), 2);
        assert!(a.validate(&sample).is_ok());
    }

    #[test]
    fn test_retain_known() {
        let a = base_a();
        let Value::Object(payload) = json!({"x": 1, "password": "secret"}) else {
            unreachable!()
        };
        let kept = a.retain_known(payload);
        assert_eq!(kept.keys().collect::<Vec<_>>(), ["x"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(base_a().to_string(), "<A>(x: IntType, shared: IntType)");
    }

    #[test]
    fn test_clone_shares_registry() {
        let a = base_a();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&base_a()));
    }
}
