//! Bases are embedded and their registries merged
use modelkit::data_types::{BoolType, IntType, StringType};
use modelkit::{ApiModel, FieldSource};
use serde_json::{Value, json};

#[derive(Debug, ApiModel)]
struct Timestamped {
    #[field(IntType)]
    created: Value,
}

#[derive(Debug, ApiModel)]
struct Owned {
    #[field(IntType, nullable = false)]
    owner_id: Value,
    #[field(BoolType)]
    created: Value,
}

#[derive(Debug, ApiModel)]
#[model(name = "Document")]
struct Doc {
    #[model(base)]
    timestamps: Timestamped,
    #[model(base)]
    owner: Owned,
    #[field(StringType::new())]
    body: Value,
}

fn main() {
    let names: Vec<&str> = Doc::schema().field_names().collect();
    assert_eq!(names, ["created", "owner_id", "body"]);
    assert_eq!(Doc::schema().field("created").unwrap().data_type().name(), "IntType");

    let mut doc = Doc::construct(&json!({"owner_id": 3, "created": 10})).unwrap();
    doc.set("created", 11).unwrap();
    assert_eq!(doc.get("created", Value::Null), json!(11));
    assert_eq!(doc.owner.created, json!(11));
}
