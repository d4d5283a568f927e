#![allow(dead_code)]

use modelkit::ApiModel;
use modelkit::data_types::{DateTimeType, EnumType, IntType, ListType, StringType, UuidType};
use serde_json::Value;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary; `RUST_LOG` controls it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, ApiModel)]
pub struct A {
    #[field(IntType, nullable = false)]
    pub x: Value,
}

#[derive(Debug, ApiModel)]
pub struct B {
    #[model(base)]
    pub a: A,
    #[field(StringType::new())]
    pub y: Value,
}

#[derive(Debug, ApiModel)]
pub struct Audited {
    #[field(UuidType, nullable = false, comment = "row identifier")]
    pub id: Value,
    #[field(DateTimeType::new())]
    pub created_at: Value,
}

#[derive(Debug, ApiModel)]
pub struct Published {
    #[field(StringType::new(), comment = "owner of the record")]
    pub id: Value,
    #[field(EnumType::new(["draft", "published", "archived"]), nullable = false)]
    pub status: Value,
}

/// Inherits `id` from both bases; the first one declared wins.
#[derive(Debug, ApiModel)]
pub struct Post {
    #[model(base)]
    pub audit: Audited,
    #[model(base)]
    pub publishing: Published,
    #[field(StringType::new().min_length(1).max_length(120), nullable = false)]
    pub title: Value,
    #[field(ListType::of(StringType::new()))]
    pub tags: Value,
    #[field(IntType, enum_values = [1, 2, 3])]
    pub priority: Value,
}

/// Replaces the inherited `status` with a looser declaration.
#[derive(Debug, ApiModel)]
pub struct DraftPost {
    #[model(base)]
    pub post: Post,
    #[field(StringType::new())]
    pub status: Value,
}
