//! A model with only own fields
use modelkit::ApiModel;
use modelkit::data_types::{IntType, StringType};
use serde_json::{Value, json};

#[derive(Debug, ApiModel)]
struct Post {
    #[field(IntType, nullable = false)]
    id: Value,
    #[field(StringType::new().max_length(120), comment = "headline")]
    title: Value,
}

fn main() {
    let post = Post::construct(&json!({"id": 1, "title": "hello"})).unwrap();
    assert_eq!(post.id, json!(1));
    assert_eq!(Post::schema().name(), "Post");
    assert!(post.validate().is_ok());
}
