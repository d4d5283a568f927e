// Settings Test
// Tests process-wide settings installed at startup. Kept in its own test
// binary since settings can only be installed once per process.

use modelkit::data_types::{DataType, DateTimeType};
use modelkit::{QuerySchema, RequestArgs, Settings, init_settings, settings};
use serde_json::{Value, json};

#[test]
fn test_installed_settings_drive_defaults() {
    let custom = Settings::from_json(r#"{"date_format": "%d/%m/%Y", "per_page": 5}"#).unwrap();
    init_settings(custom.clone()).unwrap();

    assert_eq!(settings(), &custom);
    assert_eq!(settings().max_per_page, 100);
    assert!(init_settings(Settings::default()).is_err());

    let date = DateTimeType::new();
    assert_eq!(date.marshal(&json!("2024-03-01T12:30:00Z")), json!("01/03/2024"));
    assert!(date.validate(&json!("25/12/2023")).is_ok());
    assert!(date.validate(&json!("2023-12-25 00:00:00")).is_err());

    let query = QuerySchema::builder("Paged").paginated().build();
    let bound = query.bind(&RequestArgs::new()).unwrap();
    assert_eq!(Value::Object(bound.into_map()), json!({"per_page": 5, "offset": 0}));
}
