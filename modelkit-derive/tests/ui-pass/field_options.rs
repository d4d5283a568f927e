//! Every field option together
use modelkit::ApiModel;
use modelkit::data_types::{IntType, StringType};
use serde_json::{Value, json};

fn fixed_code() -> Value {
    json!("ABC")
}

fn upper(value: &Value) -> Value {
    value.as_str().map_or(Value::Null, |s| json!(s.to_uppercase()))
}

#[derive(ApiModel)]
#[model(rename_all = "camelCase")]
struct Voucher {
    #[field(StringType::new(), mock = fixed_code, marshal = upper, comment = "voucher code")]
    voucher_code: Value,
    #[field(IntType, enum_values = [5, 10, 20], nullable = false)]
    percent_off: Value,
    #[field(StringType::new(), rename = "type")]
    r#type: Value,
}

fn main() {
    let voucher = Voucher::mock();
    assert_eq!(voucher.voucher_code, json!("ABC"));
    assert!(voucher.validate().is_ok());

    let out = Voucher::marshal_from(&json!({"voucherCode": "abc", "percentOff": 5}));
    assert_eq!(out["voucherCode"], json!("ABC"));
    assert!(out.contains_key("type"));
}
