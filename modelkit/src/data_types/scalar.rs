use super::{DataType, json_type_name};
use crate::config::settings;
use crate::validation::{ValidationError, ValidationKind, validators};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt::Write;
use utoipa::openapi::schema::{KnownFormat, Type};
use uuid::Uuid;

fn type_mismatch(expected: &str, value: &Value) -> ValidationError {
    ValidationError::rejected(
        ValidationKind::Type,
        format!("expected {expected}, got {}", json_type_name(value)),
        value,
    )
}

fn unparsable(expected: &str, raw: &str) -> ValidationError {
    ValidationError::rejected(
        ValidationKind::Type,
        format!("'{raw}' is not a valid {expected}"),
        &Value::from(raw),
    )
}

/// Whole numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

#[allow(clippy::unused_self)]
impl IntType {
    /// Whole numbers no smaller than `min`
    #[must_use]
    pub fn at_least(self, min: i64) -> IntRange {
        IntRange::default().at_least(min)
    }

    /// Whole numbers no larger than `max`
    #[must_use]
    pub fn at_most(self, max: i64) -> IntRange {
        IntRange::default().at_most(max)
    }

    #[must_use]
    pub fn between(self, min: i64, max: i64) -> IntRange {
        IntRange::default().at_least(min).at_most(max)
    }
}

impl DataType for IntType {
    fn name(&self) -> &'static str {
        "IntType"
    }

    fn mock(&self) -> Value {
        Value::from(thread_rng().gen_range(0_i64..10_000))
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
            _ => Err(type_mismatch("integer", value)),
        }
    }

    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| unparsable("integer", raw))
    }

    fn schema_type(&self) -> Type {
        Type::Integer
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::Int64)
    }
}

/// Whole numbers within inclusive bounds, built from [`IntType`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IntRange {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntRange {
    #[must_use]
    pub fn at_least(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn at_most(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl DataType for IntRange {
    fn name(&self) -> &'static str {
        "IntType"
    }

    fn mock(&self) -> Value {
        let lo = self.min.unwrap_or_else(|| self.max.map_or(0, |max| max.min(0)));
        let hi = self.max.unwrap_or_else(|| lo.saturating_add(10_000));
        if lo >= hi {
            return Value::from(lo);
        }
        Value::from(thread_rng().gen_range(lo..=hi))
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        IntType.validate(value)?;
        match value.as_i64() {
            Some(n) => validators::validate_range("", n, self.min, self.max),
            // only integers above i64::MAX get here
            None => match self.max {
                Some(max) => Err(ValidationError::rejected(
                    ValidationKind::Range,
                    format!("Must be at most {max}"),
                    value,
                )),
                None => Ok(()),
            },
        }
    }

    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        IntType.parse_str(raw)
    }

    fn schema_type(&self) -> Type {
        Type::Integer
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::Int64)
    }
}

/// Any JSON number
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

#[allow(clippy::unused_self)]
impl FloatType {
    /// Numbers no smaller than `min`
    #[must_use]
    pub fn at_least(self, min: f64) -> FloatRange {
        FloatRange::default().at_least(min)
    }

    /// Numbers no larger than `max`
    #[must_use]
    pub fn at_most(self, max: f64) -> FloatRange {
        FloatRange::default().at_most(max)
    }

    #[must_use]
    pub fn between(self, min: f64, max: f64) -> FloatRange {
        FloatRange::default().at_least(min).at_most(max)
    }
}

impl DataType for FloatType {
    fn name(&self) -> &'static str {
        "FloatType"
    }

    fn mock(&self) -> Value {
        let sample = (thread_rng().gen_range(0.0_f64..1000.0) * 100.0).round() / 100.0;
        Number::from_f64(sample).map_or(Value::Null, Value::Number)
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_number() {
            Ok(())
        } else {
            Err(type_mismatch("number", value))
        }
    }

    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| unparsable("number", raw))
    }

    fn schema_type(&self) -> Type {
        Type::Number
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::Double)
    }
}

/// Numbers within inclusive bounds, built from [`FloatType`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl FloatRange {
    #[must_use]
    pub fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn at_most(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl DataType for FloatRange {
    fn name(&self) -> &'static str {
        "FloatType"
    }

    fn mock(&self) -> Value {
        let lo = self.min.unwrap_or_else(|| self.max.map_or(0.0, |max| max.min(0.0)));
        let hi = self.max.unwrap_or(lo + 1000.0);
        if lo.partial_cmp(&hi) != Some(std::cmp::Ordering::Less) {
            return Number::from_f64(lo).map_or(Value::Null, Value::Number);
        }
        let sample = ((thread_rng().gen_range(lo..=hi) * 100.0).round() / 100.0).clamp(lo, hi);
        Number::from_f64(sample).map_or(Value::Null, Value::Number)
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(n) = value.as_f64() else {
            return Err(type_mismatch("number", value));
        };
        validators::validate_range("", n, self.min, self.max)
    }

    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        FloatType.parse_str(raw)
    }

    fn schema_type(&self) -> Type {
        Type::Number
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::Double)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl DataType for BoolType {
    fn name(&self) -> &'static str {
        "BoolType"
    }

    fn mock(&self) -> Value {
        Value::Bool(thread_rng().gen_bool(0.5))
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_boolean() {
            Ok(())
        } else {
            Err(type_mismatch("boolean", value))
        }
    }

    fn parse_str(&self, raw: &str) -> Result<Value, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(unparsable("boolean", raw)),
        }
    }

    fn schema_type(&self) -> Type {
        Type::Boolean
    }
}

/// Text, optionally bounded in length and constrained by a pattern.
///
/// Random mocks only honour the length bounds. A pattern-constrained type
/// mocks from its [`samples`](Self::samples) instead; without samples, give
/// the field its own generator with [`Field::with_mock`](crate::Field::with_mock).
#[derive(Debug, Clone, Default)]
pub struct StringType {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    samples: Vec<String>,
}

impl StringType {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Require values to match `pattern`; anchor it yourself for full matches
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Values `mock` picks from instead of generating random text
    #[must_use]
    pub fn samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples = samples.into_iter().map(Into::into).collect();
        self
    }
}

impl DataType for StringType {
    fn name(&self) -> &'static str {
        "StringType"
    }

    fn mock(&self) -> Value {
        if let Some(sample) = self.samples.choose(&mut thread_rng()) {
            return Value::String(sample.clone());
        }
        if let Some(pattern) = &self.pattern {
            tracing::warn!(%pattern, "no samples for a pattern-constrained string, mock may not validate");
        }
        let len = 8_usize
            .max(self.min_length.unwrap_or(0))
            .min(self.max_length.unwrap_or(usize::MAX));
        let sample: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Value::String(sample)
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(s) = value else {
            return Err(type_mismatch("string", value));
        };
        validators::validate_length("", s, self.min_length, self.max_length)?;
        if let Some(pattern) = &self.pattern {
            validators::validate_pattern("", s, pattern)?;
        }
        Ok(())
    }

    fn schema_type(&self) -> Type {
        Type::String
    }
}

/// Date-times rendered in a `chrono` format string.
///
/// Without an explicit format the process-wide
/// [`Settings::date_format`](crate::config::Settings) is used.
#[derive(Debug, Clone, Default)]
pub struct DateTimeType {
    format: Option<String>,
}

impl DateTimeType {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
        }
    }

    fn format(&self) -> &str {
        self.format
            .as_deref()
            .unwrap_or_else(|| settings().date_format.as_str())
    }

    /// Values are normalised to UTC. Formats with an offset specifier
    /// (`%z`, `%:z`) parse through `DateTime`, since a naive parse would
    /// reject them.
    fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        let format = self.format();
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Render in UTC with the configured format; an invalid format string
    /// falls back to RFC 3339 instead of panicking inside `Display`.
    fn render(&self, dt: NaiveDateTime) -> String {
        let mut out = String::new();
        if write!(out, "{}", dt.and_utc().format(self.format())).is_err() {
            tracing::warn!(format = self.format(), "invalid date format, using RFC 3339");
            return dt.and_utc().to_rfc3339();
        }
        out
    }
}

impl DataType for DateTimeType {
    fn name(&self) -> &'static str {
        "DateTimeType"
    }

    fn mock(&self) -> Value {
        Value::String(self.render(Utc::now().naive_utc()))
    }

    fn marshal(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => self
                .parse(s)
                .map_or_else(|| value.clone(), |dt| Value::String(self.render(dt))),
            _ => value.clone(),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(s) = value else {
            return Err(type_mismatch("date-time string", value));
        };
        if self.parse(s).is_some() {
            Ok(())
        } else {
            Err(ValidationError::rejected(
                ValidationKind::Pattern,
                format!("'{s}' does not match date format '{}'", self.format()),
                value,
            ))
        }
    }

    fn schema_type(&self) -> Type {
        Type::String
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::DateTime)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl DataType for UuidType {
    fn name(&self) -> &'static str {
        "UuidType"
    }

    fn mock(&self) -> Value {
        Value::String(Uuid::new_v4().to_string())
    }

    /// Normalises any accepted spelling to the lowercase hyphenated form.
    fn marshal(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Uuid::parse_str(s)
                .map_or_else(|_| value.clone(), |id| Value::String(id.hyphenated().to_string())),
            _ => value.clone(),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(s) = value else {
            return Err(type_mismatch("uuid string", value));
        };
        Uuid::parse_str(s).map(|_| ()).map_err(|_| {
            ValidationError::rejected(ValidationKind::Pattern, format!("'{s}' is not a valid UUID"), value)
        })
    }

    fn schema_type(&self) -> Type {
        Type::String
    }

    fn schema_format(&self) -> Option<KnownFormat> {
        Some(KnownFormat::Uuid)
    }
}

/// A closed set of string variants, serialized by name
#[derive(Debug, Clone, Default)]
pub struct EnumType {
    variants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

impl DataType for EnumType {
    fn name(&self) -> &'static str {
        "EnumType"
    }

    fn mock(&self) -> Value {
        self.variants
            .choose(&mut thread_rng())
            .map_or(Value::Null, |v| Value::String(v.clone()))
    }

    fn marshal(&self, value: &Value) -> Value {
        value.clone()
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(s) = value else {
            return Err(type_mismatch("enum variant name", value));
        };
        if self.variants.iter().any(|v| v == s) {
            Ok(())
        } else {
            Err(ValidationError::rejected(
                ValidationKind::Enum,
                format!("'{s}' is not one of [{}]", self.variants.join(", ")),
                value,
            ))
        }
    }

    fn schema_type(&self) -> Type {
        Type::String
    }

    fn allowed_values(&self) -> Option<Vec<Value>> {
        Some(self.variants.iter().cloned().map(Value::String).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_type() {
        assert!(IntType.validate(&json!(5)).is_ok());
        assert!(IntType.validate(&json!(-5)).is_ok());
        assert_eq!(IntType.validate(&json!(5.5)).unwrap_err().kind, ValidationKind::Type);
        assert!(IntType.validate(&json!("5")).is_err());
        assert_eq!(IntType.parse_str(" 42 ").unwrap(), json!(42));
        assert!(IntType.parse_str("4x").is_err());
        assert!(IntType.mock().is_i64());
        assert_eq!(IntType.marshal(&json!(7)), json!(7));
    }

    #[test]
    fn test_int_range() {
        let stars = IntType.between(1, 5);
        assert!(stars.validate(&json!(1)).is_ok());
        assert!(stars.validate(&json!(5)).is_ok());
        assert_eq!(stars.validate(&json!(0)).unwrap_err().kind, ValidationKind::Range);
        assert_eq!(stars.validate(&json!(6)).unwrap_err().kind, ValidationKind::Range);
        assert_eq!(stars.validate(&json!(u64::MAX)).unwrap_err().kind, ValidationKind::Range);
        assert_eq!(stars.validate(&json!(2.5)).unwrap_err().kind, ValidationKind::Type);
        assert_eq!(stars.parse_str("3").unwrap(), json!(3));
        for _ in 0..50 {
            assert!(stars.validate(&stars.mock()).is_ok());
        }

        let negative = IntType.at_most(-10);
        assert!(negative.validate(&negative.mock()).is_ok());
        assert!(IntType.at_least(0).validate(&json!(u64::MAX)).is_ok());
    }

    #[test]
    fn test_float_range() {
        let ratio = FloatType.between(0.0, 1.0);
        assert!(ratio.validate(&json!(0.5)).is_ok());
        assert!(ratio.validate(&json!(1)).is_ok());
        let err = ratio.validate(&json!(1.5)).unwrap_err();
        assert_eq!(err.kind, ValidationKind::Range);
        assert_eq!(err.value, json!(1.5));
        assert_eq!(ratio.validate(&json!("0.5")).unwrap_err().kind, ValidationKind::Type);
        for _ in 0..50 {
            assert!(ratio.validate(&ratio.mock()).is_ok());
        }

        let tiny = FloatType.between(0.001, 0.002);
        assert!(tiny.validate(&tiny.mock()).is_ok());
    }

    #[test]
    fn test_float_type() {
        assert!(FloatType.validate(&json!(1)).is_ok());
        assert!(FloatType.validate(&json!(1.25)).is_ok());
        assert!(FloatType.validate(&json!(true)).is_err());
        assert_eq!(FloatType.parse_str("2.5").unwrap(), json!(2.5));
        assert!(FloatType.parse_str("NaN").is_err());
        assert!(FloatType.mock().is_f64());
    }

    #[test]
    fn test_bool_type() {
        assert!(BoolType.validate(&json!(false)).is_ok());
        assert!(BoolType.validate(&json!(0)).is_err());
        assert_eq!(BoolType.parse_str("Yes").unwrap(), json!(true));
        assert_eq!(BoolType.parse_str("0").unwrap(), json!(false));
        assert!(BoolType.parse_str("maybe").is_err());
    }

    #[test]
    fn test_string_type_constraints() {
        let code = StringType::new()
            .min_length(2)
            .max_length(4)
            .pattern(Regex::new("^[a-z]+$").unwrap());

        assert!(code.validate(&json!("abc")).is_ok());
        assert_eq!(code.validate(&json!("a")).unwrap_err().kind, ValidationKind::Length);
        assert_eq!(code.validate(&json!("abcde")).unwrap_err().kind, ValidationKind::Length);
        assert_eq!(code.validate(&json!("AB")).unwrap_err().kind, ValidationKind::Pattern);
        assert_eq!(code.validate(&json!(12)).unwrap_err().kind, ValidationKind::Type);
    }

    #[test]
    fn test_string_mock_respects_length() {
        let short = StringType::new().max_length(3);
        assert_eq!(short.mock().as_str().unwrap().len(), 3);

        let long = StringType::new().min_length(12);
        assert_eq!(long.mock().as_str().unwrap().len(), 12);
    }

    #[test]
    fn test_pattern_string_mocks_from_samples() {
        let sku = StringType::new()
            .pattern(Regex::new("^[A-Z]{3}-[0-9]{4}$").unwrap())
            .samples(["ABC-1234", "XYZ-0001"]);
        for _ in 0..10 {
            assert!(sku.validate(&sku.mock()).is_ok());
        }

        let unsampled = StringType::new().pattern(Regex::new("^[A-Z]{3}-[0-9]{4}$").unwrap());
        assert!(unsampled.mock().is_string());
    }

    #[test]
    fn test_datetime_type_explicit_format() {
        let date = DateTimeType::with_format("%d/%m/%Y %H:%M");

        assert!(date.validate(&json!("31/12/2024 23:59")).is_ok());
        assert!(date.validate(&json!("2024-12-31T23:59:00Z")).is_ok());
        assert_eq!(
            date.validate(&json!("yesterday")).unwrap_err().kind,
            ValidationKind::Pattern
        );
        assert_eq!(
            date.marshal(&json!("2024-12-31T23:59:00+00:00")),
            json!("31/12/2024 23:59")
        );
        assert_eq!(date.marshal(&json!("not a date")), json!("not a date"));
        assert_eq!(date.marshal(&Value::Null), Value::Null);
    }

    #[test]
    fn test_datetime_date_only_format() {
        let day = DateTimeType::with_format("%Y-%m-%d");
        assert!(day.validate(&json!("2024-02-29")).is_ok());
        assert_eq!(day.marshal(&json!("2024-02-29")), json!("2024-02-29"));
    }

    #[test]
    fn test_datetime_mock_is_valid() {
        let dt = DateTimeType::with_format("%Y-%m-%d %H:%M:%S");
        assert!(dt.validate(&dt.mock()).is_ok());
    }

    #[test]
    fn test_datetime_offset_format() {
        let stamped = DateTimeType::with_format("%Y-%m-%d %H:%M:%S %z");
        assert!(stamped.validate(&stamped.mock()).is_ok());
        assert!(stamped.validate(&json!("2024-03-01 12:00:00 +0200")).is_ok());
        assert_eq!(
            stamped.marshal(&json!("2024-03-01 12:00:00 +0200")),
            json!("2024-03-01 10:00:00 +0000")
        );
        assert_eq!(
            stamped.marshal(&json!("2024-03-01T12:00:00Z")),
            json!("2024-03-01 12:00:00 +0000")
        );
    }

    #[test]
    fn test_uuid_type() {
        let id = UuidType.mock();
        assert!(UuidType.validate(&id).is_ok());
        assert!(UuidType.validate(&json!("nope")).is_err());
        assert_eq!(
            UuidType.marshal(&json!("550E8400E29B41D4A716446655440000")),
            json!("550e8400-e29b-41d4-a716-446655440000")
        );
    }

    #[test]
    fn test_enum_type() {
        let role = EnumType::new(["admin", "member"]);

        assert!(role.validate(&json!("admin")).is_ok());
        assert_eq!(role.validate(&json!("root")).unwrap_err().kind, ValidationKind::Enum);
        assert!(role.validate(&json!(1)).is_err());
        assert!(role.variants().contains(&role.mock().as_str().unwrap().to_string()));
        assert_eq!(role.allowed_values().unwrap(), vec![json!("admin"), json!("member")]);
        assert_eq!(EnumType::default().mock(), Value::Null);
    }
}
