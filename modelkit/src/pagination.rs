use crate::config::Settings;
use crate::record::FieldSource;
use crate::validation::{ValidationError, ValidationKind};
use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;

/// Offset-based page window read from a bound query model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub offset: u64,
    pub per_page: u64,
}

impl Pagination {
    /// Read `offset` and `per_page` from `source`.
    ///
    /// Missing values fall back to `0` and `settings.per_page`; a requested
    /// page size above `settings.max_per_page` is clamped to it.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for negative or non-integer values and
    /// for a page size of zero.
    pub fn from_source(source: &dyn FieldSource, settings: &Settings) -> Result<Self, ValidationError> {
        let offset = read_count(source, "offset")?.unwrap_or(0);
        let requested = read_count(source, "per_page")?.unwrap_or(settings.per_page);

        if requested == 0 {
            return Err(ValidationError::rejected(
                ValidationKind::Range,
                "must be at least 1",
                &Value::from(requested),
            )
            .in_field("per_page"));
        }

        let per_page = requested.min(settings.max_per_page);
        if per_page < requested {
            tracing::debug!(requested, per_page, "clamping page size");
        }

        Ok(Self { offset, per_page })
    }

    /// 1-based page number containing `offset`
    #[must_use]
    pub fn page(&self) -> u64 {
        self.offset / self.per_page.max(1) + 1
    }

    /// `Content-Range` header for this window, e.g. `posts 0-19/150`.
    ///
    /// A window starting at or past the end of the collection yields the
    /// unsatisfied form `posts */150`. Control and non-ASCII characters are
    /// stripped from `resource_name`.
    #[must_use]
    pub fn content_range(&self, total_count: u64, resource_name: &str) -> HeaderMap {
        let safe_name: String = resource_name
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect();

        let range = if self.offset >= total_count {
            format!("{safe_name} */{total_count}")
        } else {
            let last = self
                .offset
                .saturating_add(self.per_page.max(1))
                .min(total_count)
                - 1;
            format!("{safe_name} {}-{last}/{total_count}", self.offset)
        };

        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&range) {
            Ok(value) => {
                headers.insert(CONTENT_RANGE, value);
            }
            Err(err) => tracing::warn!(error = %err, "could not build Content-Range header"),
        }
        headers
    }
}

fn read_count(source: &dyn FieldSource, name: &str) -> Result<Option<u64>, ValidationError> {
    match source.lookup(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) => Ok(Some(n)),
            None if value.as_i64().is_some() => Err(ValidationError::rejected(
                ValidationKind::Range,
                "must not be negative",
                value,
            )
            .in_field(name)),
            None => Err(ValidationError::rejected(
                ValidationKind::Type,
                "expected a non-negative integer",
                value,
            )
            .in_field(name)),
        },
    }
}
