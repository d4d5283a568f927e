//! Process-wide settings.
//!
//! Settings are resolved once, before any model is used, and are read-only
//! afterwards. Call [`init_settings`] at startup to install explicit values;
//! otherwise the first call to [`settings`] reads them from the environment.
//!
//! | Variable                | Default               |
//! |-------------------------|-----------------------|
//! | `MODELKIT_DATE_FORMAT`  | `%Y-%m-%d %H:%M:%S`   |
//! | `MODELKIT_PER_PAGE`     | `20`                  |
//! | `MODELKIT_MAX_PER_PAGE` | `100`                 |

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const DEFAULT_MAX_PER_PAGE: u64 = 100;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `chrono` format string used when marshalling date-times
    pub date_format: String,
    /// Page size a paginated query model falls back to
    pub per_page: u64,
    /// Upper bound applied to any requested page size
    pub max_per_page: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

impl Settings {
    /// Build settings from `MODELKIT_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(format) = lookup("MODELKIT_DATE_FORMAT").filter(|f| !f.trim().is_empty()) {
            settings.date_format = format;
        }
        settings.per_page = parse_number(&lookup, "MODELKIT_PER_PAGE", settings.per_page);
        settings.max_per_page =
            parse_number(&lookup, "MODELKIT_MAX_PER_PAGE", settings.max_per_page);

        if settings.per_page > settings.max_per_page {
            tracing::warn!(
                per_page = settings.per_page,
                max_per_page = settings.max_per_page,
                "per_page exceeds max_per_page, clamping"
            );
            settings.per_page = settings.max_per_page;
        }

        settings
    }

    /// Parse settings from a JSON document; missing keys keep their default.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: u64) -> u64 {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            fallback
        }),
        None => fallback,
    }
}

/// Install settings for the whole process.
///
/// # Errors
///
/// Returns the rejected settings if they were already initialised, either by
/// an earlier call or implicitly through [`settings`].
pub fn init_settings(settings: Settings) -> Result<(), Settings> {
    SETTINGS.set(settings)
}

/// The process-wide settings, read from the environment on first access.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(Settings::from_env)
}
