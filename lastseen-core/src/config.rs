//! Configuration types

use crate::error::{ConfigError, LastseenError, LastseenResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the recency cache and its refresh helpers.
///
/// Durations are expressed in whole seconds when serialized so the config
/// reads naturally from TOML (`ttl = 300`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyConfig {
    /// How long one ingest stays valid.
    #[serde(with = "duration_secs")]
    pub ttl: Duration,
    /// Activity kind that counts as an access.
    pub tracked_kind: String,
    /// Top-level context field holding the resource id.
    pub id_field: String,
    /// Nested context path tried when `id_field` is absent.
    /// `None` requires `id_field` to be present.
    pub fallback_id_path: Option<Vec<String>>,
    /// Minimum age of the snapshot before `refresh_if_due` refetches.
    #[serde(with = "duration_secs")]
    pub refresh_interval: Duration,
    /// Events requested per page from the activity feed.
    pub page_size: usize,
    /// Upper bound on pages fetched per refresh.
    pub max_pages: usize,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            tracked_kind: "video_viewed".to_string(),
            id_field: "video_id".to_string(),
            fallback_id_path: Some(vec!["video".to_string(), "id".to_string()]),
            refresh_interval: Duration::from_secs(30),
            page_size: 100,
            max_pages: 10,
        }
    }
}

impl RecencyConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the tracked activity kind.
    pub fn with_tracked_kind(mut self, kind: impl Into<String>) -> Self {
        self.tracked_kind = kind.into();
        self
    }

    /// Set the primary id field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Set the nested fallback path, or disable it with `None`.
    pub fn with_fallback_id_path<I, S>(mut self, path: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_id_path = path.map(|p| p.into_iter().map(Into::into).collect());
        self
    }

    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set feed paging limits.
    pub fn with_paging(mut self, page_size: usize, max_pages: usize) -> Self {
        self.page_size = page_size;
        self.max_pages = max_pages;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `LASTSEEN_TTL_SECS`: TTL in seconds (default: 300)
    /// - `LASTSEEN_TRACKED_KIND`: tracked activity kind (default: `video_viewed`)
    /// - `LASTSEEN_ID_FIELD`: primary id field (default: `video_id`)
    /// - `LASTSEEN_FALLBACK_ID_PATH`: dot-separated fallback path, empty to
    ///   disable (default: `video.id`)
    /// - `LASTSEEN_REFRESH_INTERVAL_SECS`: refresh interval (default: 30)
    /// - `LASTSEEN_PAGE_SIZE`: feed page size (default: 100)
    /// - `LASTSEEN_MAX_PAGES`: pages per refresh (default: 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            ttl: secs("LASTSEEN_TTL_SECS", defaults.ttl),
            tracked_kind: lookup("LASTSEEN_TRACKED_KIND").unwrap_or(defaults.tracked_kind),
            id_field: lookup("LASTSEEN_ID_FIELD").unwrap_or(defaults.id_field),
            fallback_id_path: match lookup("LASTSEEN_FALLBACK_ID_PATH") {
                Some(path) if path.trim().is_empty() => None,
                Some(path) => Some(path.split('.').map(str::to_string).collect()),
                None => defaults.fallback_id_path,
            },
            refresh_interval: secs("LASTSEEN_REFRESH_INTERVAL_SECS", defaults.refresh_interval),
            page_size: lookup("LASTSEEN_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.page_size),
            max_pages: lookup("LASTSEEN_MAX_PAGES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_pages),
        }
    }

    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml_str(input: &str) -> LastseenResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - `ttl` and `refresh_interval` are positive
    /// - `tracked_kind` and `id_field` are non-empty
    /// - `fallback_id_path`, when set, has no empty segments
    /// - `page_size` and `max_pages` are positive
    pub fn validate(&self) -> LastseenResult<()> {
        if self.ttl.is_zero() {
            return Err(invalid("ttl", format!("{:?}", self.ttl), "ttl must be positive"));
        }

        if self.refresh_interval.is_zero() {
            return Err(invalid(
                "refresh_interval",
                format!("{:?}", self.refresh_interval),
                "refresh_interval must be positive",
            ));
        }

        if self.tracked_kind.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "tracked_kind".to_string(),
            }
            .into());
        }

        if self.id_field.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "id_field".to_string(),
            }
            .into());
        }

        if let Some(path) = &self.fallback_id_path {
            if path.is_empty() || path.iter().any(|segment| segment.trim().is_empty()) {
                return Err(invalid(
                    "fallback_id_path",
                    path.join("."),
                    "fallback_id_path segments must be non-empty",
                ));
            }
        }

        if self.page_size == 0 {
            return Err(invalid("page_size", "0", "page_size must be greater than 0"));
        }

        if self.max_pages == 0 {
            return Err(invalid("max_pages", "0", "max_pages must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: impl Into<String>, reason: &str) -> LastseenError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.into(),
        reason: reason.to_string(),
    }
    .into()
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// =============================================================================
// TESTS
// =============================================================================
