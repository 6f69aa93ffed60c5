use std::time::Duration;

use url::Url;

use crate::polling::{DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
use crate::session_store::DEFAULT_SESSION_STORAGE_KEY;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const ENV_BASE_URL: &str = "SUPPORT_WIDGET_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "SUPPORT_WIDGET_POLL_INTERVAL_MS";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("support service url {base_url:?} is unusable: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
    #[error("poll interval must be a whole number of milliseconds, got {raw:?}")]
    InvalidPollInterval { raw: String },
}

/// Settings shared by every host of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub storage_key: String,
}

impl WidgetConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            storage_key: DEFAULT_SESSION_STORAGE_KEY.to_string(),
        })
    }

    /// Base URL and poll interval from the environment, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let (base_url, _) = resolve_base_url()?;
        let mut config = Self::new(&base_url)?;
        if let Some(poll_interval) = resolve_poll_interval()? {
            config = config.with_poll_interval(poll_interval);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    /// Joins `path` onto the base URL. `path` starts with '/'.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn resolve_base_url() -> Result<(String, &'static str), ConfigError> {
    if let Some(base_url) = env_setting(ENV_BASE_URL) {
        return normalize_base_url(&base_url).map(|normalized| (normalized, ENV_BASE_URL));
    }
    normalize_base_url(DEFAULT_BASE_URL).map(|normalized| (normalized, "default_local"))
}

pub fn resolve_poll_interval() -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = env_setting(ENV_POLL_INTERVAL_MS) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis).max(MIN_POLL_INTERVAL)))
        .map_err(|_| ConfigError::InvalidPollInterval { raw })
}

/// Validates the ticket service root. The result has no trailing '/', so
/// endpoint paths are appended as-is.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let base_url = raw.trim().trim_end_matches('/');
    if base_url.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: reason.to_string(),
    };

    // The parser would read "http:///api" as host "api".
    let authority = base_url.split_once("://").map(|(_, rest)| rest);
    if authority.is_none_or(|rest| rest.is_empty() || rest.starts_with('/')) {
        return Err(invalid("expected scheme://host"));
    }
    let parsed = Url::parse(base_url).map_err(|error| invalid(&error.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https are supported"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed"));
    }
    Ok(base_url.to_string())
}

/// Widget settings read from the environment; blank counts as unset.
fn env_setting(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
