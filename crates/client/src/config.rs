use std::time::Duration;

use timberdesk_core::env_config::{
    env_millis_with_default, env_parse_with_default, env_secs_with_default, env_string,
};
use timberdesk_core::{
    DEFAULT_API_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_PAGE_DELAY_MS, DEFAULT_TIMEOUT_SECS,
    MAX_PAGE_SIZE,
};

/// Connection settings for [`crate::ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    /// Server-side ceiling on `limit`.
    pub max_page_size: u64,
    /// Pause between pages of a progressive walk.
    pub page_delay: Duration,
    pub token: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("max_page_size", &self.max_page_size)
            .field("page_delay", &self.page_delay)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_page_size: MAX_PAGE_SIZE,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Read `TIMBERDESK_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let max_page_size = match env_parse_with_default("TIMBERDESK_MAX_PAGE_SIZE", MAX_PAGE_SIZE) {
            0 => {
                tracing::warn!("TIMBERDESK_MAX_PAGE_SIZE=0 is not usable, using {MAX_PAGE_SIZE}");
                MAX_PAGE_SIZE
            },
            n => n,
        };
        Self {
            base_url: env_string("TIMBERDESK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            timeout: env_secs_with_default("TIMBERDESK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            cache_ttl: env_secs_with_default("TIMBERDESK_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            max_page_size,
            page_delay: env_millis_with_default("TIMBERDESK_PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS),
            token: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}
