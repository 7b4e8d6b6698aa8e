//! Client configuration
//!
//! Defaults match the local development server; every value can be
//! overridden through the environment.

use std::time::Duration;

use crate::view::PageSize;
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

pub const ENV_API_URL: &str = "TASKDESK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TASKDESK_TIMEOUT_SECS";
pub const ENV_PAGE_SIZE: &str = "TASKDESK_PAGE_SIZE";

/// Configuration for the remote task API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote API, without the `/api/...` path
    pub base_url: String,
    /// Client-side request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Initial page size of list views
    pub page_size: PageSize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            page_size: PageSize::default(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup(ENV_API_URL)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.base_url);

        let timeout = lookup(ENV_TIMEOUT_SECS)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let page_size = lookup(ENV_PAGE_SIZE)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .and_then(|n| PageSize::try_from(n).ok())
            .unwrap_or(defaults.page_size);

        Self {
            base_url,
            timeout,
            page_size,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::Config(format!("unsupported URL scheme '{}'", other))),
        }
    }
}
