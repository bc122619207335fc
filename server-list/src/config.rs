//! Configuration for the server list loader
//!
//! Controls where the list is fetched from and how long the fetch may take.
//! The endpoint is compiled in; overriding it is intended for mirrors and
//! tests.

use std::time::Duration;

use crate::error::ConfigError;

/// Public server list endpoint.
pub const DEFAULT_URL: &str = "https://mumble.info/list2.cgi";

/// Configuration for [`PublicServerList`](crate::PublicServerList)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Feed location
    /// Default: [`DEFAULT_URL`]
    pub url: String,

    /// Upper bound for the whole request, including reading the body
    /// Default: 15 seconds
    pub timeout: Duration,

    /// Upper bound for establishing the connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// `User-Agent` header sent with the request
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("server-list/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LoaderConfig {
    /// Create a new LoaderConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SERVER_LIST_URL` and `SERVER_LIST_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SERVER_LIST_URL") {
            config.url = url;
        }

        if let Ok(secs) = std::env::var("SERVER_LIST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    name: "SERVER_LIST_TIMEOUT_SECS",
                    reason: e.to_string(),
                }
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check the URL and timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("timeout"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect_timeout"));
        }

        Ok(())
    }
}
