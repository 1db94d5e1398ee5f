//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the onboarding backend, e.g. `https://hr.internal/api`.
    /// The client appends `/onboarding` paths to this.
    pub api_base: String,
    /// Cadence of the stage-3 reply poller.
    pub poll_interval: Duration,
    /// Quiet period before a list-search keystroke actually queries.
    pub search_debounce: Duration,
    /// Records rendered per list page.
    pub page_size: usize,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3000/api".to_string(),
            poll_interval: Duration::from_secs(15),
            search_debounce: Duration::from_millis(300),
            page_size: 12,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ConsoleConfig {
    /// Build a config from the environment.
    ///
    /// `ONBOARD_API_BASE` is required; `ONBOARD_POLL_INTERVAL_SECS` and
    /// `ONBOARD_PAGE_SIZE` override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = std::env::var("ONBOARD_API_BASE")
            .map_err(|_| ConfigError::MissingEnvVar("ONBOARD_API_BASE".to_string()))?;

        let mut config = Self {
            api_base,
            ..Self::default()
        };

        if let Ok(secs) = std::env::var("ONBOARD_POLL_INTERVAL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ONBOARD_POLL_INTERVAL_SECS".to_string(),
                message: format!("not a number: {secs}"),
            })?;
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Ok(size) = std::env::var("ONBOARD_PAGE_SIZE") {
            let size: usize = size.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ONBOARD_PAGE_SIZE".to_string(),
                message: format!("not a number: {size}"),
            })?;
            config.page_size = size;
        }

        Ok(config)
    }
}
