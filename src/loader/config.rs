//! Loader configuration.

use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loader configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Run the auto-detect pass
    pub auto_detect: bool,
    /// Emit diagnostic logging
    pub debug: bool,
    /// Retries after the first failed attempt
    pub retry_attempts: u32,
    /// Pause before each retry (ms)
    #[serde(rename = "retryDelay")]
    pub retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            debug: false,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl LoaderConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default config with `debug` derived from the page location.
    ///
    /// Debug is on for `localhost` or when the query string asks for it.
    pub fn for_location(hostname: &str, query: &str) -> Self {
        Self::default().with_debug(hostname == "localhost" || query.contains("debug=true"))
    }

    /// Enable or disable auto-detection.
    pub fn with_auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect = enabled;
        self
    }

    /// Enable or disable diagnostics.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set retry count.
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Retry delay as a duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
