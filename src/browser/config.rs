//! Rendering session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the reader load while debugging selectors.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Upper bound in seconds for condition waits (selectors, click targets).
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,

    /// Interval in milliseconds between selector checks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Fixed delay in milliseconds used when a ready condition never appears.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// User agent override for the browser page.
    #[serde(default)]
    pub user_agent: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_wait_timeout() -> u64 {
    10
}

pub fn default_poll_interval_ms() -> u64 {
    250
}

pub fn default_settle_delay_ms() -> u64 {
    3000
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_timeout(),
            wait_timeout: default_wait_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            chrome_args: Vec::new(),
            user_agent: None,
        }
    }
}

impl RenderConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: RenderConfig = toml::from_str("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert!(config.headless);
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_poll_interval_has_floor() {
        let config = RenderConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
    }
}
