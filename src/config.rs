//! Configuration for the soldwatch service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryConfig;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Total fetch attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in seconds; attempt n waits base * (n + 1)
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_secs() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ScraperConfig {
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs_f64(self.base_delay_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Exchange rate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Seconds a cached rate stays fresh
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,
    /// Rate used when no fetch ever succeeded; deliberate degrade-gracefully
    /// policy so statistics stay available through upstream outages
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
    #[serde(default = "default_from_currency")]
    pub from_currency: String,
    #[serde(default = "default_to_currency")]
    pub to_currency: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_freshness_secs() -> u64 {
    3600
}

fn default_fallback_rate() -> f64 {
    1.4
}

fn default_from_currency() -> String {
    "USD".to_string()
}

fn default_to_currency() -> String {
    "CAD".to_string()
}

fn default_endpoint() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_freshness_secs(),
            fallback_rate: default_fallback_rate(),
            from_currency: default_from_currency(),
            to_currency: default_to_currency(),
            endpoint: default_endpoint(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (SOLDWATCH_SERVER_PORT, etc.)
            .add_source(
                config::Environment::with_prefix("SOLDWATCH")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.max_attempts, 3);
        assert_eq!(config.scraper.base_delay_secs, 1.0);
        assert_eq!(config.exchange.freshness_secs, 3600);
        assert_eq!(config.exchange.fallback_rate, 1.4);
        assert_eq!(config.exchange.from_currency, "USD");
        assert_eq!(config.exchange.to_currency, "CAD");
    }

    #[test]
    fn test_retry_config_from_scraper_config() {
        let retry = ScraperConfig::default().retry();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_secs(1));
    }
}
