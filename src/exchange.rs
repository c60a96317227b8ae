//! Cached currency exchange rate lookup.
//!
//! Rates are cached per currency pair with a freshness window. A failed
//! refresh degrades to the stale cached rate, and to a fixed fallback
//! constant when nothing was ever cached — callers always get a usable
//! number, never an error.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::config::ExchangeConfig;

/// A fetched exchange rate with its fetch time
#[derive(Debug, Clone, Copy)]
pub struct ExchangeRate {
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    fn is_expired(&self, max_age: Duration) -> bool {
        Utc::now() - self.fetched_at > max_age
    }
}

/// Source of fresh exchange rates, kept behind a trait so tests can count
/// fetches.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, from_currency: &str, to_currency: &str) -> Result<f64>;
}

/// Rate source backed by the exchangerate-api.com JSON endpoint
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new(endpoint: String) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }
}

#[derive(serde::Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self, from_currency: &str, to_currency: &str) -> Result<f64> {
        let url = format!("{}/{}", self.endpoint, from_currency);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: RatesResponse = response.json().await?;

        // A table without the target currency is as useless as a failed
        // request; it must not end up cached as a fresh entry.
        body.rates
            .get(to_currency)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("currency {} missing from rate table", to_currency))
    }
}

/// Exchange rate service with a per-pair cached rate
pub struct ExchangeRateService {
    source: Arc<dyn RateSource>,
    cache: Mutex<HashMap<String, ExchangeRate>>,
    max_age: Duration,
    fallback_rate: f64,
}

impl ExchangeRateService {
    /// Create a service backed by the real HTTP endpoint
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        Ok(Self::with_source(
            Arc::new(HttpRateSource::new(config.endpoint.clone())?),
            config,
        ))
    }

    /// Create a service with a custom rate source (used by tests)
    pub fn with_source(source: Arc<dyn RateSource>, config: &ExchangeConfig) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
            max_age: Duration::seconds(config.freshness_secs as i64),
            fallback_rate: config.fallback_rate,
        }
    }

    /// Get the exchange rate for a currency pair.
    ///
    /// Never fails: a fresh cached rate is returned without I/O, otherwise
    /// one fetch is attempted. On fetch failure the stale cached rate is
    /// served when one exists, and the configured fallback constant when
    /// not. The lock spans the fetch so concurrent callers cannot trigger
    /// duplicate refreshes for the same pair.
    pub async fn get_rate(&self, from_currency: &str, to_currency: &str) -> f64 {
        let cache_key = format!("{}-{}", from_currency, to_currency);

        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.get(&cache_key) {
            if !cached.is_expired(self.max_age) {
                return cached.rate;
            }
        }

        match self.source.fetch(from_currency, to_currency).await {
            Ok(rate) => {
                cache.insert(
                    cache_key,
                    ExchangeRate {
                        rate,
                        fetched_at: Utc::now(),
                    },
                );
                rate
            }
            Err(e) => {
                error!("Failed to fetch exchange rate: {}", e);
                if let Some(cached) = cache.get(&cache_key) {
                    warn!("Serving stale rate for {}", cache_key);
                    cached.rate
                } else {
                    warn!(
                        "No cached rate for {}; using fallback {}",
                        cache_key, self.fallback_rate
                    );
                    self.fallback_rate
                }
            }
        }
    }
}
