//! Error types for scraping and aggregation.

use thiserror::Error;

/// Errors produced while fetching and parsing sold listings.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport-level failure (DNS, connect, read, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the marketplace.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The marketplace returned a robot-check page instead of results.
    #[error("soft block detected: {0}")]
    RateLimited(String),

    /// Markup did not contain a recognizable results structure.
    #[error("unrecognized listings markup: {0}")]
    StructuralParse(String),

    /// Retry budget exhausted; wraps the last cause.
    #[error("giving up after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },
}

/// Classification used by the retry driver.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ScrapeError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport(_) | ScrapeError::Status(_) | ScrapeError::RateLimited(_)
        )
    }
}

/// Errors from statistics aggregation.
#[derive(Debug, Error)]
pub enum StatsError {
    /// No prices to aggregate.
    #[error("no prices provided for statistics calculation")]
    EmptyPrices,
}
