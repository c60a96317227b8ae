//! Web scraper module for ebay.com sold listings.
//!
//! Provides URL construction, resilient fetching, and HTML parsing.

pub mod parsers;
pub mod transport;

pub use parsers::{Listing, ListingParser};
pub use transport::{HttpTransport, Transport};

use std::sync::Arc;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::retry::{retry, RetryConfig, RetryOutcome};

/// Base URL for eBay search
pub const BASE_URL: &str = "https://www.ebay.com/sch/i.html";

/// Case-insensitive marker for eBay's anti-automation challenge page, which
/// arrives with HTTP 200 in place of real results.
const SOFT_BLOCK_MARKER: &str = "robot check";

/// Build the search URL for completed/sold auction listings.
///
/// Fixed parameter order and quote-plus query encoding keep the output
/// reproducible; the URL is also shown to users alongside the statistics.
pub fn build_search_url(query: &str) -> String {
    let encoded = urlencoding::encode(query).replace("%20", "+");
    format!(
        "{}?_nkw={}&LH_Complete=1&LH_Sold=1&LH_Auction=1&_sop=1&_dmd=1&LH_ItemCondition=3000&_ipg=60",
        BASE_URL, encoded
    )
}

/// Fetcher for sold-listing search result pages
pub struct Scraper {
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
}

impl Scraper {
    /// Create a scraper backed by a real HTTP client
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(config.timeout())?),
            retry: config.retry(),
        })
    }

    /// Create a scraper with a custom transport (used by tests)
    pub fn with_transport(transport: Arc<dyn Transport>, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }

    /// Fetch and parse sold listings for a query.
    ///
    /// Transport failures and soft blocks are retried with linear backoff;
    /// a structurally unparseable page is surfaced immediately.
    pub async fn fetch_sold_listings(&self, query: &str) -> Result<Vec<Listing>, ScrapeError> {
        let url = build_search_url(query);
        info!("Scraping eBay URL: {}", url);

        let outcome = retry(&self.retry, "sold listings fetch", || {
            let transport = self.transport.clone();
            let url = url.clone();
            async move {
                let body = transport.get(&url).await?;

                if body.to_lowercase().contains(SOFT_BLOCK_MARKER) {
                    return Err(ScrapeError::RateLimited(
                        "eBay robot check detected".into(),
                    ));
                }

                ListingParser::parse(&body)
            }
        })
        .await;

        match outcome {
            RetryOutcome::Ok(listings) => Ok(listings),
            RetryOutcome::Exhausted { attempts, last } => Err(ScrapeError::ExhaustedRetries {
                attempts,
                source: Box::new(last),
            }),
            RetryOutcome::Fatal(e) => Err(e),
        }
    }
}
