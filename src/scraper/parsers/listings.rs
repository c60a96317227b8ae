//! Sold-listing parser for eBay search result pages.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScrapeError;

/// Marker for the "related searches" block eBay appends after the real
/// results; everything past it belongs to a different query.
const RELATED_RESULTS_MARKER: &str = "Results matching fewer words";

/// Number of leading rows to discard. eBay reliably pads the results list
/// with two promotional rows that match the item selector but are not sold
/// listings. Brittle heuristic tied to the site's current markup.
const PROMO_ROW_COUNT: usize = 2;

/// One completed/sold listing extracted from a results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price: f64,
    pub url: Option<String>,
}

/// Parser for sold-listing search result pages
pub struct ListingParser;

impl ListingParser {
    /// Parse listings from HTML.
    ///
    /// Individual malformed listings are skipped; only a page without a
    /// recognizable results container is an error.
    pub fn parse(html: &str) -> Result<Vec<Listing>, ScrapeError> {
        let html = match html.find(RELATED_RESULTS_MARKER) {
            Some(pos) => &html[..pos],
            None => html,
        };

        let document = Html::parse_document(html);

        let container_selector = Selector::parse("ul.srp-results").unwrap();
        if document.select(&container_selector).next().is_none() {
            return Err(ScrapeError::StructuralParse(
                "results container not found".into(),
            ));
        }

        let item_selector = Selector::parse("li.s-item").unwrap();

        let listings: Vec<Listing> = document
            .select(&item_selector)
            .filter_map(|item| Self::parse_listing(&item))
            .collect();

        Ok(listings.into_iter().skip(PROMO_ROW_COUNT).collect())
    }

    /// Parse a single listing fragment; `None` when title or price are
    /// missing or the price text does not survive a numeric parse.
    fn parse_listing(item: &ElementRef) -> Option<Listing> {
        let title = first_text(item, ".s-item__title")?;
        let price_text = first_text(item, ".s-item__price")?;
        let url = first_attr(item, ".s-item__link", "href");

        let cleaned = price_text.replace('$', "").replace(',', "");
        // f64::parse accepts "NaN", "inf" and negative text; none of those
        // are prices, so they are skipped like any other unparseable value
        match cleaned.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => {
                Some(Listing { title, price, url })
            }
            _ => {
                warn!("Failed to parse price: {} for listing: {}", price_text, title);
                None
            }
        }
    }
}

/// Text of the first element matching `sel`, trimmed; `None` when absent
/// or empty.
fn first_text(el: &ElementRef, sel: &str) -> Option<String> {
    let selector = Selector::parse(sel).unwrap();
    let text = el
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Attribute of the first element matching `sel`.
fn first_attr(el: &ElementRef, sel: &str, name: &str) -> Option<String> {
    let selector = Selector::parse(sel).unwrap();
    el.select(&selector)
        .next()?
        .value()
        .attr(name)
        .map(|s| s.to_string())
}
