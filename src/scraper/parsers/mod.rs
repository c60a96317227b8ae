//! HTML parsers for marketplace data.

pub mod listings;

pub use listings::{Listing, ListingParser};
