//! Request and response types for the soldwatch API.

use serde::{Deserialize, Serialize};

use crate::stats::PriceStatistics;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Query parameters for the stats endpoint
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub query: String,
    /// Identifier the moderation gate keys suspensions on
    #[serde(default)]
    pub caller_id: u64,
}

/// Stats endpoint response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub query: String,
    /// The search URL the listings were fetched from, for display
    pub url: String,
    pub stats: PriceStatistics,
}
