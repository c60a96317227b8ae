//! API route handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::exchange::ExchangeRateService;
use crate::moderation::ModerationGate;
use crate::scraper::{build_search_url, Scraper};
use crate::stats::calculate_statistics;
use crate::types::{ErrorResponse, HealthResponse, StatsParams, StatsResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub scraper: Scraper,
    pub exchange: ExchangeRateService,
    pub moderation: Arc<dyn ModerationGate>,
    pub config: AppConfig,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Sold-listing statistics endpoint.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let verdict = state
        .moderation
        .allowed(&params.query, params.caller_id)
        .await;
    if !verdict.allowed {
        tracing::info!("Query rejected by moderation gate: {:?}", verdict.reason);
        return Err(ApiError::forbidden(
            verdict
                .user_message
                .unwrap_or_else(|| "This query is not allowed.".to_string()),
        ));
    }

    let listings = state
        .scraper
        .fetch_sold_listings(&params.query)
        .await
        .map_err(|e| {
            // Technical detail stays in the log; callers get a generic line
            tracing::error!("Scraping error for {:?}: {}", params.query, e);
            ApiError::upstream("Failed to fetch listings. Please try again later.")
        })?;

    if listings.is_empty() {
        return Err(ApiError::not_found("No listings found for your query."));
    }

    let prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    let stats = calculate_statistics(
        &prices,
        &state.exchange,
        &state.config.exchange.from_currency,
        &state.config.exchange.to_currency,
    )
    .await
    .map_err(|e| {
        tracing::error!("Statistics error for {:?}: {}", params.query, e);
        ApiError::upstream("Failed to compute statistics. Please try again later.")
    })?;

    Ok(Json(StatsResponse {
        query: params.query.clone(),
        url: build_search_url(&params.query),
        stats,
    }))
}
