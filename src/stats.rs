//! Price statistics over currency-converted listing prices.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::exchange::ExchangeRateService;

/// Five-number summary of converted prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub min_price: f64,
    pub q1_price: f64,
    pub median_price: f64,
    pub q3_price: f64,
    pub max_price: f64,
    pub total_listings: usize,
}

/// Apply an exchange rate to a price sequence.
///
/// Public so a renderer can be handed the exact converted sequence the
/// statistics were computed from.
pub fn convert_prices(prices: &[f64], rate: f64) -> Vec<f64> {
    prices.iter().map(|p| p * rate).collect()
}

/// Compute price statistics from raw prices.
///
/// The exchange rate is resolved once per call and applied to every price;
/// quartiles use linear interpolation between ranks and every value is
/// rounded to 2 decimal places.
pub async fn calculate_statistics(
    prices: &[f64],
    exchange: &ExchangeRateService,
    from_currency: &str,
    to_currency: &str,
) -> Result<PriceStatistics, StatsError> {
    if prices.is_empty() {
        return Err(StatsError::EmptyPrices);
    }

    let rate = exchange.get_rate(from_currency, to_currency).await;

    let mut converted = convert_prices(prices, rate);
    // total_cmp keeps the sort panic-free even if a non-finite value slips
    // through upstream filtering (NaN orders after all finite prices)
    converted.sort_by(f64::total_cmp);

    Ok(PriceStatistics {
        min_price: round2(converted[0]),
        q1_price: round2(quantile(&converted, 0.25)),
        median_price: round2(quantile(&converted, 0.5)),
        q3_price: round2(quantile(&converted, 0.75)),
        max_price: round2(converted[converted.len() - 1]),
        total_listings: prices.len(),
    })
}

/// Linear-interpolation quantile over a sorted slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExchangeConfig;
    use crate::exchange::RateSource;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedRate(f64);

    #[async_trait]
    impl RateSource for FixedRate {
        async fn fetch(&self, _from: &str, _to: &str) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn service(rate: f64) -> ExchangeRateService {
        ExchangeRateService::with_source(Arc::new(FixedRate(rate)), &ExchangeConfig::default())
    }

    async fn stats(prices: &[f64], rate: f64) -> PriceStatistics {
        calculate_statistics(prices, &service(rate), "USD", "CAD")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_five_number_summary() {
        let s = stats(&[100.0, 200.0, 300.0, 400.0, 500.0], 1.5).await;
        assert_eq!(s.min_price, 150.0);
        assert_eq!(s.q1_price, 300.0);
        assert_eq!(s.median_price, 450.0);
        assert_eq!(s.q3_price, 600.0);
        assert_eq!(s.max_price, 750.0);
        assert_eq!(s.total_listings, 5);
    }

    #[tokio::test]
    async fn test_quantiles_interpolate_between_ranks() {
        // pos = 0.25 * 3 = 0.75 -> 10 + 0.75 * 10 = 17.5
        let s = stats(&[10.0, 20.0, 30.0, 40.0], 1.0).await;
        assert_eq!(s.q1_price, 17.5);
        assert_eq!(s.median_price, 25.0);
        assert_eq!(s.q3_price, 32.5);
    }

    #[tokio::test]
    async fn test_single_price_collapses_summary() {
        let s = stats(&[99.99], 1.0).await;
        assert_eq!(s.min_price, 99.99);
        assert_eq!(s.q1_price, 99.99);
        assert_eq!(s.median_price, 99.99);
        assert_eq!(s.q3_price, 99.99);
        assert_eq!(s.max_price, 99.99);
        assert_eq!(s.total_listings, 1);
    }

    #[tokio::test]
    async fn test_two_point_summary_matches_spec_scenario() {
        // Two surviving records at rate 1.4: quantiles interpolate between
        // the two converted values
        let s = stats(&[30.0, 9999.0], 1.4).await;
        assert_eq!(s.min_price, 42.0);
        assert_eq!(s.max_price, 13998.6);
        assert_eq!(s.median_price, round2((42.0 + 13998.6) / 2.0));
        assert_eq!(s.total_listings, 2);
    }

    #[tokio::test]
    async fn test_values_rounded_to_two_decimals() {
        let s = stats(&[10.333], 1.0).await;
        assert_eq!(s.median_price, 10.33);
    }

    #[tokio::test]
    async fn test_ordering_invariant() {
        let s = stats(&[7.0, 3.0, 11.0, 5.0, 2.0, 13.0], 1.37).await;
        assert!(s.min_price <= s.q1_price);
        assert!(s.q1_price <= s.median_price);
        assert!(s.median_price <= s.q3_price);
        assert!(s.q3_price <= s.max_price);
    }

    #[tokio::test]
    async fn test_non_finite_input_does_not_panic() {
        // The parser filters non-finite prices out; aggregation must still
        // not panic if one ever reaches it
        let s = stats(&[f64::NAN, 10.0], 1.0).await;
        assert_eq!(s.total_listings, 2);
        assert_eq!(s.min_price, 10.0);
        assert!(s.max_price.is_nan());
    }

    #[tokio::test]
    async fn test_empty_prices_is_an_error() {
        let err = calculate_statistics(&[], &service(1.0), "USD", "CAD")
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::EmptyPrices));
    }

    #[test]
    fn test_convert_prices_preserves_count_and_order() {
        assert_eq!(convert_prices(&[1.0, 2.0, 3.0], 2.0), vec![2.0, 4.0, 6.0]);
    }
}
