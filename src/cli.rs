//! CLI commands for soldwatch.
//!
//! Supports API server mode and a one-shot stats lookup.

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::exchange::ExchangeRateService;
use crate::scraper::{build_search_url, Scraper};
use crate::stats::calculate_statistics;
use crate::types::StatsResponse;

#[derive(Parser)]
#[command(name = "soldwatch")]
#[command(version, about = "Sold-listing price statistics API and CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Fetch sold listings for a query and print price statistics
    Stats {
        /// Free-text search query
        query: String,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

/// Run a one-shot stats lookup from the command line.
pub async fn run_stats(query: String, format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let scraper = Scraper::new(&config.scraper)?;
    let exchange = ExchangeRateService::new(&config.exchange)?;

    eprintln!("Fetching completed listings for: {}...", query);
    let listings = scraper.fetch_sold_listings(&query).await?;

    if listings.is_empty() {
        eprintln!("No listings found for your query.");
        return Ok(());
    }

    let prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    let stats = calculate_statistics(
        &prices,
        &exchange,
        &config.exchange.from_currency,
        &config.exchange.to_currency,
    )
    .await?;

    let url = build_search_url(&query);

    match format.as_str() {
        "json" => {
            let response = StatsResponse {
                query,
                url,
                stats,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        _ => {
            let currency = &config.exchange.to_currency;
            println!("{} sold-listing stats", query);
            println!("URL: {}", url);
            println!("Min Price: ${:.2} {}", stats.min_price, currency);
            println!("Q1 (25th Percentile): ${:.2} {}", stats.q1_price, currency);
            println!(
                "Median (50th Percentile): ${:.2} {}",
                stats.median_price, currency
            );
            println!("Q3 (75th Percentile): ${:.2} {}", stats.q3_price, currency);
            println!("Max Price: ${:.2} {}", stats.max_price, currency);
            println!("Total Listings: {}", stats.total_listings);
        }
    }

    Ok(())
}
