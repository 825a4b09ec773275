use std::path::PathBuf;
use std::sync::Arc;

use foliowatch::external::market_provider::MarketDataProvider;
use foliowatch::external::rate_limit::RateLimiter;
use foliowatch::external::yahoo::YahooProvider;
use foliowatch::logging::{init_logging, LoggingConfig};
use foliowatch::services::csv_import;
use foliowatch::services::fetcher::{Fetcher, DEFAULT_LOOKBACK_DAYS};
use foliowatch::services::portfolio::{MarketData, Portfolio};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(&LoggingConfig::from_env());

    // Select market data provider based on MARKET_PROVIDER env var
    let provider_name =
        std::env::var("MARKET_PROVIDER").unwrap_or_else(|_| "yahoo".to_string());
    let provider: Arc<dyn MarketDataProvider> = match provider_name.to_lowercase().as_str() {
        "yahoo" => {
            tracing::info!("using market data provider: Yahoo Finance");
            Arc::new(YahooProvider::new())
        }
        other => anyhow::bail!("invalid MARKET_PROVIDER: {other}. Must be 'yahoo'"),
    };

    let csv_path: PathBuf = std::env::var("PORTFOLIO_CSV")
        .unwrap_or_else(|_| "portfolio.csv".to_string())
        .into();
    let lookback_days: u32 = env_or("LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS);
    let max_concurrent: usize = env_or("FETCH_CONCURRENCY", 3);
    let requests_per_minute: u32 = env_or("REQUESTS_PER_MINUTE", 30);

    let mut portfolio = Portfolio::new();
    let imported = csv_import::import_csv_file(&csv_path, &mut portfolio)?;
    tracing::info!(
        "loaded {} holdings from {:?} ({} rows rejected)",
        imported.imported,
        csv_path,
        imported.errors.len()
    );
    for error in &imported.errors {
        tracing::warn!("{error}");
    }

    let limiter = Arc::new(RateLimiter::new(max_concurrent, requests_per_minute));
    let fetcher = Fetcher::new(provider, limiter, lookback_days);

    let tickers = portfolio.tickers();
    tracing::info!("fetching market data for {} tickers", tickers.len());
    let market: MarketData = fetcher.fetch_universe(&tickers).await.into_iter().collect();

    let report = portfolio.build_report(&market);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
