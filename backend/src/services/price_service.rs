use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{LabeledSeries, Series, SeriesSet};

/// Fetch one ticker and fold every failure into `Series::Unavailable`.
pub async fn fetch_series(
    provider: &dyn PriceProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Series {
    match provider.fetch_daily_history(ticker, start, end).await {
        Ok(points) => {
            let count = points.len();
            let series = Series::from_points(points);
            if series.is_available() {
                info!("✓ Fetched {} prices for {} from {}", count, ticker, provider.name());
            } else {
                warn!(
                    "{} returned no prices for {} in [{}, {})",
                    provider.name(),
                    ticker,
                    start,
                    end
                );
            }
            series
        }
        Err(PriceProviderError::RateLimited) => {
            warn!("Rate limited by {} for {}, marking unavailable", provider.name(), ticker);
            Series::Unavailable
        }
        Err(e) => {
            warn!("✗ Failed to fetch prices for {} from {}: {}", ticker, provider.name(), e);
            Series::Unavailable
        }
    }
}

/// Fetch every ticker concurrently. The result keeps the order of `tickers`.
///
/// An empty range (`start >= end`) skips the provider entirely and marks every
/// ticker unavailable.
pub async fn fetch_series_set(
    provider: &dyn PriceProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> SeriesSet {
    if start >= end {
        info!(
            "Empty date range [{}, {}), skipping fetch for {} tickers",
            start,
            end,
            tickers.len()
        );
        return tickers
            .iter()
            .map(|t| LabeledSeries::new(t.clone(), Series::Unavailable))
            .collect();
    }

    let batch_start = std::time::Instant::now();
    let fetches = tickers.iter().map(|ticker| async move {
        let series = fetch_series(provider, ticker, start, end).await;
        LabeledSeries::new(ticker.clone(), series)
    });

    let set: SeriesSet = join_all(fetches).await.into_iter().collect();
    info!("📋 Fetched {} tickers in {:?}", set.len(), batch_start.elapsed());
    set
}
