use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PricePoint;

/// Synthetic business-day random walk, for running without network access.
///
/// The walk is seeded from the ticker and anchored at 2000-01-03, so the same
/// ticker always produces the same closes for a given date.
pub struct MockProvider;

const ANCHOR: (i32, u32, u32) = (2000, 1, 3);
// No closes on or after this date, whatever `end` asks for.
const HORIZON: (i32, u32, u32) = (2100, 1, 1);
const START_PRICE: f64 = 100.0;

fn seed_for(ticker: &str) -> u64 {
    // FNV-1a
    ticker.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn generate_walk(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    let (Some(anchor), Some(horizon)) = (
        NaiveDate::from_ymd_opt(ANCHOR.0, ANCHOR.1, ANCHOR.2),
        NaiveDate::from_ymd_opt(HORIZON.0, HORIZON.1, HORIZON.2),
    ) else {
        return Vec::new();
    };
    let end = end.min(horizon);
    if end <= start || end <= anchor {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed_for(ticker));
    let mut current = START_PRICE;
    let mut points = Vec::new();
    let mut date = anchor;

    while date < end {
        if is_business_day(date) {
            current *= 1.0 + (rng.random::<f64>() - 0.5) * 0.02;
            if date >= start {
                points.push(PricePoint { date, close: current });
            }
        }
        date += Duration::days(1);
    }
    points
}

#[async_trait]
impl PriceProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let ticker = ticker.to_string();
        tokio::task::spawn_blocking(move || generate_walk(&ticker, start, end))
            .await
            .map_err(|e| {
                PriceProviderError::BadResponse(format!("walk generation failed: {}", e))
            })
    }
}
