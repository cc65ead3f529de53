use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::PricePoint;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("ticker not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily closes for `ticker` with `start <= date < end`, oldest first.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError>;
}

/// Sort ascending, drop non-finite closes and keep the last observation of a
/// repeated date.
pub fn normalize_points(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.retain(|p| p.close.is_finite());
    // stable sort keeps provider order among equal dates
    points.sort_by_key(|p| p.date);

    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => out.push(p),
        }
    }
    out
}
