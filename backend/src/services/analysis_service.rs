use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Analysis, MetricsResult, PricePoint, SeriesMeta, SeriesSet, TickerAnalysis};
use crate::services::indicators::{self, MetricsError};

pub const SMA_SHORT_WINDOW: usize = 50;
pub const SMA_LONG_WINDOW: usize = 200;
pub const VOLATILITY_WINDOW: usize = 21;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis cancelled after {completed} of {total} tickers")]
    Cancelled { completed: usize, total: usize },

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Shared flag used to abandon an analysis between tickers.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Compute SMA-50, SMA-200, daily returns and 21-day volatility for one series.
pub fn compute_metrics(points: &[PricePoint]) -> Result<MetricsResult, MetricsError> {
    let daily_return = indicators::compute_daily_returns(points);
    let volatility = indicators::compute_rolling_volatility(&daily_return, VOLATILITY_WINDOW)?;

    Ok(MetricsResult {
        dates: points.iter().map(|p| p.date).collect(),
        close: points.iter().map(|p| p.close).collect(),
        sma_50: indicators::compute_rolling_mean(points, SMA_SHORT_WINDOW)?,
        sma_200: indicators::compute_rolling_mean(points, SMA_LONG_WINDOW)?,
        daily_return,
        volatility,
    })
}

/// Analyze every series in the set, in order.
///
/// Each ticker is handled on its own: an unavailable series yields an
/// unavailable total return and no metrics, and never affects the others.
pub fn analyze(series_set: &SeriesSet) -> Result<Analysis, AnalysisError> {
    analyze_with_cancel(series_set, &CancelFlag::new())
}

/// Same as [`analyze`], but checks `cancel` before starting each ticker.
/// A ticker that has started is always finished.
pub fn analyze_with_cancel(
    series_set: &SeriesSet,
    cancel: &CancelFlag,
) -> Result<Analysis, AnalysisError> {
    let total = series_set.len();
    let mut results = Vec::with_capacity(total);

    for (completed, entry) in series_set.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("Analysis cancelled after {}/{} tickers", completed, total);
            return Err(AnalysisError::Cancelled { completed, total });
        }

        let total_return = indicators::compute_total_return(&entry.series);
        let (meta, metrics) = match entry.series.points() {
            Some(points) if !points.is_empty() => {
                let meta = SeriesMeta {
                    points: points.len(),
                    start: points.first().map(|p| p.date),
                    end: points.last().map(|p| p.date),
                };
                (Some(meta), Some(compute_metrics(points)?))
            }
            _ => {
                debug!("No data for {}, marking unavailable", entry.label);
                (None, None)
            }
        };

        results.push(TickerAnalysis {
            ticker: entry.label.clone(),
            total_return,
            meta,
            metrics,
        });
    }

    Ok(Analysis { results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Series, TotalReturn};
    use chrono::{Duration, NaiveDate};

    fn points(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
            .collect()
    }

    #[test]
    fn test_metrics_are_aligned_with_input() {
        let closes: Vec<f64> = (0..220).map(|i| 100.0 + i as f64).collect();
        let metrics = compute_metrics(&points(&closes)).unwrap();

        assert_eq!(metrics.len(), 220);
        assert_eq!(metrics.sma_50.len(), 220);
        assert_eq!(metrics.sma_200.len(), 220);
        assert_eq!(metrics.daily_return.len(), 220);
        assert_eq!(metrics.volatility.len(), 220);

        assert!(metrics.sma_50[48].is_none());
        assert!(metrics.sma_50[49].is_some());
        assert!(metrics.sma_200[198].is_none());
        assert!(metrics.sma_200[199].is_some());
        assert!(metrics.volatility[20].is_none());
        assert!(metrics.volatility[21].is_some());
    }

    #[test]
    fn test_unavailable_ticker_does_not_affect_others() {
        let mut set = SeriesSet::new();
        set.push("AAA", Series::Present(points(&[100.0, 110.0, 121.0])));
        set.push("XYZ", Series::Unavailable);
        set.push("BBB", Series::Present(points(&[50.0, 25.0])));

        let analysis = analyze(&set).unwrap();

        assert_eq!(analysis.results.len(), 3);
        assert_eq!(analysis.total_return("XYZ"), Some(TotalReturn::Unavailable));
        assert!(analysis.metrics("XYZ").is_none());

        let aaa = analysis.total_return("AAA").and_then(|t| t.percent()).unwrap();
        assert!((aaa - 21.0).abs() < 1e-9);
        let bbb = analysis.total_return("BBB").and_then(|t| t.percent()).unwrap();
        assert!((bbb + 50.0).abs() < 1e-9);

        let mut alone = SeriesSet::new();
        alone.push("AAA", Series::Present(points(&[100.0, 110.0, 121.0])));
        let alone = analyze(&alone).unwrap();
        assert_eq!(alone.get("AAA"), analysis.get("AAA"));
    }

    #[test]
    fn test_chart_series_omits_unavailable() {
        let mut set = SeriesSet::new();
        set.push("XYZ", Series::Unavailable);
        set.push("AAA", Series::Present(points(&[1.0, 2.0])));

        let chart = analyze(&set).unwrap().chart_series();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].ticker, "AAA");
        assert_eq!(chart[0].sma_50, vec![None, None]);
    }

    #[test]
    fn test_meta_reports_range() {
        let mut set = SeriesSet::new();
        set.push("AAA", Series::Present(points(&[1.0, 2.0, 3.0])));

        let analysis = analyze(&set).unwrap();
        let meta = analysis.get("AAA").and_then(|r| r.meta.clone()).unwrap();
        assert_eq!(meta.points, 3);
        assert_eq!(meta.start, NaiveDate::from_ymd_opt(2023, 3, 1));
        assert_eq!(meta.end, NaiveDate::from_ymd_opt(2023, 3, 3));
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut set = SeriesSet::new();
        set.push("AAA", Series::Present(points(&[1.0, 2.0])));

        let cancel = CancelFlag::new();
        cancel.cancel();

        match analyze_with_cancel(&set, &cancel) {
            Err(AnalysisError::Cancelled { completed, total }) => {
                assert_eq!(completed, 0);
                assert_eq!(total, 1);
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_set_yields_empty_analysis() {
        let analysis = analyze(&SeriesSet::new()).unwrap();
        assert!(analysis.results.is_empty());
        assert!(analysis.chart_series().is_empty());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let closes: Vec<f64> = (0..260).map(|i| 80.0 + (i as f64 * 0.11).cos() * 3.0).collect();
        let mut set = SeriesSet::new();
        set.push("AAA", Series::Present(points(&closes)));

        assert_eq!(analyze(&set).unwrap(), analyze(&set).unwrap());
    }
}
