use thiserror::Error;

use crate::models::{PricePoint, Series, TotalReturn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

fn check_window(window: usize, name: &str) -> Result<(), MetricsError> {
    if window == 0 {
        return Err(MetricsError::InvalidParameter(format!(
            "{name} window must be greater than zero"
        )));
    }
    Ok(())
}

/// Simple Moving Average over `close`.
/// Returns a vector aligned with `series`:
/// - `None` until `window` points exist
/// - `Some(avg)` of the trailing `window` closes afterwards
/// - `None` wherever the average is not finite
pub fn compute_rolling_mean(
    series: &[PricePoint],
    window: usize,
) -> Result<Vec<Option<f64>>, MetricsError> {
    check_window(window, "rolling mean")?;

    // Summed per window: entry i depends only on closes i-window+1..=i.
    Ok(series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                return None;
            }
            let sum: f64 = series[i + 1 - window..=i].iter().map(|p| p.close).sum();
            let mean = sum / window as f64;
            mean.is_finite().then_some(mean)
        })
        .collect())
}

/// Day-over-day fractional change of `close`.
///
/// Index 0 has no predecessor and is `None`. A zero previous close would
/// divide by zero, so that entry is `None` too.
pub fn compute_daily_returns(series: &[PricePoint]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    if series.is_empty() {
        return out;
    }

    out.push(None);
    out.extend(series.windows(2).map(|w| {
        let (prev, cur) = (w[0].close, w[1].close);
        if prev == 0.0 {
            return None;
        }
        let r = cur / prev - 1.0;
        r.is_finite().then_some(r)
    }));
    out
}

/// Rolling sample standard deviation of `returns`.
///
/// An entry is defined only when the trailing `window` entries ending at it
/// are all defined; a single `None` inside the window makes the result `None`.
/// With `window == 1` the sample deviation has no degrees of freedom and every
/// entry is `None`.
pub fn compute_rolling_volatility(
    returns: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, MetricsError> {
    check_window(window, "volatility")?;

    Ok((0..returns.len())
        .map(|i| {
            if window < 2 || i + 1 < window {
                return None;
            }
            let values: Option<Vec<f64>> = returns[i + 1 - window..=i].iter().copied().collect();
            values
                .map(|v| sample_std_dev(&v))
                .filter(|sd| sd.is_finite())
        })
        .collect())
}

fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    variance.sqrt()
}

/// Percentage change from the first to the last close.
pub fn compute_total_return(series: &Series) -> TotalReturn {
    let points = match series.points() {
        Some(points) if !points.is_empty() => points,
        _ => return TotalReturn::Unavailable,
    };

    // non-empty, checked above
    let first = points[0].close;
    let last = points[points.len() - 1].close;

    if points.len() == 1 {
        return TotalReturn::Percent(0.0);
    }
    if first == 0.0 {
        return TotalReturn::Unavailable;
    }

    let pct = (last / first - 1.0) * 100.0;
    if pct.is_finite() {
        TotalReturn::Percent(pct)
    } else {
        TotalReturn::Unavailable
    }
}
