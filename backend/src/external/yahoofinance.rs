use crate::external::price_provider::{normalize_points, PriceProvider, PriceProviderError};
use crate::models::PricePoint;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API. No API key required.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self::with_base_url(CHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; Stockscope/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: Option<YahooMeta>,
    // absent when the range holds no trading days
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    /// Exchange offset from UTC in seconds; bars are stamped at the local session open.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<PricePoint>, PriceProviderError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(PriceProviderError::NotFound)?;

    // Prefer split/dividend adjusted closes, fall back to raw closes.
    let closes = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    if closes.len() != result.timestamp.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let gmtoffset = result.meta.map(|m| m.gmtoffset).unwrap_or_default();

    let points = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(timestamp, close)| {
            // null closes are market holidays or halts
            let close = close?;
            let date = chrono::DateTime::from_timestamp(timestamp + gmtoffset, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .collect();

    Ok(normalize_points(points))
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let url = format!("{}/{}", self.base_url, ticker);
        // Padded by a day on each side: exchange-local dates can sit on
        // either side of the UTC day boundary.
        let period1 = unix_seconds(start - Duration::days(1)).to_string();
        let period2 = unix_seconds(end + Duration::days(1)).to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("interval", "1d"),
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", status)));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        let points = parse_chart(body)?;

        // half-open [start, end) in exchange-local dates
        Ok(points
            .into_iter()
            .filter(|p| p.date >= start && p.date < end)
            .collect())
    }
}
