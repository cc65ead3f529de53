use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Total return of a ticker over the requested range, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TotalReturn {
    Percent(f64),
    Unavailable,
}

impl TotalReturn {
    pub fn percent(&self) -> Option<f64> {
        match self {
            TotalReturn::Percent(value) => Some(*value),
            TotalReturn::Unavailable => None,
        }
    }
}

/// Derived sequences for one series. Every vector is aligned with `dates`;
/// `None` marks an entry that is not defined yet (warm-up or degenerate input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma_50: Vec<Option<f64>>,
    pub sma_200: Vec<Option<f64>>,
    pub daily_return: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
}

impl MetricsResult {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub points: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub total_return: TotalReturn,
    pub meta: Option<SeriesMeta>,
    pub metrics: Option<MetricsResult>,
}

/// Lines to plot for one ticker: close plus both moving averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma_50: Vec<Option<f64>>,
    pub sma_200: Vec<Option<f64>>,
}

/// Outcome of analyzing a whole series set, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub results: Vec<TickerAnalysis>,
}

impl Analysis {
    pub fn get(&self, ticker: &str) -> Option<&TickerAnalysis> {
        self.results.iter().find(|r| r.ticker == ticker)
    }

    pub fn total_return(&self, ticker: &str) -> Option<TotalReturn> {
        self.get(ticker).map(|r| r.total_return)
    }

    pub fn metrics(&self, ticker: &str) -> Option<&MetricsResult> {
        self.get(ticker).and_then(|r| r.metrics.as_ref())
    }

    pub fn total_returns(&self) -> impl Iterator<Item = (&str, TotalReturn)> {
        self.results
            .iter()
            .map(|r| (r.ticker.as_str(), r.total_return))
    }

    /// Plot input for every ticker that has data; unavailable tickers are left out.
    pub fn chart_series(&self) -> Vec<ChartSeries> {
        self.results
            .iter()
            .filter_map(|r| {
                r.metrics.as_ref().map(|m| ChartSeries {
                    ticker: r.ticker.clone(),
                    dates: m.dates.clone(),
                    close: m.close.clone(),
                    sma_50: m.sma_50.clone(),
                    sma_200: m.sma_200.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub results: Vec<TickerAnalysis>,
    pub chart: Vec<ChartSeries>,
}

impl AnalysisResponse {
    pub fn new(
        analysis_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        analysis: Analysis,
    ) -> Self {
        let chart = analysis.chart_series();
        Self {
            analysis_id,
            start_date,
            end_date,
            results: analysis.results,
            chart,
        }
    }
}

/// Raw form fields as submitted by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisForm {
    #[serde(default)]
    pub tickers: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}
