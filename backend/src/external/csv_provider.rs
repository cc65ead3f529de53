use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::external::price_provider::{normalize_points, PriceProvider, PriceProviderError};
use crate::models::PricePoint;

/// Reads `{dir}/{TICKER}.csv` files with `date` and `close` columns.
///
/// Yahoo-style exports (`Date,Open,High,Low,Close,...`) load as-is; extra
/// columns are ignored.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<PricePoint>, PriceProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut points = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row.map_err(|e| PriceProviderError::Parse(e.to_string()))?;
        if let Some(close) = row.close {
            points.push(PricePoint { date: row.date, close });
        }
    }
    Ok(normalize_points(points))
}

#[async_trait]
impl PriceProvider for CsvProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let path = self.path_for(ticker);
        debug!("Reading prices for {} from {}", ticker, path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PriceProviderError::NotFound)
            }
            Err(e) => {
                return Err(PriceProviderError::BadResponse(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(parse_csv(&bytes)?
            .into_iter()
            .filter(|p| p.date >= start && p.date < end)
            .collect())
    }
}
