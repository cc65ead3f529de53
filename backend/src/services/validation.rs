use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::AppError;

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // letters, digits and the punctuation used by index / class / FX symbols
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9.\-^=]{1,15}$").expect("static regex"))
}

/// Split a comma-separated form field into raw ticker strings.
pub fn split_ticker_field(field: &str) -> Vec<String> {
    field.split(',').map(|t| t.to_string()).collect()
}

/// Trim, upper-case and deduplicate tickers, keeping first occurrence order.
pub fn normalize_tickers(raw: &[String], max_tickers: usize) -> Result<Vec<String>, AppError> {
    let mut tickers: Vec<String> = Vec::new();

    for t in raw {
        let ticker = t.trim().to_uppercase();
        if ticker.is_empty() {
            continue;
        }
        if !ticker_pattern().is_match(&ticker) {
            return Err(AppError::Validation(format!("Invalid ticker symbol: {}", t.trim())));
        }
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }

    if tickers.is_empty() {
        return Err(AppError::Validation("At least one ticker symbol is required".into()));
    }
    if tickers.len() > max_tickers {
        return Err(AppError::Validation(format!(
            "Too many tickers: {} (maximum is {})",
            tickers.len(),
            max_tickers
        )));
    }
    Ok(tickers)
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {}: expected YYYY-MM-DD", field)))
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}
