use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set when PRICE_PROVIDER={1}")]
    Missing(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Csv,
    Mock,
}

impl ProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "yahoo" => Some(ProviderKind::Yahoo),
            "csv" => Some(ProviderKind::Csv),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
    pub csv_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub max_tickers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            provider: ProviderKind::Yahoo,
            csv_dir: None,
            request_timeout: Duration::from_secs(30),
            max_tickers: 20,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let provider = match lookup("PRICE_PROVIDER") {
            None => defaults.provider,
            Some(v) => ProviderKind::parse(&v).ok_or(ConfigError::InvalidValue {
                key: "PRICE_PROVIDER",
                value: v,
            })?,
        };

        let timeout_secs: u64 = parse_var(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout.as_secs(),
        )?;

        let config = Self {
            bind_addr: parse_var("BIND_ADDR", lookup("BIND_ADDR"), defaults.bind_addr)?,
            provider,
            csv_dir: lookup("PRICE_CSV_DIR").map(PathBuf::from),
            request_timeout: Duration::from_secs(timeout_secs),
            max_tickers: parse_var("MAX_TICKERS", lookup("MAX_TICKERS"), defaults.max_tickers)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == ProviderKind::Csv && self.csv_dir.is_none() {
            return Err(ConfigError::Missing("PRICE_CSV_DIR", "csv"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        if self.max_tickers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_TICKERS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
