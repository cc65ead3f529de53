use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use stockscope::app;
use stockscope::config::{AppConfig, ProviderKind};
use stockscope::external::csv_provider::CsvProvider;
use stockscope::external::mock::MockProvider;
use stockscope::external::price_provider::PriceProvider;
use stockscope::external::yahoofinance::YahooFinanceProvider;
use stockscope::logging::{self, LoggingConfig};
use stockscope::state::AppState;

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn PriceProvider>> {
    let provider: Arc<dyn PriceProvider> = match config.provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using price provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new())
        }
        ProviderKind::Csv => {
            let dir = config
                .csv_dir
                .clone()
                .context("PRICE_CSV_DIR must be set for the csv provider")?;
            tracing::info!("📊 Using price provider: CSV files in {}", dir.display());
            Arc::new(CsvProvider::new(dir))
        }
        ProviderKind::Mock => {
            tracing::info!("📊 Using price provider: synthetic random walk");
            Arc::new(MockProvider)
        }
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState {
        price_provider: build_provider(&config)?,
        request_timeout: config.request_timeout,
        max_tickers: config.max_tickers,
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Stockscope running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
