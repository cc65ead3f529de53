use std::sync::Arc;
use std::time::Duration;

use crate::external::price_provider::PriceProvider;

#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub request_timeout: Duration,
    pub max_tickers: usize,
}
