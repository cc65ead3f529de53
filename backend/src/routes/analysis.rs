use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::services::analysis_service::{self, CancelFlag};
use crate::services::{price_service, validation};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_analysis))
}

async fn create_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    info!(
        "POST /api/analysis - {} tickers, {} to {}",
        request.tickers.len(),
        request.start_date,
        request.end_date
    );

    let tickers = validation::normalize_tickers(&request.tickers, state.max_tickers)?;
    validation::validate_range(request.start_date, request.end_date)?;

    run_analysis(&state, tickers, request.start_date, request.end_date)
        .await
        .map(Json)
}

/// Fetch and analyze `tickers` within the configured request timeout.
///
/// Every log line of the run, including the blocking worker's, carries the
/// `analysis_id` span field. On timeout the worker is told to stop before its
/// next ticker.
pub(crate) async fn run_analysis(
    state: &AppState,
    tickers: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AnalysisResponse, AppError> {
    let analysis_id = Uuid::new_v4();
    let span = info_span!("analysis", %analysis_id, tickers = tickers.len());

    async move {
        let cancel = CancelFlag::new();
        let provider = state.price_provider.clone();
        let worker_cancel = cancel.clone();

        let work = async move {
            let series_set =
                price_service::fetch_series_set(provider.as_ref(), &tickers, start, end).await;
            let worker_span = Span::current();
            let analysis = tokio::task::spawn_blocking(move || {
                let _entered = worker_span.enter();
                analysis_service::analyze_with_cancel(&series_set, &worker_cancel)
            })
            .await??;
            Ok::<_, AppError>(analysis)
        };

        match tokio::time::timeout(state.request_timeout, work).await {
            Ok(Ok(analysis)) => {
                let unavailable = analysis
                    .total_returns()
                    .filter(|(_, r)| r.percent().is_none())
                    .count();
                info!(
                    "✓ Analysis complete: {} tickers, {} unavailable",
                    analysis.results.len(),
                    unavailable
                );
                Ok(AnalysisResponse::new(analysis_id, start, end, analysis))
            }
            Ok(Err(e)) => {
                error!("Analysis failed: {}", e);
                Err(e)
            }
            Err(_) => {
                cancel.cancel();
                warn!("Analysis timed out after {:?}", state.request_timeout);
                Err(AppError::Timeout)
            }
        }
    }
    .instrument(span)
    .await
}
