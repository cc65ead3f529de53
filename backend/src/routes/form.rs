use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::AnalysisForm;
use crate::routes::analysis::run_analysis;
use crate::services::{report_service, validation};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show_form).post(submit_form))
}

async fn show_form() -> Html<String> {
    Html(report_service::render_page(&AnalysisForm::default(), None, None))
}

async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<AnalysisForm>,
) -> (StatusCode, Html<String>) {
    info!("POST / - tickers={:?} {} to {}", form.tickers, form.start_date, form.end_date);

    match analyze_form(&state, &form).await {
        Ok(page) => (StatusCode::OK, Html(page)),
        Err(e) => {
            warn!("Form analysis failed: {}", e);
            let (status, message) = match &e {
                AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AppError::Timeout => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "The analysis took too long. Try fewer tickers or a shorter range.".to_string(),
                ),
                AppError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong while analyzing the data.".to_string(),
                ),
            };
            (status, Html(report_service::render_page(&form, None, Some(&message))))
        }
    }
}

async fn analyze_form(state: &AppState, form: &AnalysisForm) -> Result<String, AppError> {
    let raw = validation::split_ticker_field(&form.tickers);
    let tickers = validation::normalize_tickers(&raw, state.max_tickers)?;
    let start = validation::parse_date("start date", &form.start_date)?;
    let end = validation::parse_date("end date", &form.end_date)?;
    validation::validate_range(start, end)?;

    let response = run_analysis(state, tickers, start, end).await?;
    Ok(report_service::render_page(form, Some(&response), None))
}
