/// HTTP-level tests for the analysis form and JSON API.
///
/// The router is driven in-process with `tower::ServiceExt::oneshot` against
/// stub and mock price providers, so no network access is needed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use stockscope::app::create_app;
use stockscope::external::mock::MockProvider;
use stockscope::external::price_provider::{PriceProvider, PriceProviderError};
use stockscope::models::PricePoint;
use stockscope::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serves a fixed series for "AAA" and "BBB"; every other ticker is unknown.
struct FixtureProvider;

#[async_trait]
impl PriceProvider for FixtureProvider {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let closes: &[f64] = match ticker {
            "AAA" => &[100.0, 110.0, 121.0],
            "BBB" => &[0.0, 5.0, 10.0],
            _ => return Err(PriceProviderError::NotFound),
        };
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + ChronoDuration::days(i as i64), c))
            .collect())
    }
}

/// Never answers within any reasonable timeout.
struct SlowProvider;

#[async_trait]
impl PriceProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch_daily_history(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![])
    }
}

fn app_with(provider: Arc<dyn PriceProvider>, timeout: Duration) -> Router {
    create_app(AppState {
        price_provider: provider,
        request_timeout: timeout,
        max_tickers: 5,
    })
}

fn fixture_app() -> Router {
    app_with(Arc::new(FixtureProvider), Duration::from_secs(5))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analysis")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_api_isolates_unavailable_ticker() {
    let response = fixture_app()
        .oneshot(json_request(json!({
            "tickers": ["AAA", "XYZ", "BBB"],
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["ticker"], "AAA");
    assert_eq!(results[0]["total_return"]["status"], "percent");
    let aaa = results[0]["total_return"]["value"].as_f64().unwrap();
    assert!((aaa - 21.0).abs() < 1e-9);
    assert_eq!(results[0]["metrics"]["daily_return"][0], Value::Null);
    let r1 = results[0]["metrics"]["daily_return"][1].as_f64().unwrap();
    assert!((r1 - 0.10).abs() < 1e-9);

    assert_eq!(results[1]["ticker"], "XYZ");
    assert_eq!(results[1]["total_return"]["status"], "unavailable");
    assert_eq!(results[1]["metrics"], Value::Null);

    // zero first close: total return is unavailable but metrics still exist
    assert_eq!(results[2]["ticker"], "BBB");
    assert_eq!(results[2]["total_return"]["status"], "unavailable");
    assert_eq!(results[2]["metrics"]["daily_return"][1], Value::Null);

    let chart = body["chart"].as_array().unwrap();
    let charted: Vec<&str> = chart.iter().map(|c| c["ticker"].as_str().unwrap()).collect();
    assert_eq!(charted, vec!["AAA", "BBB"]);
}

#[tokio::test]
async fn test_api_rejects_inverted_range() {
    let response = fixture_app()
        .oneshot(json_request(json!({
            "tickers": ["AAA"],
            "start_date": "2024-03-01",
            "end_date": "2024-02-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_rejects_too_many_tickers() {
    let response = fixture_app()
        .oneshot(json_request(json!({
            "tickers": ["A", "B", "C", "D", "E", "F"],
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_zero_length_range_is_unavailable() {
    let response = fixture_app()
        .oneshot(json_request(json!({
            "tickers": ["AAA", "BBB"],
            "start_date": "2024-01-01",
            "end_date": "2024-01-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["total_return"]["status"], "unavailable");
    }
    assert!(body["chart"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_api_times_out() {
    let app = app_with(Arc::new(SlowProvider), Duration::from_millis(50));
    let response = app
        .oneshot(json_request(json!({
            "tickers": ["AAA"],
            "start_date": "2024-01-01",
            "end_date": "2024-02-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_api_with_mock_provider_fills_long_averages() {
    let app = app_with(Arc::new(MockProvider), Duration::from_secs(5));
    let response = app
        .oneshot(json_request(json!({
            "tickers": ["msft"],
            "start_date": "2023-01-01",
            "end_date": "2024-01-01"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let result = &body["results"][0];
    assert_eq!(result["ticker"], "MSFT");

    let sma_200 = result["metrics"]["sma_200"].as_array().unwrap();
    assert!(sma_200.len() > 200);
    assert!(sma_200[198].is_null());
    assert!(sma_200[199].is_f64());

    let volatility = result["metrics"]["volatility"].as_array().unwrap();
    assert!(volatility[20].is_null());
    assert!(volatility[21].is_f64());
}

// ---------------------------------------------------------------------------
// HTML form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_form_page_renders() {
    let response = fixture_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<h1>Stock Analysis</h1>"));
    assert!(!html.contains("Analysis Results"));
}

#[tokio::test]
async fn test_form_submission_lists_results() {
    let response = fixture_app()
        .oneshot(form_request("tickers=AAA%2C+XYZ&start_date=2024-01-01&end_date=2024-02-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<li>AAA: 21.00%</li>"));
    assert!(html.contains("<li>XYZ: Data not available</li>"));
    assert!(html.contains("AAA SMA 50"));
    assert!(!html.contains("XYZ Close"));
}

#[tokio::test]
async fn test_form_validation_error_rerenders_form() {
    let response = fixture_app()
        .oneshot(form_request("tickers=&start_date=2024-01-01&end_date=2024-02-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("At least one ticker symbol is required"));
    assert!(html.contains("<form method=\"POST\""));
}

#[tokio::test]
async fn test_health_reports_provider() {
    let response = fixture_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["provider"], "fixture");
}
