//! HTTP request handlers for the pilot pay API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::compute_pay;
use crate::error::{EngineError, EngineResult};
use crate::export::{ISSUES_HEADER, export_result};
use crate::models::CalculationResult;
use crate::roster::{RosterFormat, RosterParser, filter_month, parse_month};

use super::request::{CalculateQuery, ExportQuery};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/export", post(export_handler))
        .with_state(state)
}

fn query_error(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection.body_text(),
        "Invalid query parameters"
    );
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiError::invalid_query(rejection.body_text())),
    )
        .into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Parses the roster body, applies the month filter and computes pay.
fn perform_calculation(
    state: &AppState,
    body: &[u8],
    format: RosterFormat,
    month: Option<&str>,
) -> EngineResult<CalculationResult> {
    let mut records = RosterParser::parse(body, format)?;
    if let Some(month) = month {
        let (year, month) = parse_month(month)?;
        records = filter_month(records, year, month);
    }

    Ok(compute_pay(&records, state.config(), state.directory()))
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a raw roster body and returns the calculation result as JSON.
async fn calculate_handler(
    State(state): State<AppState>,
    query: Result<Query<CalculateQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, bytes = body.len(), "Processing calculation request");

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_error(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_calculation(&state, &body, query.format, query.month.as_deref()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                line_items = result.line_items.len(),
                issues = result.issues.len(),
                gross_pay = %result.totals.gross_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(result),
            )
                .into_response()
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /export endpoint.
///
/// Accepts a raw roster body and returns the calculation report as a
/// downloadable artifact. The number of unpriced duties is repeated in the
/// `x-pay-issues` header.
async fn export_handler(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, bytes = body.len(), "Processing export request");

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_error(correlation_id, rejection),
    };

    let artifact = perform_calculation(&state, &body, query.format, query.month.as_deref())
        .and_then(|result| {
            let bytes = export_result(&result, query.output)?;
            Ok((bytes, result.issues.len()))
        });

    match artifact {
        Ok((bytes, issues)) => {
            if issues > 0 {
                warn!(correlation_id = %correlation_id, issues, "Export contains unpriced duties");
            }
            info!(
                correlation_id = %correlation_id,
                output = %query.output,
                bytes = bytes.len(),
                "Export completed successfully"
            );
            let disposition = format!(
                "attachment; filename=\"pilot-pay.{}\"",
                query.output.file_extension()
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, query.output.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                    (HeaderName::from_static(ISSUES_HEADER), issues.to_string()),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::directory::AirportDirectory;
    use axum::{body::Body, http::Request};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tower::ServiceExt;

    const ROSTER: &str = "date,flight,departure,arrival,duration\n2024-01-01,101,JFK,LAX,5.5\n";

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/pilot")
            .expect("Failed to load config")
            .into_config();
        let directory =
            AirportDirectory::load("./data/airports.csv").expect("Failed to load airports");
        AppState::new(config, directory)
    }

    async fn post(uri: &str, body: &'static str) -> Response {
        create_router(create_test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_calculate_returns_result() {
        let response = post("/calculate", ROSTER).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let result: CalculationResult =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(result.line_items.len(), 1);
        assert_eq!(
            result.line_items[0].amount,
            Decimal::from_str("275.00").unwrap()
        );
    }

    #[tokio::test]
    async fn test_calculate_empty_body() {
        let response = post("/calculate?format=csv", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let result: CalculationResult =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(result.line_items.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_roster_returns_400() {
        let response = post(
            "/calculate",
            "date,flight,departure,arrival,duration\nyesterday,101,JFK,LAX,5\n",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_INPUT");
        assert!(error.message.contains("line 2"));
    }

    #[tokio::test]
    async fn test_unknown_format_returns_400() {
        let response = post("/calculate?format=pdf", ROSTER).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_invalid_month_returns_400() {
        let response = post("/calculate?month=2024-13", ROSTER).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_csv_attachment() {
        let response = post("/export?output=csv", ROSTER).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"pilot-pay.csv\""
        );

        assert_eq!(response.headers().get(ISSUES_HEADER).unwrap(), "0");

        let body = body_bytes(response).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.starts_with("[summary]\nitem,value\n"));
        assert!(text.contains("\n[line_items]\ndate,flight,"));
        assert!(text.contains(",us_hourly,hourly,5.5,50.00,0,275.00\n"));
        assert!(text.ends_with("[issues]\nrow,date,flight,issue,detail\n"));
    }

    #[tokio::test]
    async fn test_export_keeps_unpriced_duties() {
        let roster = "date,flight,departure,arrival,duration\n\
            2024-01-01,101,JFK,LAX,5.5\n\
            2024-01-02,102,LAX,ZZZ,2:00\n";
        let response = post("/export?output=csv", roster).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(ISSUES_HEADER).unwrap(), "1");

        let body = body_bytes(response).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("2,2024-01-02,102,unresolved_airport,ZZZ"));
    }

    #[tokio::test]
    async fn test_export_text_keeps_unpriced_duties() {
        let roster = "date,flight,departure,arrival,duration\n2024-01-02,102,LAX,ZZZ,2:00\n";
        let response = post("/export?output=text", roster).await;
        assert_eq!(response.headers().get(ISSUES_HEADER).unwrap(), "1");

        let body = body_bytes(response).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("[issues]"));
        assert!(text.contains("unresolved_airport  ZZZ"));
    }

    #[tokio::test]
    async fn test_huge_duration_returns_400() {
        let response = post(
            "/calculate",
            "date,flight,departure,arrival,duration\n2024-01-01,101,JFK,LAX,99999999:00\n",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ApiError = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_INPUT");
        assert!(error.message.contains("line 2"));
    }

    #[tokio::test]
    async fn test_export_xlsx() {
        let response = post("/export?output=xlsx", ROSTER).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .contains("spreadsheetml")
        );
        assert_eq!(response.headers().get(ISSUES_HEADER).unwrap(), "0");
        assert!(body_bytes(response).await.starts_with(b"PK"));
    }
}
