// HTTP request handlers
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct CoverageQuery {
    pub date: Option<String>,
    pub dose: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Selectable date range
pub async fn date_range(State(state): State<Arc<AppState>>) -> Json<DateRange> {
    let service = &state.coverage_service;
    Json(DateRange {
        earliest: service.earliest_date().format("%Y-%m-%d").to_string(),
        latest: service.latest_date().format("%Y-%m-%d").to_string(),
    })
}

/// Coverage map for a date, dose type and area kind.
/// Missing parameters default to the latest date, partial coverage and countries.
pub async fn coverage(
    Query(query): Query<CoverageQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = state.coverage_service.clone();
    let date = query
        .date
        .unwrap_or_else(|| service.latest_date().format("%Y-%m-%d").to_string());
    let dose = query.dose.unwrap_or_else(|| "partial".to_string());
    let kind = query.kind.unwrap_or_else(|| "country".to_string());

    let selection = match service.select(&date, &dose, &kind) {
        Ok(selection) => selection,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let report = match tokio::task::spawn_blocking(move || service.coverage(&selection)).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Coverage task failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "coverage computation failed".to_string(),
            );
        }
    };

    match json_response(&report, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
