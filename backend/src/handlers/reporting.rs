//! Reporting handlers for weekly summaries and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct WeeklyReportQuery {
    /// Last day of the window; defaults to today
    pub end: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

/// Get the weekly plot comparison
pub async fn get_weekly_report(
    State(state): State<AppState>,
    Query(query): Query<WeeklyReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.ledgers.clone());
    let end = query.end.unwrap_or_else(|| Utc::now().date_naive());
    let report = service.weekly(end)?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&report.plots)?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"weekly_report.csv\"")],
            csv,
        ).into_response())
    } else {
        Ok(Json(report).into_response())
    }
}

/// Export the decision log as CSV
pub async fn export_decisions(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = state.ledgers.decisions.read_all()?;
    let csv = ReportingService::export_to_csv(&rows)?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"decisions.csv\"")],
        csv,
    ))
}
