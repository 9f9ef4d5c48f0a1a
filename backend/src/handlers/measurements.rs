//! Daily measurement handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::models::MeasurementRow;
use crate::services::{DailyInput, DailyRunService};
use crate::AppState;

/// Record a day's readings without running the decision engine
pub async fn record_measurements(
    State(state): State<AppState>,
    Json(input): Json<DailyInput>,
) -> AppResult<(StatusCode, Json<Vec<MeasurementRow>>)> {
    let service = DailyRunService::new(state.ledgers.clone());
    let rows = service.record_measurements(&input)?;
    Ok((StatusCode::CREATED, Json(rows)))
}

/// List all recorded measurements
pub async fn list_measurements(State(state): State<AppState>) -> AppResult<Json<Vec<MeasurementRow>>> {
    Ok(Json(state.ledgers.measurements.read_all()?))
}
