//! Decision handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{DecisionRecord, DecisionRow, Treatment};
use crate::services::{DailyInput, DailyRunService, SettingsService};
use crate::AppState;

#[derive(Deserialize)]
pub struct DecisionQuery {
    pub plot: Option<Treatment>,
}

/// Decide all plots for a day and log the result
pub async fn run_decisions(
    State(state): State<AppState>,
    Json(input): Json<DailyInput>,
) -> AppResult<(StatusCode, Json<Vec<DecisionRecord>>)> {
    let engine = SettingsService::new(state.ledgers.clone(), state.config.trial.clone()).engine()?;
    let service = DailyRunService::new(state.ledgers.clone());
    let records = service.run(&engine, &input)?;
    Ok((StatusCode::CREATED, Json(records)))
}

/// List logged decisions
pub async fn list_decisions(
    State(state): State<AppState>,
    Query(query): Query<DecisionQuery>,
) -> AppResult<Json<Vec<DecisionRow>>> {
    let service = DailyRunService::new(state.ledgers.clone());
    Ok(Json(service.decisions(query.plot)?))
}
