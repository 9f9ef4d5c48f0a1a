//! Trial settings handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::{SettingRow, TrialConfig};
use crate::services::{SettingsService, SettingsUpdate};
use crate::AppState;

fn service(state: &AppState) -> SettingsService {
    SettingsService::new(state.ledgers.clone(), state.config.trial.clone())
}

/// Get the configuration the next run will use
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<TrialConfig>> {
    Ok(Json(service(&state).current()?))
}

/// Change trial settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<SettingsUpdate>,
) -> AppResult<Json<TrialConfig>> {
    Ok(Json(service(&state).update(&input)?))
}

/// List every recorded settings change
pub async fn get_settings_history(State(state): State<AppState>) -> AppResult<Json<Vec<SettingRow>>> {
    Ok(Json(service(&state).history()?))
}
