//! Route definitions for the Smart Irrigation Trial API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Trial settings
        .nest("/config", config_routes())
        // Daily readings and decisions
        .route(
            "/measurements",
            get(handlers::list_measurements).post(handlers::record_measurements),
        )
        .nest("/decisions", decision_routes())
        .route(
            "/plant-heights",
            get(handlers::list_plant_heights).post(handlers::record_plant_heights),
        )
        .nest("/reports", report_routes())
}

fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_settings).put(handlers::update_settings))
        .route("/history", get(handlers::get_settings_history))
}

fn decision_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_decisions))
        .route("/run", post(handlers::run_decisions))
        .route("/export", get(handlers::export_decisions))
}

fn report_routes() -> Router<AppState> {
    Router::new().route("/weekly", get(handlers::get_weekly_report))
}
