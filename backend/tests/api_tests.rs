//! HTTP API integration tests
//!
//! Drives the router in-process over in-memory ledgers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use smart_irrigation::config::{ServerConfig, StorageConfig};
use smart_irrigation::models::TrialConfig;
use smart_irrigation::storage::Ledgers;
use smart_irrigation::{create_app, AppState, Config};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        storage: StorageConfig {
            data_dir: PathBuf::from("unused"),
        },
        trial: TrialConfig::new(NaiveDate::from_ymd_opt(2025, 11, 6).unwrap()),
    };
    create_app(AppState {
        ledgers: Arc::new(Ledgers::in_memory()),
        config: Arc::new(config),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn daily(date: &str, eto: f64) -> Value {
    json!({
        "date": date,
        "eto_mm": eto,
        "rain_observed_mm": 0.0,
        "rain_forecast_24h_mm": 0.0,
        "note": "",
        "plots": [
            { "plot": "T2", "soil_moisture": 0.25 },
            { "plot": "T3", "ndvi": 0.7 }
        ]
    })
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "available");
}

#[tokio::test]
async fn test_run_decisions_and_list() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/v1/decisions/run", Some(daily("2025-11-07", 3.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["decision"], "Manual");
    assert_eq!(records[1]["policy"], "soil_or_balance");
    assert_eq!(records[1]["decision"], "Skip");

    let (status, body) = send(&app, "GET", "/api/v1/decisions?plot=T3", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["treatment"], "canopy_gated");
    assert_eq!(rows[0]["ndvi"], 0.7);
}

#[tokio::test]
async fn test_out_of_range_input_is_rejected() {
    let mut input = daily("2025-11-07", 3.0);
    input["eto_mm"] = json!(25.0);

    let (status, body) = send(&app(), "POST", "/api/v1/decisions/run", Some(input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_settings_update_applies_to_next_run() {
    let app = app();

    let (status, body) = send(&app, "PUT", "/api/v1/config", Some(json!({ "rain_skip": 5.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rain_skip_mm"], 5.0);

    let (_, body) = send(&app, "GET", "/api/v1/config", None).await;
    assert_eq!(body["rain_skip_mm"], 5.0);

    let (_, body) = send(&app, "GET", "/api/v1/config/history", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["key"], "rain_skip");
}

#[tokio::test]
async fn test_inconsistent_settings_rejected() {
    let app = app();
    let (status, body) = send(&app, "PUT", "/api/v1/config", Some(json!({ "kc_min": 0.9, "kc_max": 0.6 }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");

    let (_, body) = send(&app, "GET", "/api/v1/config/history", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_plant_heights_skip_unmeasured() {
    let input = json!({
        "date": "2025-11-13",
        "plot": "T4",
        "heights_cm": [8.5, 0.0, 9.0, 0.0, 0.0, 7.5]
    });
    let (status, body) = send(&app(), "POST", "/api/v1/plant-heights", Some(input)).await;

    assert_eq!(status, StatusCode::CREATED);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["plant_id"], 6);
}

#[tokio::test]
async fn test_weekly_report() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/v1/reports/weekly?end=2025-11-14", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    for date in ["2025-11-10", "2025-11-11", "2025-11-12"] {
        send(&app, "POST", "/api/v1/decisions/run", Some(daily(date, 4.0))).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/reports/weekly?end=2025-11-14", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start"], "2025-11-07");
    assert_eq!(body["plots"].as_array().unwrap().len(), 4);
    assert_eq!(body["highest_ndvi_plot"], "T3");
}
