//! WebAssembly module for the Smart Irrigation Trial
//!
//! Provides client-side computation for:
//! - Previewing a plot's decision before it is logged
//! - Crop stage lookup
//! - Soil moisture trigger and canopy coefficient checks
//! - Offline configuration validation

use irrigation_engine::{canopy, stage, water_balance};
use irrigation_engine::{validate_area, validate_efficiency, ConfigError};
use irrigation_engine::{DailyMeasurement, DecisionEngine, Stage, TrialConfig, Treatment};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("smart irrigation module loaded"));
}

fn decide_inner(plot: &str, config_json: &str, measurement_json: &str, carried_deficit_mm: f64) -> Result<String, String> {
    let plot: Treatment = plot.parse().map_err(|e| format!("{}", e))?;
    let config: TrialConfig =
        serde_json::from_str(config_json).map_err(|e| format!("Invalid config JSON: {}", e))?;
    let measurement: DailyMeasurement =
        serde_json::from_str(measurement_json).map_err(|e| format!("Invalid measurement JSON: {}", e))?;

    let engine = DecisionEngine::new(config).map_err(|e| e.to_string())?;
    let record = engine.decide(plot, &measurement, carried_deficit_mm);
    serde_json::to_string(&record).map_err(|e| format!("Serialization error: {}", e))
}

/// Decide one plot's day and return the decision record as JSON
#[wasm_bindgen]
pub fn decide_json(plot: &str, config_json: &str, measurement_json: &str, carried_deficit_mm: f64) -> Result<String, JsValue> {
    decide_inner(plot, config_json, measurement_json, carried_deficit_mm).map_err(|e| JsValue::from_str(&e))
}

/// Crop stage code for a number of days after transplant
#[wasm_bindgen]
pub fn stage_for_day(days_after_transplant: i32) -> String {
    Stage::from_days(days_after_transplant as i64).code().to_string()
}

/// Days between transplant and an observation date, both `YYYY-MM-DD`
#[wasm_bindgen]
pub fn days_after_transplant(date: &str, transplant_date: &str) -> Result<i32, JsValue> {
    let parse = |s: &str| s.parse().map_err(|_| JsValue::from_str(&format!("Invalid date: {}", s)));
    Ok(stage::days_after_transplant(parse(date)?, parse(transplant_date)?) as i32)
}

/// Volumetric moisture below which the soil counts as dry
#[wasm_bindgen]
pub fn soil_moisture_trigger(theta_fc: f64, theta_wp: f64, alpha: f64) -> f64 {
    water_balance::moisture_trigger(theta_fc, theta_wp, alpha)
}

/// Crop coefficient derived from NDVI using the default mapping
#[wasm_bindgen]
pub fn ndvi_crop_coefficient(ndvi: f64, fallback_kc: f64) -> f64 {
    canopy::crop_coefficient(Some(ndvi), fallback_kc, &Default::default())
}

fn refill_inner(deficit_mm: f64, efficiency: f64, area_m2: f64) -> Result<f64, ConfigError> {
    validate_efficiency(efficiency)?;
    validate_area(area_m2)?;
    Ok(water_balance::IrrigationDepth::refill(deficit_mm, efficiency, area_m2).liters)
}

/// Liters needed to refill a deficit on one plot
#[wasm_bindgen]
pub fn refill_liters(deficit_mm: f64, efficiency: f64, area_m2: f64) -> Result<f64, JsValue> {
    refill_inner(deficit_mm, efficiency, area_m2).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(Serialize)]
struct ConfigCheck {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn check_config(config_json: &str) -> ConfigCheck {
    let result = serde_json::from_str::<TrialConfig>(config_json)
        .map_err(|e| format!("Invalid config JSON: {}", e))
        .and_then(|config| irrigation_engine::validate_config(&config).map_err(|e| e.to_string()));
    ConfigCheck {
        valid: result.is_ok(),
        error: result.err(),
    }
}

/// Validate a trial configuration offline; returns `{valid, error?}` as JSON
#[wasm_bindgen]
pub fn validate_config_json(config_json: &str) -> String {
    serde_json::to_string(&check_config(config_json)).unwrap_or_else(|_| r#"{"valid":false}"#.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{"transplant_date":"2025-11-06"}"#;

    #[test]
    fn test_stage_for_day() {
        assert_eq!(stage_for_day(0), "ini");
        assert_eq!(stage_for_day(20), "ini");
        assert_eq!(stage_for_day(21), "mid");
        assert_eq!(stage_for_day(46), "late");
    }

    #[test]
    fn test_decide_preview() {
        let measurement = r#"{"date":"2025-11-16","eto_mm":3.0,"rain_observed_mm":0.0,"rain_forecast_24h_mm":0.0}"#;
        let json = decide_inner("T2", CONFIG, measurement, 20.0).unwrap();
        let record: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(record["decision"], "Irrigate");
        assert_eq!(record["reason"], "WB");
        assert_eq!(record["updated_deficit_mm"], 0.0);
    }

    #[test]
    fn test_decide_rejects_unknown_plot() {
        let measurement = r#"{"date":"2025-11-16","eto_mm":3.0,"rain_observed_mm":0.0,"rain_forecast_24h_mm":0.0}"#;
        assert!(decide_inner("T9", CONFIG, measurement, 0.0).is_err());
    }

    #[test]
    fn test_config_check() {
        assert!(check_config(CONFIG).valid);
        let bad = r#"{"transplant_date":"2025-11-06","efficiency":0.0}"#;
        assert!(!check_config(bad).valid);
    }

    #[test]
    fn test_refill_rejects_invalid_application() {
        assert!((refill_inner(17.0, 0.85, 2.0).unwrap() - 40.0).abs() < 1e-9);
        assert!(matches!(refill_inner(10.0, 0.0, 1.0), Err(ConfigError::NonPositiveEfficiency(_))));
        assert!(matches!(refill_inner(10.0, 0.85, -1.0), Err(ConfigError::NonPositiveArea(_))));
    }

    #[test]
    fn test_soil_moisture_trigger() {
        assert!((soil_moisture_trigger(0.30, 0.12, 0.60) - 0.228).abs() < 1e-9);
    }
}
