//! Ledger row models for the smart irrigation service
//!
//! Re-exports models from the engine crate and adds the flat, fixed-column
//! rows written to the append-only ledgers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use irrigation_engine::models::*;
pub use irrigation_engine::{Decision, Policy, Treatment};

/// One plot's daily measurements as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRow {
    pub date: NaiveDate,
    pub plot: Treatment,
    pub theta_vwc: Option<f64>,
    pub rain_obs: f64,
    pub rain_fcst_24h: f64,
    pub ndvi: Option<f64>,
    pub eto: f64,
    pub notes: String,
}

/// One decision as stored in the decision log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRow {
    pub date: NaiveDate,
    pub plot: Treatment,
    pub treatment: Policy,
    pub decision: Decision,
    pub reason: String,
    #[serde(rename = "Dr")]
    pub deficit_start_mm: Option<f64>,
    /// Deficit carried into the next day
    #[serde(rename = "Dr_end")]
    pub deficit_end_mm: f64,
    #[serde(rename = "RAW")]
    pub raw_threshold_mm: Option<f64>,
    pub theta: Option<f64>,
    pub theta_trigger: Option<f64>,
    pub ndvi: Option<f64>,
    #[serde(rename = "Kc")]
    pub kc: Option<f64>,
    pub rain_fcst: f64,
    pub irr_mm: Option<f64>,
    #[serde(rename = "irr_L")]
    pub irr_liters: Option<f64>,
}

impl DecisionRow {
    pub fn from_record(record: &DecisionRecord, rain_forecast_24h_mm: f64) -> Self {
        let diagnostics = record.diagnostics.as_ref();
        let irrigated = record.is_irrigation();
        Self {
            date: record.date,
            plot: record.plot,
            treatment: record.policy,
            decision: record.decision,
            reason: record.reason.clone(),
            deficit_start_mm: diagnostics.map(|d| d.deficit_start_mm),
            deficit_end_mm: record.updated_deficit_mm,
            raw_threshold_mm: diagnostics.map(|d| d.raw_threshold_mm),
            theta: diagnostics.and_then(|d| d.soil_moisture),
            theta_trigger: diagnostics.and_then(|d| d.moisture_threshold),
            ndvi: diagnostics.and_then(|d| d.ndvi),
            kc: diagnostics.map(|d| d.kc),
            rain_fcst: rain_forecast_24h_mm,
            irr_mm: irrigated.then(|| record.irrigation().gross_mm),
            irr_liters: irrigated.then(|| record.irrigation().liters),
        }
    }
}

/// One entry of the append-only settings history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Weekly plant height observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantHeightRow {
    pub date: NaiveDate,
    pub plot: Treatment,
    pub plant_id: u8,
    pub height_cm: f64,
}
