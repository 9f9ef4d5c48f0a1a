//! Decision record models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::policy::Policy;
use crate::types::{Decision, Stage, Treatment};
use crate::water_balance::IrrigationDepth;

/// Audit record for one plot and one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    pub plot: Treatment,
    pub date: NaiveDate,
    pub policy: Policy,
    pub decision: Decision,
    pub reason: String,
    /// Deficit the caller carries into the next day
    pub updated_deficit_mm: f64,
    /// Absent for manually decided plots
    pub diagnostics: Option<Diagnostics>,
}

impl DecisionRecord {
    pub fn is_irrigation(&self) -> bool {
        self.decision == Decision::Irrigate
    }

    pub fn irrigation(&self) -> IrrigationDepth {
        self.diagnostics
            .as_ref()
            .map(|d| d.irrigation)
            .unwrap_or_else(IrrigationDepth::none)
    }
}

/// Intermediate quantities behind a computed decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnostics {
    pub days_after_transplant: i64,
    pub stage: Stage,
    pub eto_mm: f64,
    pub rain_observed_mm: f64,
    pub rain_forecast_24h_mm: f64,
    /// Crop coefficient actually applied to ETo
    pub kc: f64,
    pub etc_mm: f64,
    pub root_depth_m: f64,
    pub depletion_fraction: f64,
    pub taw_mm: f64,
    pub raw_mm: f64,
    /// RAW after any stage adjustment; the water-balance trigger compares against this
    pub raw_threshold_mm: f64,
    pub deficit_start_mm: f64,
    pub deficit_end_mm: f64,
    pub moisture_threshold: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub ndvi: Option<f64>,
    pub irrigation: IrrigationDepth,
    pub gates: Option<GateBreakdown>,
}

/// Per-trigger outcome of the strict conjunction policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateBreakdown {
    pub water_balance: bool,
    pub soil_moisture: bool,
    pub canopy_active: bool,
    pub forecast_acceptable: bool,
}

impl GateBreakdown {
    pub fn all_open(&self) -> bool {
        self.water_balance && self.soil_moisture && self.canopy_active && self.forecast_acceptable
    }
}
