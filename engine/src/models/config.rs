//! Trial configuration models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Stage;

/// Parameters for one trial, read-only during a decision call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialConfig {
    /// Anchors days-after-transplant for stage banding
    pub transplant_date: NaiveDate,

    /// Fraction of gross applied water retained as net, in (0, 1]
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,

    /// Plot area used to convert depth (mm) to volume (L)
    #[serde(default = "default_area_m2")]
    pub area_m2: f64,

    /// Forecast rainfall (mm) at or above which irrigation is withheld
    #[serde(default = "default_rain_skip_mm")]
    pub rain_skip_mm: f64,

    #[serde(default)]
    pub stage: StageParams,

    #[serde(default)]
    pub soil: SoilParams,

    #[serde(default)]
    pub ndvi_to_kc: NdviToKc,

    /// Strict treatment requires every trigger to agree
    #[serde(default = "default_strict_and_mode")]
    pub strict_and_mode: bool,

    #[serde(default)]
    pub constants: PolicyConstants,
}

fn default_efficiency() -> f64 {
    0.85
}

fn default_area_m2() -> f64 {
    1.0
}

fn default_rain_skip_mm() -> f64 {
    2.0
}

fn default_strict_and_mode() -> bool {
    true
}

impl TrialConfig {
    /// Configuration with default agronomic parameters for the given transplant date
    pub fn new(transplant_date: NaiveDate) -> Self {
        Self {
            transplant_date,
            efficiency: default_efficiency(),
            area_m2: default_area_m2(),
            rain_skip_mm: default_rain_skip_mm(),
            stage: StageParams::default(),
            soil: SoilParams::default(),
            ndvi_to_kc: NdviToKc::default(),
            strict_and_mode: default_strict_and_mode(),
            constants: PolicyConstants::default(),
        }
    }
}

/// Crop coefficient, root depth and depletion fraction for one stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StageCoefficients {
    pub kc: f64,
    pub root_depth_m: f64,
    /// Fraction of TAW that can be depleted before stress (p)
    pub depletion_fraction: f64,
}

/// Per-stage crop parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageParams {
    pub ini: StageCoefficients,
    pub mid: StageCoefficients,
    pub late: StageCoefficients,
}

impl StageParams {
    pub fn for_stage(&self, stage: Stage) -> StageCoefficients {
        match stage {
            Stage::Ini => self.ini,
            Stage::Mid => self.mid,
            Stage::Late => self.late,
        }
    }
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            ini: StageCoefficients {
                kc: 0.60,
                root_depth_m: 0.20,
                depletion_fraction: 0.50,
            },
            mid: StageCoefficients {
                kc: 1.05,
                root_depth_m: 0.30,
                depletion_fraction: 0.45,
            },
            late: StageCoefficients {
                kc: 0.95,
                root_depth_m: 0.35,
                depletion_fraction: 0.55,
            },
        }
    }
}

/// Soil water retention parameters (volumetric, m³/m³)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoilParams {
    pub theta_fc: f64,
    pub theta_wp: f64,
    /// Position of the moisture trigger between wilting point and field capacity
    pub alpha: f64,
}

impl Default for SoilParams {
    fn default() -> Self {
        Self {
            theta_fc: 0.30,
            theta_wp: 0.12,
            alpha: 0.60,
        }
    }
}

/// Linear NDVI to crop coefficient relationship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NdviToKc {
    pub a: f64,
    pub b: f64,
    pub kc_min: f64,
    pub kc_max: f64,
    /// Canopy coefficient at or above which the canopy counts as active
    pub active_gate: f64,
}

impl Default for NdviToKc {
    fn default() -> Self {
        Self {
            a: 1.25,
            b: 0.20,
            kc_min: 0.30,
            kc_max: 1.10,
            active_gate: 0.80,
        }
    }
}

/// Policy constants that agronomic convention fixes but the trial may tune
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConstants {
    /// Share of observed rainfall that infiltrates the root zone
    pub rain_effectiveness: f64,
    pub raw_multiplier: RawMultipliers,
}

impl Default for PolicyConstants {
    fn default() -> Self {
        Self {
            rain_effectiveness: 0.8,
            raw_multiplier: RawMultipliers::default(),
        }
    }
}

/// Stage-dependent scaling of RAW for the stage-adjusted policies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawMultipliers {
    pub ini: f64,
    pub mid: f64,
    pub late: f64,
}

impl RawMultipliers {
    pub fn for_stage(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Ini => self.ini,
            Stage::Mid => self.mid,
            Stage::Late => self.late,
        }
    }
}

impl Default for RawMultipliers {
    fn default() -> Self {
        Self {
            ini: 0.8,
            mid: 1.0,
            late: 1.2,
        }
    }
}
