//! Validation utilities for trial configuration
//!
//! Configuration is checked once, before any decision is computed, so the
//! policies never divide by a zero efficiency or work from an inverted soil
//! retention curve.

use thiserror::Error;

use crate::models::{NdviToKc, PolicyConstants, SoilParams, StageCoefficients, StageParams, TrialConfig};
use crate::types::Stage;

/// Configuration validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Application efficiency must be greater than 0 (got {0})")]
    NonPositiveEfficiency(f64),

    #[error("Application efficiency must not exceed 1 (got {0})")]
    EfficiencyAboveOne(f64),

    #[error("Plot area must be greater than 0 m² (got {0})")]
    NonPositiveArea(f64),

    #[error("Rain skip threshold must not be negative (got {0} mm)")]
    NegativeRainSkip(f64),

    #[error("Wilting point ({theta_wp}) must be below field capacity ({theta_fc})")]
    WiltingPointNotBelowFieldCapacity { theta_fc: f64, theta_wp: f64 },

    #[error("Trigger fraction alpha must be within [0, 1] (got {0})")]
    InvalidTriggerFraction(f64),

    #[error("Depletion fraction for stage {stage} must be within [0, 1] (got {value})")]
    InvalidDepletionFraction { stage: Stage, value: f64 },

    #[error("Root depth for stage {stage} must be greater than 0 m (got {value})")]
    NonPositiveRootDepth { stage: Stage, value: f64 },

    #[error("Crop coefficient for stage {stage} must not be negative (got {value})")]
    NegativeCropCoefficient { stage: Stage, value: f64 },

    #[error("Canopy clamp is inverted: kc_min {kc_min} > kc_max {kc_max}")]
    InvalidCanopyClamp { kc_min: f64, kc_max: f64 },

    #[error("Rain effectiveness must be within [0, 1] (got {0})")]
    InvalidRainEffectiveness(f64),

    #[error("RAW multiplier for stage {stage} must be greater than 0 (got {value})")]
    NonPositiveRawMultiplier { stage: Stage, value: f64 },

    #[error("Only strict AND mode is supported for the conjunction policy")]
    UnsupportedStrictMode,
}

// ============================================================================
// Trial Settings
// ============================================================================

/// Validate the whole configuration bundle
pub fn validate_config(config: &TrialConfig) -> Result<(), ConfigError> {
    validate_efficiency(config.efficiency)?;
    validate_area(config.area_m2)?;
    if !(config.rain_skip_mm >= 0.0) {
        return Err(ConfigError::NegativeRainSkip(config.rain_skip_mm));
    }
    validate_soil(&config.soil)?;
    validate_stage_params(&config.stage)?;
    validate_canopy(&config.ndvi_to_kc)?;
    validate_constants(&config.constants)?;
    if !config.strict_and_mode {
        return Err(ConfigError::UnsupportedStrictMode);
    }
    Ok(())
}

/// Efficiency is a divisor for gross depth, so it must be strictly positive
pub fn validate_efficiency(efficiency: f64) -> Result<(), ConfigError> {
    if !(efficiency > 0.0) {
        return Err(ConfigError::NonPositiveEfficiency(efficiency));
    }
    if efficiency > 1.0 {
        return Err(ConfigError::EfficiencyAboveOne(efficiency));
    }
    Ok(())
}

pub fn validate_area(area_m2: f64) -> Result<(), ConfigError> {
    if !(area_m2 > 0.0) {
        return Err(ConfigError::NonPositiveArea(area_m2));
    }
    Ok(())
}

// ============================================================================
// Soil and Crop Parameters
// ============================================================================

pub fn validate_soil(soil: &SoilParams) -> Result<(), ConfigError> {
    if !(soil.theta_wp < soil.theta_fc) {
        return Err(ConfigError::WiltingPointNotBelowFieldCapacity {
            theta_fc: soil.theta_fc,
            theta_wp: soil.theta_wp,
        });
    }
    if !(0.0..=1.0).contains(&soil.alpha) {
        return Err(ConfigError::InvalidTriggerFraction(soil.alpha));
    }
    Ok(())
}

pub fn validate_stage_params(params: &StageParams) -> Result<(), ConfigError> {
    for stage in [Stage::Ini, Stage::Mid, Stage::Late] {
        validate_stage_coefficients(stage, &params.for_stage(stage))?;
    }
    Ok(())
}

fn validate_stage_coefficients(stage: Stage, values: &StageCoefficients) -> Result<(), ConfigError> {
    if !(values.kc >= 0.0) {
        return Err(ConfigError::NegativeCropCoefficient { stage, value: values.kc });
    }
    if !(values.root_depth_m > 0.0) {
        return Err(ConfigError::NonPositiveRootDepth {
            stage,
            value: values.root_depth_m,
        });
    }
    if !(0.0..=1.0).contains(&values.depletion_fraction) {
        return Err(ConfigError::InvalidDepletionFraction {
            stage,
            value: values.depletion_fraction,
        });
    }
    Ok(())
}

pub fn validate_canopy(params: &NdviToKc) -> Result<(), ConfigError> {
    if !(params.kc_min <= params.kc_max) {
        return Err(ConfigError::InvalidCanopyClamp {
            kc_min: params.kc_min,
            kc_max: params.kc_max,
        });
    }
    Ok(())
}

pub fn validate_constants(constants: &PolicyConstants) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&constants.rain_effectiveness) {
        return Err(ConfigError::InvalidRainEffectiveness(constants.rain_effectiveness));
    }
    for stage in [Stage::Ini, Stage::Mid, Stage::Late] {
        let value = constants.raw_multiplier.for_stage(stage);
        if !(value > 0.0) {
            return Err(ConfigError::NonPositiveRawMultiplier { stage, value });
        }
    }
    Ok(())
}
