//! Root-zone water balance
//!
//! All depths are in millimetres, soil water contents volumetric (m³/m³).

use serde::{Deserialize, Serialize};

use crate::models::RawMultipliers;
use crate::types::Stage;

/// Total and readily available water (TAW, RAW) for a root depth
pub fn available_water(theta_fc: f64, theta_wp: f64, root_depth_m: f64, depletion_fraction: f64) -> (f64, f64) {
    let taw = (theta_fc - theta_wp) * root_depth_m * 1000.0;
    (taw, depletion_fraction * taw)
}

/// RAW scaled by the stage multiplier
pub fn stage_adjusted_raw(raw: f64, stage: Stage, multipliers: &RawMultipliers) -> f64 {
    raw * multipliers.for_stage(stage)
}

/// Volumetric moisture below which the soil is judged too dry
pub fn moisture_trigger(theta_fc: f64, theta_wp: f64, alpha: f64) -> f64 {
    theta_wp + alpha * (theta_fc - theta_wp)
}

/// Infiltrated share of observed rainfall, never negative
pub fn effective_rainfall(rain_observed_mm: f64, effectiveness: f64) -> f64 {
    (effectiveness * rain_observed_mm).max(0.0)
}

/// Deficit after one day of crop water use and rainfall
///
/// Excess water is not credited as a surplus: the deficit floors at zero.
pub fn updated_deficit(start_deficit_mm: f64, etc_mm: f64, effective_rain_mm: f64) -> f64 {
    (start_deficit_mm + etc_mm - effective_rain_mm).max(0.0)
}

/// Irrigation application for one plot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IrrigationDepth {
    pub net_mm: f64,
    pub gross_mm: f64,
    pub liters: f64,
}

impl IrrigationDepth {
    pub fn none() -> Self {
        Self {
            net_mm: 0.0,
            gross_mm: 0.0,
            liters: 0.0,
        }
    }

    /// Full refill of `deficit_mm` at the given application efficiency
    pub fn refill(deficit_mm: f64, efficiency: f64, area_m2: f64) -> Self {
        let gross_mm = deficit_mm / efficiency;
        Self {
            net_mm: deficit_mm,
            gross_mm,
            liters: gross_mm * area_m2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_available_water_initial_stage() {
        let (taw, raw) = available_water(0.30, 0.12, 0.20, 0.50);
        assert_relative_eq!(taw, 36.0, epsilon = 1e-9);
        assert_relative_eq!(raw, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stage_adjustment() {
        let multipliers = RawMultipliers::default();
        assert_relative_eq!(stage_adjusted_raw(18.0, Stage::Ini, &multipliers), 14.4, epsilon = 1e-9);
        assert_relative_eq!(stage_adjusted_raw(18.0, Stage::Mid, &multipliers), 18.0, epsilon = 1e-9);
        assert_relative_eq!(stage_adjusted_raw(18.0, Stage::Late, &multipliers), 21.6, epsilon = 1e-9);
    }

    #[test]
    fn test_moisture_trigger() {
        assert_relative_eq!(moisture_trigger(0.30, 0.12, 0.60), 0.228, epsilon = 1e-12);
    }

    #[test]
    fn test_effective_rainfall_floors_at_zero() {
        assert_relative_eq!(effective_rainfall(10.0, 0.8), 8.0, epsilon = 1e-12);
        assert_eq!(effective_rainfall(-3.0, 0.8), 0.0);
    }

    #[test]
    fn test_deficit_never_goes_negative() {
        assert_relative_eq!(updated_deficit(5.0, 2.0, 1.0), 6.0, epsilon = 1e-12);
        assert_eq!(updated_deficit(5.0, 2.0, 40.0), 0.0);
    }

    #[test]
    fn test_refill_converts_depth_to_volume() {
        let depth = IrrigationDepth::refill(20.0, 0.85, 2.0);
        assert_eq!(depth.net_mm, 20.0);
        assert_relative_eq!(depth.gross_mm, 23.529411764705884, epsilon = 1e-9);
        assert_relative_eq!(depth.liters, 47.05882352941177, epsilon = 1e-9);
    }
}
