//! Per-treatment irrigation decision policies
//!
//! Every policy is a pure function of the configuration, one day's
//! measurements and the deficit carried from the previous day. The caller
//! persists the returned deficit.

use serde::{Deserialize, Serialize};

use crate::canopy;
use crate::models::{DailyMeasurement, DecisionRecord, Diagnostics, GateBreakdown, StageCoefficients, TrialConfig};
use crate::stage::{days_after_transplant, stage_values};
use crate::types::{Decision, Stage, Treatment};
use crate::validation::{validate_config, ConfigError};
use crate::water_balance::{self, IrrigationDepth};

/// Decision policies used by the trial
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Water balance OR soil moisture, stage-adjusted RAW
    SoilOrBalance,
    /// Water balance AND active canopy, unscaled RAW
    CanopyGated,
    /// Water balance AND soil AND canopy AND acceptable forecast
    StrictConjunction,
    /// Operator decides; nothing is evaluated
    Manual,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::SoilOrBalance => write!(f, "soil_or_balance"),
            Policy::CanopyGated => write!(f, "canopy_gated"),
            Policy::StrictConjunction => write!(f, "strict_conjunction"),
            Policy::Manual => write!(f, "manual"),
        }
    }
}

impl Policy {
    /// Evaluate one plot for one day
    ///
    /// `config` must satisfy [`validate_config`]; [`DecisionEngine`] enforces this.
    pub fn decide(
        &self,
        plot: Treatment,
        config: &TrialConfig,
        measurement: &DailyMeasurement,
        carried_deficit_mm: f64,
    ) -> DecisionRecord {
        let record = match self {
            Policy::Manual => manual(plot, measurement, carried_deficit_mm),
            Policy::SoilOrBalance | Policy::CanopyGated | Policy::StrictConjunction => {
                let day = DayContext::new(config, measurement);
                let verdict = match self {
                    Policy::SoilOrBalance => soil_or_balance(config, measurement, &day, carried_deficit_mm),
                    Policy::CanopyGated => canopy_gated(config, measurement, &day, carried_deficit_mm),
                    _ => strict_conjunction(config, measurement, &day, carried_deficit_mm),
                };
                settle(plot, *self, config, measurement, &day, verdict, carried_deficit_mm)
            }
        };

        tracing::debug!(
            plot = %record.plot,
            date = %record.date,
            policy = %record.policy,
            decision = %record.decision,
            deficit_mm = record.updated_deficit_mm,
            "Evaluated irrigation decision"
        );

        record
    }
}

/// Validated configuration plus the per-plot policy dispatch
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: TrialConfig,
}

impl DecisionEngine {
    /// Validate the configuration and build an engine around it
    pub fn new(config: TrialConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Decide for a plot using the policy its treatment is assigned
    pub fn decide(&self, plot: Treatment, measurement: &DailyMeasurement, carried_deficit_mm: f64) -> DecisionRecord {
        plot.policy().decide(plot, &self.config, measurement, carried_deficit_mm)
    }
}

// ============================================================================
// Shared evaluation
// ============================================================================

/// Stage-derived quantities common to every computed policy
struct DayContext {
    days_after_transplant: i64,
    stage: Stage,
    coefficients: StageCoefficients,
    taw_mm: f64,
    raw_mm: f64,
}

impl DayContext {
    fn new(config: &TrialConfig, measurement: &DailyMeasurement) -> Self {
        let days = days_after_transplant(measurement.date, config.transplant_date);
        let (stage, coefficients) = stage_values(days, &config.stage);
        let (taw_mm, raw_mm) = water_balance::available_water(
            config.soil.theta_fc,
            config.soil.theta_wp,
            coefficients.root_depth_m,
            coefficients.depletion_fraction,
        );
        Self {
            days_after_transplant: days,
            stage,
            coefficients,
            taw_mm,
            raw_mm,
        }
    }

    fn stage_adjusted_raw(&self, config: &TrialConfig) -> f64 {
        water_balance::stage_adjusted_raw(self.raw_mm, self.stage, &config.constants.raw_multiplier)
    }
}

/// Policy-specific outcome before depths and deficits are settled
struct Verdict {
    irrigate: bool,
    reason: String,
    kc: f64,
    raw_threshold_mm: f64,
    moisture_threshold: Option<f64>,
    ndvi: Option<f64>,
    soil_moisture: Option<f64>,
    gates: Option<GateBreakdown>,
}

fn moisture_threshold(config: &TrialConfig) -> f64 {
    water_balance::moisture_trigger(config.soil.theta_fc, config.soil.theta_wp, config.soil.alpha)
}

fn soil_is_dry(soil_moisture: Option<f64>, threshold: f64) -> bool {
    soil_moisture.is_some_and(|theta| theta < threshold)
}

fn forecast_suppresses(config: &TrialConfig, measurement: &DailyMeasurement) -> bool {
    measurement.rain_forecast_24h_mm >= config.rain_skip_mm
}

fn forecast_reason(config: &TrialConfig) -> String {
    format!("Forecast ≥ {:.1} mm", config.rain_skip_mm)
}

fn canopy_kc(config: &TrialConfig, measurement: &DailyMeasurement, day: &DayContext) -> f64 {
    canopy::crop_coefficient(measurement.ndvi, day.coefficients.kc, &config.ndvi_to_kc)
}

fn settle(
    plot: Treatment,
    policy: Policy,
    config: &TrialConfig,
    measurement: &DailyMeasurement,
    day: &DayContext,
    verdict: Verdict,
    carried_deficit_mm: f64,
) -> DecisionRecord {
    let etc_mm = measurement.eto_mm * verdict.kc;
    let effective_rain = water_balance::effective_rainfall(
        measurement.rain_observed_mm,
        config.constants.rain_effectiveness,
    );
    let balance_deficit = water_balance::updated_deficit(carried_deficit_mm, etc_mm, effective_rain);

    // Full refill assumption: an irrigation day resets the deficit
    let (decision, irrigation, deficit_end_mm) = if verdict.irrigate {
        (
            Decision::Irrigate,
            IrrigationDepth::refill(carried_deficit_mm, config.efficiency, config.area_m2),
            0.0,
        )
    } else {
        (Decision::Skip, IrrigationDepth::none(), balance_deficit)
    };

    DecisionRecord {
        plot,
        date: measurement.date,
        policy,
        decision,
        reason: verdict.reason,
        updated_deficit_mm: deficit_end_mm,
        diagnostics: Some(Diagnostics {
            days_after_transplant: day.days_after_transplant,
            stage: day.stage,
            eto_mm: measurement.eto_mm,
            rain_observed_mm: measurement.rain_observed_mm,
            rain_forecast_24h_mm: measurement.rain_forecast_24h_mm,
            kc: verdict.kc,
            etc_mm,
            root_depth_m: day.coefficients.root_depth_m,
            depletion_fraction: day.coefficients.depletion_fraction,
            taw_mm: day.taw_mm,
            raw_mm: day.raw_mm,
            raw_threshold_mm: verdict.raw_threshold_mm,
            deficit_start_mm: carried_deficit_mm,
            deficit_end_mm,
            moisture_threshold: verdict.moisture_threshold,
            soil_moisture: verdict.soil_moisture,
            ndvi: verdict.ndvi,
            irrigation,
            gates: verdict.gates,
        }),
    }
}

// ============================================================================
// Policies
// ============================================================================

fn manual(plot: Treatment, measurement: &DailyMeasurement, carried_deficit_mm: f64) -> DecisionRecord {
    DecisionRecord {
        plot,
        date: measurement.date,
        policy: Policy::Manual,
        decision: Decision::Manual,
        reason: "Farmer".to_string(),
        updated_deficit_mm: carried_deficit_mm,
        diagnostics: None,
    }
}

fn soil_or_balance(
    config: &TrialConfig,
    measurement: &DailyMeasurement,
    day: &DayContext,
    carried_deficit_mm: f64,
) -> Verdict {
    let raw_threshold_mm = day.stage_adjusted_raw(config);
    let threshold = moisture_threshold(config);

    let water_balance = carried_deficit_mm > raw_threshold_mm;
    let soil = soil_is_dry(measurement.soil_moisture, threshold);
    let suppressed = forecast_suppresses(config, measurement);
    let irrigate = (water_balance || soil) && !suppressed;

    let fired: Vec<&str> = [(water_balance, "WB"), (soil, "Soil")]
        .into_iter()
        .filter_map(|(hit, label)| hit.then_some(label))
        .collect();
    let reason = if irrigate {
        fired.join(" & ")
    } else if !fired.is_empty() {
        // Suppressed triggers stay on record
        format!("{} ({})", fired.join(" & "), forecast_reason(config))
    } else {
        "No trigger".to_string()
    };

    Verdict {
        irrigate,
        reason,
        kc: day.coefficients.kc,
        raw_threshold_mm,
        moisture_threshold: Some(threshold),
        ndvi: None,
        soil_moisture: measurement.soil_moisture,
        gates: None,
    }
}

fn canopy_gated(
    config: &TrialConfig,
    measurement: &DailyMeasurement,
    day: &DayContext,
    carried_deficit_mm: f64,
) -> Verdict {
    let kc = canopy_kc(config, measurement, day);

    // Compared against the unscaled RAW, unlike the stage-adjusted policies
    let water_balance = carried_deficit_mm > day.raw_mm;
    let active = canopy::is_active(kc, &config.ndvi_to_kc);
    let suppressed = forecast_suppresses(config, measurement);
    let irrigate = water_balance && active && !suppressed;

    let reason = if irrigate {
        "WB & ActiveNDVI".to_string()
    } else if suppressed {
        forecast_reason(config)
    } else {
        "WB ≤ RAW / NDVI gate".to_string()
    };

    Verdict {
        irrigate,
        reason,
        kc,
        raw_threshold_mm: day.raw_mm,
        moisture_threshold: None,
        ndvi: measurement.ndvi,
        soil_moisture: None,
        gates: None,
    }
}

fn strict_conjunction(
    config: &TrialConfig,
    measurement: &DailyMeasurement,
    day: &DayContext,
    carried_deficit_mm: f64,
) -> Verdict {
    let kc = canopy_kc(config, measurement, day);
    let raw_threshold_mm = day.stage_adjusted_raw(config);
    let threshold = moisture_threshold(config);

    let gates = GateBreakdown {
        water_balance: carried_deficit_mm > raw_threshold_mm,
        soil_moisture: soil_is_dry(measurement.soil_moisture, threshold),
        canopy_active: canopy::is_active(kc, &config.ndvi_to_kc),
        forecast_acceptable: !forecast_suppresses(config, measurement),
    };

    Verdict {
        irrigate: gates.all_open(),
        reason: format!(
            "AND: WB={}, Soil={}, NDVI={}, Fcst={}",
            gates.water_balance, gates.soil_moisture, gates.canopy_active, gates.forecast_acceptable
        ),
        kc,
        raw_threshold_mm,
        moisture_threshold: Some(threshold),
        ndvi: measurement.ndvi,
        soil_moisture: measurement.soil_moisture,
        gates: Some(gates),
    }
}
