//! Trial settings service backed by the append-only settings history
//!
//! Each change is appended as `key,value,timestamp`; the current
//! configuration is the baseline with every entry replayed in order.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use irrigation_engine::{DecisionEngine, TrialConfig};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::SettingRow;
use crate::storage::Ledgers;

/// Settings service for the trial configuration
#[derive(Clone)]
pub struct SettingsService {
    ledgers: Arc<Ledgers>,
    baseline: TrialConfig,
}

/// Input for changing trial settings; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SettingsUpdate {
    #[validate(range(min = 0.1, max = 0.6))]
    pub theta_fc: Option<f64>,
    #[validate(range(min = 0.02, max = 0.4))]
    pub theta_wp: Option<f64>,
    #[validate(range(min = 0.2, max = 0.8))]
    pub alpha: Option<f64>,
    #[validate(range(min = 0.0, max = 3.0))]
    pub a: Option<f64>,
    #[validate(range(min = -0.5, max = 1.0))]
    pub b: Option<f64>,
    #[validate(range(min = 0.1, max = 1.0))]
    pub kc_min: Option<f64>,
    #[validate(range(min = 0.5, max = 1.5))]
    pub kc_max: Option<f64>,
    #[validate(range(min = 0.5, max = 1.2))]
    pub active_gate: Option<f64>,
    /// Application efficiency
    #[validate(range(min = 0.5, max = 0.98))]
    pub eta: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub rain_skip: Option<f64>,
    #[validate(range(min = 0.01, max = 10000.0))]
    pub area_m2: Option<f64>,
    pub transplant_date: Option<NaiveDate>,
}

impl SettingsUpdate {
    /// Changed settings as history entries
    fn entries(&self) -> Vec<(&'static str, String)> {
        let numeric = [
            ("theta_fc", self.theta_fc),
            ("theta_wp", self.theta_wp),
            ("alpha", self.alpha),
            ("a", self.a),
            ("b", self.b),
            ("kc_min", self.kc_min),
            ("kc_max", self.kc_max),
            ("active_gate", self.active_gate),
            ("eta", self.eta),
            ("rain_skip", self.rain_skip),
            ("area_m2", self.area_m2),
        ];

        let mut entries: Vec<(&'static str, String)> = numeric
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
            .collect();
        if let Some(date) = self.transplant_date {
            entries.push(("transplant_date", date.to_string()));
        }
        entries
    }
}

/// Apply one history entry to a configuration
pub fn apply_setting(config: &mut TrialConfig, key: &str, value: &str) -> AppResult<()> {
    if key == "transplant_date" {
        config.transplant_date = value.parse().map_err(|_| AppError::Validation {
            field: key.to_string(),
            message: format!("Invalid date '{}'", value),
        })?;
        return Ok(());
    }

    let number: f64 = value.trim().parse().map_err(|_| AppError::Validation {
        field: key.to_string(),
        message: format!("Invalid number '{}'", value),
    })?;

    match key {
        "theta_fc" => config.soil.theta_fc = number,
        "theta_wp" => config.soil.theta_wp = number,
        "alpha" => config.soil.alpha = number,
        "a" => config.ndvi_to_kc.a = number,
        "b" => config.ndvi_to_kc.b = number,
        "kc_min" => config.ndvi_to_kc.kc_min = number,
        "kc_max" => config.ndvi_to_kc.kc_max = number,
        "active_gate" => config.ndvi_to_kc.active_gate = number,
        "eta" => config.efficiency = number,
        "rain_skip" => config.rain_skip_mm = number,
        "area_m2" => config.area_m2 = number,
        other => tracing::warn!(key = other, "Ignoring unknown setting"),
    }
    Ok(())
}

impl SettingsService {
    /// Create a new SettingsService over the baseline configuration
    pub fn new(ledgers: Arc<Ledgers>, baseline: TrialConfig) -> Self {
        Self { ledgers, baseline }
    }

    /// Current configuration: baseline plus the replayed history
    pub fn current(&self) -> AppResult<TrialConfig> {
        let mut config = self.baseline.clone();
        for row in self.ledgers.settings.read_all()? {
            apply_setting(&mut config, &row.key, &row.value)?;
        }
        Ok(config)
    }

    /// Engine over a frozen snapshot of the current configuration
    pub fn engine(&self) -> AppResult<DecisionEngine> {
        Ok(DecisionEngine::new(self.current()?)?)
    }

    /// Append changed settings to the history
    ///
    /// The resulting configuration is validated first; nothing is appended
    /// when it would be invalid.
    pub fn update(&self, update: &SettingsUpdate) -> AppResult<TrialConfig> {
        update.validate()?;

        let entries = update.entries();
        let mut candidate = self.current()?;
        for (key, value) in &entries {
            apply_setting(&mut candidate, key, value)?;
        }
        DecisionEngine::new(candidate.clone())?;

        let now = Utc::now();
        let rows: Vec<SettingRow> = entries
            .into_iter()
            .map(|(key, value)| SettingRow {
                key: key.to_string(),
                value,
                timestamp: now,
            })
            .collect();
        self.ledgers.settings.append(&rows)?;

        tracing::info!(changed = rows.len(), "Trial settings updated");
        Ok(candidate)
    }

    /// Full settings history, oldest first
    pub fn history(&self) -> AppResult<Vec<SettingRow>> {
        Ok(self.ledgers.settings.read_all()?)
    }
}
