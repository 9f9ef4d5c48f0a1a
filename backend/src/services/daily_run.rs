//! Daily run: decide all four plots for one date and log the outcome

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use irrigation_engine::DecisionEngine;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{DailyMeasurement, DecisionRecord, DecisionRow, MeasurementRow, Treatment};
use crate::storage::{Ledgers, StorageError};

/// Per-plot sensor readings for one day
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlotReading {
    pub plot: Treatment,
    #[validate(range(min = 0.0, max = 0.6))]
    pub soil_moisture: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ndvi: Option<f64>,
}

/// Weather for the day plus readings for each plot
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DailyInput {
    pub date: NaiveDate,
    #[validate(range(min = 0.0, max = 10.0))]
    pub eto_mm: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_observed_mm: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_forecast_24h_mm: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    #[validate]
    pub plots: Vec<PlotReading>,
}

impl DailyInput {
    /// Validate ranges and reject repeated plots
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for reading in &self.plots {
            if !seen.insert(reading.plot) {
                return Err(AppError::Validation {
                    field: "plots".to_string(),
                    message: format!("Plot {} listed more than once", reading.plot),
                });
            }
        }
        Ok(())
    }

    fn reading(&self, plot: Treatment) -> Option<&PlotReading> {
        self.plots.iter().find(|r| r.plot == plot)
    }

    /// The day's measurement as seen by one plot
    pub fn measurement_for(&self, plot: Treatment) -> DailyMeasurement {
        let mut measurement = DailyMeasurement::new(
            self.date,
            self.eto_mm,
            self.rain_observed_mm,
            self.rain_forecast_24h_mm,
        );
        if let Some(reading) = self.reading(plot) {
            measurement.soil_moisture = reading.soil_moisture;
            measurement.ndvi = reading.ndvi;
        }
        measurement
    }

    /// One measurement row per plot, T1 to T4
    pub fn measurement_rows(&self) -> Vec<MeasurementRow> {
        Treatment::ALL
            .iter()
            .map(|&plot| {
                let m = self.measurement_for(plot);
                MeasurementRow {
                    date: self.date,
                    plot,
                    theta_vwc: m.soil_moisture,
                    rain_obs: m.rain_observed_mm,
                    rain_fcst_24h: m.rain_forecast_24h_mm,
                    ndvi: m.ndvi,
                    eto: m.eto_mm,
                    notes: self.note.clone(),
                }
            })
            .collect()
    }
}

/// Deficit carried into `before` for each plot
///
/// Takes the deficit left by the latest logged decision dated strictly
/// before `before`; among rows of the same date the last appended wins.
/// Plots with no history start at 0.
pub fn latest_deficits(rows: &[DecisionRow], before: NaiveDate) -> BTreeMap<Treatment, f64> {
    let mut latest: BTreeMap<Treatment, (NaiveDate, f64)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.date < before) {
        let newer = latest.get(&row.plot).map_or(true, |(date, _)| row.date >= *date);
        if newer {
            latest.insert(row.plot, (row.date, row.deficit_end_mm));
        }
    }

    Treatment::ALL
        .iter()
        .map(|&plot| (plot, latest.get(&plot).map(|(_, d)| *d).unwrap_or(0.0)))
        .collect()
}

/// Daily run service
#[derive(Clone)]
pub struct DailyRunService {
    ledgers: Arc<Ledgers>,
}

impl DailyRunService {
    /// Create a new DailyRunService
    pub fn new(ledgers: Arc<Ledgers>) -> Self {
        Self { ledgers }
    }

    /// Store the day's readings without deciding
    pub fn record_measurements(&self, input: &DailyInput) -> AppResult<Vec<MeasurementRow>> {
        input.check()?;
        let rows = input.measurement_rows();
        self.ledgers.measurements.append(&rows)?;
        Ok(rows)
    }

    /// Deficits carried into `date`, rebuilt from the decision log
    pub fn carried_deficits(&self, date: NaiveDate) -> AppResult<BTreeMap<Treatment, f64>> {
        let rows = self.ledgers.decisions.read_all()?;
        Ok(latest_deficits(&rows, date))
    }

    /// Decide every plot for the input's date
    ///
    /// Measurement rows and decision rows are appended for all four plots.
    /// Runs are serialized so each one sees the deficits the previous one logged.
    pub fn run(&self, engine: &DecisionEngine, input: &DailyInput) -> AppResult<Vec<DecisionRecord>> {
        input.check()?;
        let _guard = self.ledgers.run_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let carried = self.carried_deficits(input.date)?;

        let records: Vec<DecisionRecord> = Treatment::ALL
            .iter()
            .map(|&plot| {
                let deficit = carried.get(&plot).copied().unwrap_or(0.0);
                engine.decide(plot, &input.measurement_for(plot), deficit)
            })
            .collect();

        let decision_rows: Vec<DecisionRow> = records
            .iter()
            .map(|r| DecisionRow::from_record(r, input.rain_forecast_24h_mm))
            .collect();

        self.ledgers.measurements.append(&input.measurement_rows())?;
        self.ledgers.decisions.append(&decision_rows)?;

        let irrigated = records.iter().filter(|r| r.is_irrigation()).count();
        tracing::info!(date = %input.date, irrigated, "Daily decisions logged");

        Ok(records)
    }

    /// Logged decisions, optionally limited to one plot
    pub fn decisions(&self, plot: Option<Treatment>) -> AppResult<Vec<DecisionRow>> {
        let rows = self.ledgers.decisions.read_all()?;
        Ok(match plot {
            Some(p) => rows.into_iter().filter(|r| r.plot == p).collect(),
            None => rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, TrialConfig};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn row(date: NaiveDate, plot: Treatment, deficit_end_mm: f64) -> DecisionRow {
        DecisionRow {
            date,
            plot,
            treatment: plot.policy(),
            decision: Decision::Skip,
            reason: "No trigger".to_string(),
            deficit_start_mm: Some(0.0),
            deficit_end_mm,
            raw_threshold_mm: Some(8.0),
            theta: None,
            theta_trigger: None,
            ndvi: None,
            kc: Some(0.6),
            rain_fcst: 0.0,
            irr_mm: None,
            irr_liters: None,
        }
    }

    #[test]
    fn test_latest_deficits_default_to_zero() {
        let deficits = latest_deficits(&[], day(10));
        assert_eq!(deficits.len(), 4);
        assert!(deficits.values().all(|d| *d == 0.0));
    }

    #[test]
    fn test_latest_deficits_ignore_run_date_and_later() {
        let rows = vec![
            row(day(8), Treatment::T2, 3.0),
            row(day(9), Treatment::T2, 5.0),
            row(day(10), Treatment::T2, 9.0),
        ];
        let deficits = latest_deficits(&rows, day(10));
        assert_eq!(deficits[&Treatment::T2], 5.0);
    }

    #[test]
    fn test_latest_deficits_last_append_wins_on_same_date() {
        let rows = vec![
            row(day(9), Treatment::T3, 4.0),
            row(day(9), Treatment::T3, 1.5),
            row(day(7), Treatment::T3, 7.0),
        ];
        let deficits = latest_deficits(&rows, day(10));
        assert_eq!(deficits[&Treatment::T3], 1.5);
    }

    #[test]
    fn test_duplicate_plot_rejected() {
        let reading = PlotReading {
            plot: Treatment::T2,
            soil_moisture: Some(0.2),
            ndvi: None,
        };
        let input = DailyInput {
            date: day(10),
            eto_mm: 3.0,
            rain_observed_mm: 0.0,
            rain_forecast_24h_mm: 0.0,
            note: String::new(),
            plots: vec![reading.clone(), reading],
        };
        assert!(matches!(input.check(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_run_waits_for_run_in_progress() {
        use std::sync::mpsc;
        use std::time::Duration as StdDuration;

        let ledgers = Arc::new(Ledgers::in_memory());
        let guard = ledgers.run_lock.lock().unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let ledgers = ledgers.clone();
            std::thread::spawn(move || {
                let engine = DecisionEngine::new(TrialConfig::new(day(6))).unwrap();
                let input = DailyInput {
                    date: day(7),
                    eto_mm: 3.0,
                    rain_observed_mm: 0.0,
                    rain_forecast_24h_mm: 0.0,
                    note: String::new(),
                    plots: vec![],
                };
                let result = DailyRunService::new(ledgers).run(&engine, &input);
                tx.send(result.is_ok()).unwrap();
            })
        };

        assert!(rx.recv_timeout(StdDuration::from_millis(200)).is_err());
        assert!(ledgers.decisions.read_all().unwrap().is_empty());

        drop(guard);
        assert!(rx.recv_timeout(StdDuration::from_secs(5)).unwrap());
        worker.join().unwrap();
        assert_eq!(ledgers.decisions.read_all().unwrap().len(), 4);
    }
}
