//! Reporting service for weekly trial summaries and data export
//! Compares water use, canopy vigor and growth across the four plots

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{DecisionRow, MeasurementRow, PlantHeightRow, Policy, Treatment};
use crate::storage::Ledgers;

/// Days before the end date covered by a weekly report
pub const REPORT_WINDOW_DAYS: i64 = 7;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    ledgers: Arc<Ledgers>,
}

/// One plot's totals over the report window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlotWeeklySummary {
    pub plot: Treatment,
    pub irrigation_events: usize,
    pub total_irrigation_liters: f64,
    pub mean_ndvi: Option<f64>,
    pub mean_height_cm: Option<f64>,
    /// Mean plant height per liter applied; absent when no water was applied
    pub wue_cm_per_liter: Option<f64>,
}

/// Weekly comparison of the four plots
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub plots: Vec<PlotWeeklySummary>,
    /// Computed plot with the lowest irrigation total
    pub least_water_plot: Option<Treatment>,
    pub highest_ndvi_plot: Option<Treatment>,
    /// Water the canopy-gated plot saved relative to the soil-or-balance plot
    pub canopy_saving_percent: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Last appended row per key; earlier rows with the same key were superseded by a re-run
fn last_per_key<T, K: Ord>(rows: &[T], key: impl Fn(&T) -> K) -> Vec<&T> {
    let mut latest = BTreeMap::new();
    for row in rows {
        latest.insert(key(row), row);
    }
    latest.into_values().collect()
}

/// Summarize ledger rows over the inclusive window `[start, end]`
///
/// Each plot and date counts once, using its last appended decision and
/// measurement; heights count once per plant and date.
pub fn summarize(
    start: NaiveDate,
    end: NaiveDate,
    decisions: &[DecisionRow],
    measurements: &[MeasurementRow],
    heights: &[PlantHeightRow],
) -> WeeklyReport {
    let in_window = |date: NaiveDate| date >= start && date <= end;
    let decisions = last_per_key(decisions, |r| (r.plot, r.date));
    let measurements = last_per_key(measurements, |m| (m.plot, m.date));
    let heights = last_per_key(heights, |h| (h.plot, h.date, h.plant_id));

    let plots: Vec<PlotWeeklySummary> = Treatment::ALL
        .iter()
        .map(|&plot| {
            let irrigations: Vec<f64> = decisions
                .iter()
                .filter(|r| r.plot == plot && in_window(r.date))
                .filter_map(|r| r.irr_liters)
                .collect();
            let total_irrigation_liters: f64 = irrigations.iter().sum();

            let mean_ndvi = mean(
                measurements
                    .iter()
                    .filter(|m| m.plot == plot && in_window(m.date))
                    .filter_map(|m| m.ndvi),
            );
            let mean_height_cm = mean(
                heights
                    .iter()
                    .filter(|h| h.plot == plot && in_window(h.date))
                    .map(|h| h.height_cm),
            );
            let wue_cm_per_liter = match mean_height_cm {
                Some(height) if total_irrigation_liters > 0.0 => Some(height / total_irrigation_liters),
                _ => None,
            };

            PlotWeeklySummary {
                plot,
                irrigation_events: irrigations.len(),
                total_irrigation_liters,
                mean_ndvi,
                mean_height_cm,
                wue_cm_per_liter,
            }
        })
        .collect();

    let least_water_plot = plots
        .iter()
        .filter(|s| s.plot.policy() != Policy::Manual)
        .min_by(|a, b| a.total_irrigation_liters.total_cmp(&b.total_irrigation_liters))
        .map(|s| s.plot);

    let highest_ndvi_plot = plots
        .iter()
        .filter_map(|s| s.mean_ndvi.map(|n| (s.plot, n)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(plot, _)| plot);

    let liters = |plot: Treatment| {
        plots
            .iter()
            .find(|s| s.plot == plot)
            .map(|s| s.total_irrigation_liters)
            .unwrap_or(0.0)
    };
    let (soil_or_balance, canopy_gated) = (liters(Treatment::T2), liters(Treatment::T3));
    let canopy_saving_percent =
        (soil_or_balance > 0.0).then(|| (1.0 - canopy_gated / soil_or_balance) * 100.0);

    WeeklyReport {
        start,
        end,
        plots,
        least_water_plot,
        highest_ndvi_plot,
        canopy_saving_percent,
    }
}

impl ReportingService {
    /// Create a new ReportingService
    pub fn new(ledgers: Arc<Ledgers>) -> Self {
        Self { ledgers }
    }

    /// Weekly report for the window ending at `end`
    pub fn weekly(&self, end: NaiveDate) -> AppResult<WeeklyReport> {
        let start = end - Duration::days(REPORT_WINDOW_DAYS);

        let decisions = self.ledgers.decisions.read_all()?;
        if !decisions.iter().any(|r| r.date >= start && r.date <= end) {
            return Err(AppError::NotFound(format!("Decisions between {} and {}", start, end)));
        }
        let measurements = self.ledgers.measurements.read_all()?;
        let heights = self.ledgers.plant_heights.read_all()?;

        let report = summarize(start, end, &decisions, &measurements, &heights);
        tracing::debug!(%start, %end, "Weekly report built");
        Ok(report)
    }

    /// Export rows to CSV text
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Decision;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    fn irrigated(date: NaiveDate, plot: Treatment, liters: f64) -> DecisionRow {
        DecisionRow {
            date,
            plot,
            treatment: plot.policy(),
            decision: Decision::Irrigate,
            reason: "WB".to_string(),
            deficit_start_mm: Some(liters),
            deficit_end_mm: 0.0,
            raw_threshold_mm: Some(10.0),
            theta: None,
            theta_trigger: None,
            ndvi: None,
            kc: Some(1.05),
            rain_fcst: 0.0,
            irr_mm: Some(liters),
            irr_liters: Some(liters),
        }
    }

    fn ndvi(date: NaiveDate, plot: Treatment, value: f64) -> MeasurementRow {
        MeasurementRow {
            date,
            plot,
            theta_vwc: None,
            rain_obs: 0.0,
            rain_fcst_24h: 0.0,
            ndvi: Some(value),
            eto: 3.0,
            notes: String::new(),
        }
    }

    #[test]
    fn test_summarize_totals_and_rankings() {
        let decisions = vec![
            irrigated(day(10), Treatment::T2, 12.0),
            irrigated(day(12), Treatment::T2, 8.0),
            irrigated(day(12), Treatment::T3, 15.0),
            irrigated(day(11), Treatment::T4, 18.0),
            // Outside the window
            irrigated(day(1), Treatment::T3, 50.0),
        ];
        let measurements = vec![
            ndvi(day(10), Treatment::T2, 0.5),
            ndvi(day(11), Treatment::T2, 0.7),
            ndvi(day(10), Treatment::T3, 0.65),
        ];
        let heights = vec![
            PlantHeightRow { date: day(12), plot: Treatment::T2, plant_id: 1, height_cm: 10.0 },
            PlantHeightRow { date: day(12), plot: Treatment::T2, plant_id: 2, height_cm: 14.0 },
        ];

        let report = summarize(day(7), day(14), &decisions, &measurements, &heights);

        let t2 = &report.plots[1];
        assert_eq!(t2.irrigation_events, 2);
        assert_relative_eq!(t2.total_irrigation_liters, 20.0);
        assert_relative_eq!(t2.mean_ndvi.unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(t2.wue_cm_per_liter.unwrap(), 12.0 / 20.0);

        assert_eq!(report.plots[2].total_irrigation_liters, 15.0);
        assert_eq!(report.least_water_plot, Some(Treatment::T3));
        assert_eq!(report.highest_ndvi_plot, Some(Treatment::T3));
        assert_relative_eq!(report.canopy_saving_percent.unwrap(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rerun_day_counts_once() {
        let mut rerun = irrigated(day(10), Treatment::T2, 14.0);
        rerun.reason = "WB & Soil".to_string();
        let decisions = vec![irrigated(day(10), Treatment::T2, 12.0), rerun];
        let measurements = vec![ndvi(day(10), Treatment::T2, 0.5), ndvi(day(10), Treatment::T2, 0.9)];

        let report = summarize(day(7), day(14), &decisions, &measurements, &[]);

        let t2 = &report.plots[1];
        assert_eq!(t2.irrigation_events, 1);
        assert_relative_eq!(t2.total_irrigation_liters, 14.0);
        assert_relative_eq!(t2.mean_ndvi.unwrap(), 0.9);
    }

    #[test]
    fn test_wue_absent_without_irrigation() {
        let heights = vec![PlantHeightRow {
            date: day(12),
            plot: Treatment::T1,
            plant_id: 1,
            height_cm: 9.0,
        }];
        let report = summarize(day(7), day(14), &[], &[], &heights);

        assert_eq!(report.plots[0].mean_height_cm, Some(9.0));
        assert_eq!(report.plots[0].wue_cm_per_liter, None);
        assert_eq!(report.canopy_saving_percent, None);
    }

    #[test]
    fn test_weekly_without_decisions_is_not_found() {
        let service = ReportingService::new(Arc::new(Ledgers::in_memory()));
        assert!(matches!(service.weekly(day(14)), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_export_to_csv_has_header() {
        let report = summarize(day(7), day(14), &[], &[], &[]);
        let csv = ReportingService::export_to_csv(&report.plots).unwrap();
        assert!(csv.starts_with("plot,irrigation_events,total_irrigation_liters"));
        assert_eq!(csv.lines().count(), 5);
    }
}
