//! Daily field measurement model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One plot's measurements for one day
///
/// Values are expected to be range-checked by the caller: ETo, rainfall and
/// forecast non-negative, soil moisture in [0, 0.6], NDVI in [0, 1]. Absent
/// optional readings are modelled as `None` and never defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyMeasurement {
    pub date: NaiveDate,
    /// Reference evapotranspiration (mm/day)
    pub eto_mm: f64,
    pub rain_observed_mm: f64,
    pub rain_forecast_24h_mm: f64,
    /// Volumetric soil water content (m³/m³)
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub ndvi: Option<f64>,
}

impl DailyMeasurement {
    pub fn new(date: NaiveDate, eto_mm: f64, rain_observed_mm: f64, rain_forecast_24h_mm: f64) -> Self {
        Self {
            date,
            eto_mm,
            rain_observed_mm,
            rain_forecast_24h_mm,
            soil_moisture: None,
            ndvi: None,
        }
    }

    pub fn with_soil_moisture(mut self, theta: f64) -> Self {
        self.soil_moisture = Some(theta);
        self
    }

    pub fn with_ndvi(mut self, ndvi: f64) -> Self {
        self.ndvi = Some(ndvi);
        self
    }
}
