//! Plant height handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{PlantHeightRow, Treatment};
use crate::AppState;

/// Weekly heights for up to six plants of one plot; zero means not measured
#[derive(Debug, Deserialize, Validate)]
pub struct PlantHeightInput {
    pub date: NaiveDate,
    pub plot: Treatment,
    #[validate(length(max = 6))]
    pub heights_cm: Vec<f64>,
}

impl PlantHeightInput {
    fn rows(&self) -> AppResult<Vec<PlantHeightRow>> {
        self.validate()?;
        if let Some(bad) = self.heights_cm.iter().find(|h| !(0.0..=100.0).contains(*h)) {
            return Err(AppError::Validation {
                field: "heights_cm".to_string(),
                message: format!("Height {} cm out of range 0-100", bad),
            });
        }

        Ok(self
            .heights_cm
            .iter()
            .enumerate()
            .filter(|(_, h)| **h > 0.0)
            .map(|(i, h)| PlantHeightRow {
                date: self.date,
                plot: self.plot,
                plant_id: (i + 1) as u8,
                height_cm: *h,
            })
            .collect())
    }
}

/// Record weekly plant heights
pub async fn record_plant_heights(
    State(state): State<AppState>,
    Json(input): Json<PlantHeightInput>,
) -> AppResult<(StatusCode, Json<Vec<PlantHeightRow>>)> {
    let rows = input.rows()?;
    state.ledgers.plant_heights.append(&rows)?;
    tracing::info!(plot = %input.plot, saved = rows.len(), "Plant heights recorded");
    Ok((StatusCode::CREATED, Json(rows)))
}

/// List recorded plant heights
pub async fn list_plant_heights(State(state): State<AppState>) -> AppResult<Json<Vec<PlantHeightRow>>> {
    Ok(Json(state.ledgers.plant_heights.read_all()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(heights_cm: Vec<f64>) -> PlantHeightInput {
        PlantHeightInput {
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            plot: Treatment::T3,
            heights_cm,
        }
    }

    #[test]
    fn test_zero_heights_are_skipped() {
        let rows = input(vec![12.0, 0.0, 13.5]).rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].plant_id, 3);
    }

    #[test]
    fn test_too_many_plants_rejected() {
        assert!(input(vec![10.0; 7]).rows().is_err());
        assert!(input(vec![120.0]).rows().is_err());
    }
}
