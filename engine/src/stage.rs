//! Growth stage model
//!
//! Maps days after transplant onto three ordered, exhaustive bands.

use chrono::NaiveDate;

use crate::models::{StageCoefficients, StageParams};
use crate::types::Stage;

/// Last day (inclusive) of the initial stage
pub const INI_LAST_DAY: i64 = 20;

/// Last day (inclusive) of the mid-season stage
pub const MID_LAST_DAY: i64 = 45;

/// Whole days from transplant to `date`; negative before transplant
pub fn days_after_transplant(date: NaiveDate, transplant_date: NaiveDate) -> i64 {
    (date - transplant_date).num_days()
}

impl Stage {
    /// Stage band for a days-after-transplant value
    pub fn from_days(days: i64) -> Self {
        if days <= INI_LAST_DAY {
            Stage::Ini
        } else if days <= MID_LAST_DAY {
            Stage::Mid
        } else {
            Stage::Late
        }
    }
}

/// Stage and its coefficients for a days-after-transplant value
pub fn stage_values(days: i64, params: &StageParams) -> (Stage, StageCoefficients) {
    let stage = Stage::from_days(days);
    (stage, params.for_stage(stage))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Stage::from_days(0), Stage::Ini);
        assert_eq!(Stage::from_days(20), Stage::Ini);
        assert_eq!(Stage::from_days(21), Stage::Mid);
        assert_eq!(Stage::from_days(45), Stage::Mid);
        assert_eq!(Stage::from_days(46), Stage::Late);
        assert_eq!(Stage::from_days(400), Stage::Late);
    }

    #[test]
    fn test_days_before_transplant_are_initial_stage() {
        assert_eq!(Stage::from_days(-1), Stage::Ini);
        assert_eq!(Stage::from_days(i64::MIN), Stage::Ini);
    }

    #[test]
    fn test_days_after_transplant_crosses_month() {
        let transplant = date(2025, 11, 6);
        assert_eq!(days_after_transplant(date(2025, 11, 16), transplant), 10);
        assert_eq!(days_after_transplant(date(2025, 12, 1), transplant), 25);
        assert_eq!(days_after_transplant(date(2025, 11, 1), transplant), -5);
    }

    #[test]
    fn test_stage_values_follow_band() {
        let params = StageParams::default();
        let (stage, values) = stage_values(30, &params);
        assert_eq!(stage, Stage::Mid);
        assert_eq!(values, params.mid);
    }
}
