//! Canopy model: NDVI to crop coefficient

use crate::models::NdviToKc;

/// Crop coefficient from an NDVI reading
///
/// Without a reading the stage coefficient is returned unchanged. With one,
/// `a * ndvi + b` is clamped to `[kc_min, kc_max]`.
pub fn crop_coefficient(ndvi: Option<f64>, fallback_kc: f64, params: &NdviToKc) -> f64 {
    match ndvi {
        None => fallback_kc,
        Some(ndvi) => (params.a * ndvi + params.b)
            .max(params.kc_min)
            .min(params.kc_max),
    }
}

/// Whether a canopy coefficient passes the active-canopy gate
pub fn is_active(kc: f64, params: &NdviToKc) -> bool {
    kc >= params.active_gate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_missing_ndvi_returns_fallback() {
        assert_eq!(crop_coefficient(None, 0.6, &NdviToKc::default()), 0.6);
    }

    #[test]
    fn test_linear_relationship_inside_clamp() {
        let kc = crop_coefficient(Some(0.3), 0.6, &NdviToKc::default());
        assert_relative_eq!(kc, 0.575, epsilon = 1e-12);
    }

    #[test]
    fn test_clamped_at_both_ends() {
        let params = NdviToKc::default();
        assert_eq!(crop_coefficient(Some(0.0), 0.6, &params), 0.30);
        assert_eq!(crop_coefficient(Some(1.0), 0.6, &params), 1.10);
    }

    #[test]
    fn test_active_gate_is_inclusive() {
        let params = NdviToKc::default();
        assert!(is_active(0.80, &params));
        assert!(!is_active(0.799, &params));
    }
}
