//! Global Moran's I.
//!
//! Weights are `1 / (distance_km + 1e-4)` over every ordered pair of
//! distinct records. The pair loop is O(n²) in time; callers with large
//! inputs should sample first. A warning is logged once the sample size
//! passes the configured threshold.

use emotion_map_analytics_models::{AutocorrelationResult, Interpretation};
use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::GeometryEngine;

use crate::{AnalyticsError, point_of, require, valid_for};

/// Added to every pairwise distance so coincident points get a finite
/// weight.
pub const WEIGHT_EPSILON_KM: f64 = 1e-4;

/// Default sample size above which a scalability warning is logged.
pub const DEFAULT_WARN_ABOVE: usize = 5000;

/// Computes global Moran's I on emotion values.
///
/// `I = (n / ΣΣw) · (ΣΣ w·(vᵢ−μ)(vⱼ−μ) / Σ(vᵢ−μ)²)`, summed over `i ≠ j`.
/// The index is not clamped.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientInput`] with fewer than two valid records
/// * [`AnalyticsError::DegenerateDenominator`] when every value is equal
pub fn morans_i(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    warn_above: usize,
) -> Result<AutocorrelationResult, AnalyticsError> {
    let valid = valid_for("morans_i", records);
    let n = valid.len();
    require("morans_i", 2, n)?;

    if n > warn_above {
        log::warn!(
            "morans_i: {n} records means {} distance evaluations; consider sampling",
            n * (n - 1) / 2
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let n_f = n as f64;
    let mean = valid.iter().map(|r| r.emotion_value).sum::<f64>() / n_f;
    let deviations: Vec<f64> = valid.iter().map(|r| r.emotion_value - mean).collect();
    let denominator: f64 = deviations.iter().map(|d| d * d).sum();
    // Equal values that are not exact binary fractions leave rounding
    // residue in the deviations, so test the values themselves.
    let first = valid[0].emotion_value.to_bits();
    let constant = valid.iter().all(|r| r.emotion_value.to_bits() == first);
    if constant || denominator <= 0.0 {
        return Err(AnalyticsError::DegenerateDenominator {
            operation: "morans_i",
            message: "emotion values have zero variance".to_string(),
        });
    }

    let points: Vec<_> = valid.iter().map(|r| point_of(r)).collect();

    // Weights are symmetric, so each unordered pair counts twice in both
    // sums; the factor cancels in the ratio.
    let mut numerator = 0.0;
    let mut total_weight = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = 1.0 / (engine.distance_km(points[i], points[j]) + WEIGHT_EPSILON_KM);
            numerator += weight * deviations[i] * deviations[j];
            total_weight += weight;
        }
    }
    let numerator = 2.0 * numerator;
    let total_weight = 2.0 * total_weight;

    let index = (n_f / total_weight) * (numerator / denominator);
    let interpretation = Interpretation::from_index(index);
    log::debug!("morans_i: n={n} I={index:.6} ({interpretation})");

    Ok(AutocorrelationResult {
        index,
        interpretation,
        sample_size: n,
    })
}

#[cfg(test)]
mod tests {
    use emotion_map_geometry::GeoEngine;

    use super::*;
    use crate::test_records::record;

    #[test]
    fn two_opposite_points_are_perfectly_negative() {
        let records = vec![record(118.0, 36.8, 8.0), record(118.01, 36.81, 2.0)];
        let engine = GeoEngine::new();
        let result = morans_i(&records, &engine, DEFAULT_WARN_ABOVE).unwrap();
        assert_eq!(result.sample_size, 2);

        // Mean 5 and deviations ±3 are exact, so the only rounding comes
        // from the single pair weight; replay it in the same order.
        let weight = 1.0
            / (engine.distance_km(point_of(&records[0]), point_of(&records[1]))
                + WEIGHT_EPSILON_KM);
        let expected = (2.0 / (2.0 * weight)) * ((2.0 * (weight * 3.0 * -3.0)) / 18.0);
        assert_eq!(result.index, expected);
        assert!((result.index + 1.0).abs() < 1e-12, "I = {}", result.index);
        assert_eq!(result.interpretation, Interpretation::ClusteredNegative);
    }

    #[test]
    fn identical_values_have_zero_variance() {
        let records = vec![record(118.0, 36.8, 5.0), record(118.01, 36.81, 5.0)];
        assert!(matches!(
            morans_i(&records, &GeoEngine::new(), DEFAULT_WARN_ABOVE),
            Err(AnalyticsError::DegenerateDenominator { .. })
        ));
    }

    #[test]
    fn identical_inexact_values_have_zero_variance() {
        for value in [0.1, 0.7, 3.3] {
            let records = vec![
                record(118.0, 36.8, value),
                record(118.01, 36.81, value),
                record(118.02, 36.83, value),
            ];
            assert!(
                matches!(
                    morans_i(&records, &GeoEngine::new(), DEFAULT_WARN_ABOVE),
                    Err(AnalyticsError::DegenerateDenominator { .. })
                ),
                "value {value}"
            );
        }
    }

    #[test]
    fn needs_two_valid_records() {
        let records = vec![record(118.0, 36.8, 5.0), record(f64::NAN, 36.81, 5.0)];
        assert!(matches!(
            morans_i(&records, &GeoEngine::new(), DEFAULT_WARN_ABOVE),
            Err(AnalyticsError::InsufficientInput {
                required: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn spatially_grouped_values_are_positive() {
        let mut records = Vec::new();
        for i in 0..5 {
            let offset = f64::from(i) * 0.001;
            records.push(record(118.0 + offset, 36.8, 9.0 - offset));
            records.push(record(118.5 + offset, 36.3, 1.0 + offset));
        }
        let result = morans_i(&records, &GeoEngine::new(), 1).unwrap();
        assert!(result.index.is_finite());
        assert!(result.index > 0.3, "I = {}", result.index);
        assert_eq!(result.interpretation, Interpretation::ClusteredPositive);
    }

    #[test]
    fn coincident_points_stay_finite() {
        let records = vec![
            record(118.0, 36.8, 1.0),
            record(118.0, 36.8, 9.0),
            record(118.2, 36.9, 4.0),
        ];
        let result = morans_i(&records, &GeoEngine::new(), DEFAULT_WARN_ABOVE).unwrap();
        assert!(result.index.is_finite());
    }
}
