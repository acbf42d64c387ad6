//! Service-area coverage.
//!
//! Accessibility here is straight-line coverage: every record gets a
//! circular service area and the areas are unioned. No road network is
//! consulted.

use emotion_map_analytics_models::{AccessibilityResult, ServiceArea};
use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::GeometryEngine;
use geo::MultiPolygon;

use crate::{AnalyticsError, point_of, positive_km, require, valid_for};

/// Default service radius in km.
pub const DEFAULT_SERVICE_RADIUS_KM: f64 = 1.0;

/// Buffers every valid record by `radius_km`, unions the buffers and
/// reports the covered area in km².
///
/// A single record skips the union and reports its own buffer.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidParameter`] for a non-positive radius
/// * [`AnalyticsError::InsufficientInput`] with no valid records
/// * [`AnalyticsError::Geometry`] if buffering or union fails
pub fn accessibility(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    radius_km: f64,
) -> Result<AccessibilityResult, AnalyticsError> {
    positive_km("radius_km", radius_km)?;

    let valid = valid_for("accessibility", records);
    require("accessibility", 1, valid.len())?;

    let service_areas = valid
        .iter()
        .map(|record| {
            Ok(ServiceArea {
                location_name: record.location_name.clone(),
                longitude: record.longitude,
                latitude: record.latitude,
                emotion_value: record.emotion_value,
                radius_km,
                polygon: engine.buffer(point_of(record), radius_km)?,
            })
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    let polygons: Vec<_> = service_areas.iter().map(|s| s.polygon.clone()).collect();
    let union = if polygons.len() == 1 {
        MultiPolygon::new(polygons)
    } else {
        engine.union(&polygons)?
    };

    let union_area_km2 = engine.area_m2(&union) / 1_000_000.0;
    #[allow(clippy::cast_precision_loss)]
    let average_emotion =
        valid.iter().map(|r| r.emotion_value).sum::<f64>() / valid.len() as f64;

    log::info!(
        "accessibility: {} service area(s) of {radius_km} km cover {union_area_km2:.3} km²",
        service_areas.len()
    );

    Ok(AccessibilityResult {
        union_area_km2,
        coverage_point_count: service_areas.len(),
        average_emotion,
        radius_km,
        union,
        service_areas,
    })
}

#[cfg(test)]
mod tests {
    use emotion_map_geometry::GeoEngine;
    use geo::Point;

    use super::*;
    use crate::test_records::record;

    #[test]
    fn empty_input_is_insufficient() {
        assert!(matches!(
            accessibility(&[], &GeoEngine::new(), 1.0),
            Err(AnalyticsError::InsufficientInput {
                required: 1,
                actual: 0,
                ..
            })
        ));
    }

    #[test]
    fn single_record_area_equals_its_buffer() {
        let engine = GeoEngine::new();
        let r = record(118.0, 36.8, 6.0);
        let result = accessibility(std::slice::from_ref(&r), &engine, 1.0).unwrap();
        let buffer = engine.buffer(Point::new(118.0, 36.8), 1.0).unwrap();
        let expected = engine.area_m2(&MultiPolygon::new(vec![buffer])) / 1_000_000.0;
        assert!((result.union_area_km2 - expected).abs() < 1e-12);
        assert_eq!(result.coverage_point_count, 1);
        assert!((result.average_emotion - 6.0).abs() < 1e-12);
    }

    #[test]
    fn overlapping_areas_count_once() {
        let engine = GeoEngine::new();
        let single = accessibility(&[record(118.0, 36.8, 1.0)], &engine, 1.0)
            .unwrap()
            .union_area_km2;
        let records = vec![
            record(118.0, 36.8, 2.0),
            record(118.0, 36.8, 4.0),
            record(f64::NAN, 36.8, 4.0),
        ];
        let result = accessibility(&records, &engine, 1.0).unwrap();
        assert_eq!(result.coverage_point_count, 2);
        assert_eq!(result.service_areas.len(), 2);
        assert!((result.average_emotion - 3.0).abs() < 1e-12);
        assert!((result.union_area_km2 - single).abs() / single < 1e-4);
    }

    #[test]
    fn disjoint_areas_add_up() {
        let engine = GeoEngine::new();
        let records = vec![record(118.0, 36.8, 2.0), record(118.2, 36.8, 4.0)];
        let result = accessibility(&records, &engine, 1.0).unwrap();
        let single = accessibility(&records[..1], &engine, 1.0).unwrap().union_area_km2;
        assert!((result.union_area_km2 - 2.0 * single).abs() / single < 1e-3);
        assert_eq!(result.union.0.len(), 2);
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(matches!(
            accessibility(&[record(118.0, 36.8, 2.0)], &GeoEngine::new(), 0.0),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
    }
}
