//! Per-location buffer zones and the Voronoi tessellation.

use std::collections::BTreeMap;

use emotion_map_analytics_models::{BufferZone, VoronoiCell};
use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::{BoundingBox, GeometryEngine};
use geo::Point;

use crate::{AnalyticsError, positive_km, valid_for};

/// Records sharing one location, in order of first appearance.
struct LocationGroup<'a> {
    first: &'a EmotionRecord,
    values: Vec<f64>,
}

impl LocationGroup<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    fn point(&self) -> Point<f64> {
        Point::new(self.first.longitude, self.first.latitude)
    }
}

fn group_locations<'a, K, F>(records: &[&'a EmotionRecord], key: F) -> Vec<LocationGroup<'a>>
where
    K: Ord,
    F: Fn(&EmotionRecord) -> K,
{
    let mut index: BTreeMap<K, usize> = BTreeMap::new();
    let mut groups: Vec<LocationGroup<'a>> = Vec::new();
    for &record in records {
        let slot = *index.entry(key(record)).or_insert_with(|| {
            groups.push(LocationGroup {
                first: record,
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].values.push(record.emotion_value);
    }
    groups
}

/// One buffer per distinct `(location name, longitude, latitude)`.
///
/// Each zone carries the mean emotion of every record at that location
/// and the POI type of the first one seen. Zones follow first-appearance
/// order.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidParameter`] for a non-positive radius
/// * [`AnalyticsError::Geometry`] if buffering fails
pub fn buffer_zones(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    radius_km: f64,
) -> Result<Vec<BufferZone>, AnalyticsError> {
    positive_km("radius_km", radius_km)?;

    let valid = valid_for("buffer_zones", records);
    let groups = group_locations(&valid, |r| (r.location_name.clone(), r.coordinate_key()));
    log::debug!(
        "buffer_zones: {} location(s) from {} record(s)",
        groups.len(),
        valid.len()
    );

    groups
        .iter()
        .map(|group| {
            Ok(BufferZone {
                location_name: group.first.location_name.clone(),
                poi_type: group.first.poi_type.clone(),
                longitude: group.first.longitude,
                latitude: group.first.latitude,
                mean_emotion: group.mean(),
                record_count: group.values.len(),
                radius_km,
                polygon: engine.buffer(group.point(), radius_km)?,
            })
        })
        .collect()
}

/// Voronoi cell for every distinct location, clipped to `clip`.
///
/// Records at identical coordinates collapse into one site carrying the
/// name and POI type of the first and the mean emotion of all. Sites whose
/// cell falls outside `clip` keep a `None` polygon.
///
/// # Errors
///
/// * [`AnalyticsError::Geometry`] if `clip` is malformed
pub fn voronoi_tessellation(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    clip: &BoundingBox,
) -> Result<Vec<VoronoiCell>, AnalyticsError> {
    clip.validate()?;

    let valid = valid_for("voronoi_tessellation", records);
    let groups = group_locations(&valid, EmotionRecord::coordinate_key);
    let sites: Vec<_> = groups.iter().map(LocationGroup::point).collect();
    let polygons = engine.voronoi(&sites, clip)?;

    let clipped_away = polygons.iter().filter(|p| p.is_none()).count();
    if clipped_away > 0 {
        log::warn!("voronoi_tessellation: {clipped_away} site(s) fall outside the clip box");
    }

    Ok(groups
        .iter()
        .zip(polygons)
        .map(|(group, polygon)| VoronoiCell {
            location_name: group.first.location_name.clone(),
            poi_type: group.first.poi_type.clone(),
            longitude: group.first.longitude,
            latitude: group.first.latitude,
            mean_emotion: group.mean(),
            record_count: group.values.len(),
            polygon,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use emotion_map_geometry::GeoEngine;
    use geo::{Area, Contains};

    use super::*;
    use crate::test_records::named;

    fn zibo() -> BoundingBox {
        BoundingBox::new(117.5, 36.0, 118.5, 37.5).unwrap()
    }

    #[test]
    fn one_zone_per_named_location_with_mean() {
        let records = vec![
            named("人民公园", 118.05, 36.81, 8.0),
            named("万象汇", 118.06, 36.80, 3.0),
            named("人民公园", 118.05, 36.81, 6.0),
            named("人民公园", 118.05, 36.81, 7.0),
            named("人民公园北门", 118.05, 36.81, 1.0),
        ];
        let zones = buffer_zones(&records, &GeoEngine::new(), 0.5).unwrap();
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].location_name, "人民公园");
        assert_eq!(zones[0].record_count, 3);
        assert!((zones[0].mean_emotion - 7.0).abs() < 1e-12);
        assert_eq!(zones[1].location_name, "万象汇");
        assert_eq!(zones[2].record_count, 1);
        assert!(zones[0].polygon.contains(&Point::new(118.05, 36.81)));
    }

    #[test]
    fn buffer_zones_validate_radius() {
        assert!(matches!(
            buffer_zones(&[], &GeoEngine::new(), -1.0),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
        assert!(buffer_zones(&[], &GeoEngine::new(), 0.5).unwrap().is_empty());
    }

    #[test]
    fn voronoi_collapses_duplicate_sites() {
        let records = vec![
            named("a", 117.8, 36.5, 4.0),
            named("b", 118.2, 37.0, 9.0),
            named("a again", 117.8, 36.5, 6.0),
        ];
        let cells = voronoi_tessellation(&records, &GeoEngine::new(), &zibo()).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].location_name, "a");
        assert_eq!(cells[0].record_count, 2);
        assert!((cells[0].mean_emotion - 5.0).abs() < 1e-12);

        let total: f64 = cells
            .iter()
            .map(|c| c.polygon.as_ref().unwrap().unsigned_area())
            .sum();
        assert!((total - 1.5).abs() < 1e-9);
        assert!(cells[1].polygon.as_ref().unwrap().contains(&Point::new(118.2, 37.0)));
    }

    #[test]
    fn voronoi_marks_sites_outside_clip() {
        let records = vec![named("in", 118.0, 36.8, 4.0), named("far", 125.0, 36.8, 4.0)];
        let cells = voronoi_tessellation(&records, &GeoEngine::new(), &zibo()).unwrap();
        assert!(cells[0].polygon.is_some());
        assert!(cells[1].polygon.is_none());
    }
}
