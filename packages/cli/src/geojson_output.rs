//! Renders polygon and point results as `GeoJSON` feature collections.

use emotion_map_analytics_models::{AccessibilityResult, BufferZone, ClusterAssignment, VoronoiCell};
use emotion_map_emotion_models::EmotionRecord;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde_json::json;

fn properties(value: JsonValue) -> Option<JsonObject> {
    match value {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

fn feature(geometry: Option<Value>, props: JsonValue) -> Feature {
    Feature {
        bbox: None,
        geometry: geometry.map(Geometry::new),
        id: None,
        properties: properties(props),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>, extra: Option<JsonValue>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: extra.and_then(properties),
    }
}

#[must_use]
pub fn buffer_zones(zones: &[BufferZone]) -> FeatureCollection {
    collection(
        zones
            .iter()
            .map(|zone| {
                feature(
                    Some(Value::from(&zone.polygon)),
                    json!({
                        "name": zone.location_name,
                        "type": zone.poi_type,
                        "emotion": zone.mean_emotion,
                        "count": zone.record_count,
                        "radiusKm": zone.radius_km,
                    }),
                )
            })
            .collect(),
        None,
    )
}

/// Cells clipped away entirely become features with a null geometry.
#[must_use]
pub fn voronoi_cells(cells: &[VoronoiCell]) -> FeatureCollection {
    collection(
        cells
            .iter()
            .map(|cell| {
                feature(
                    cell.polygon.as_ref().map(Value::from),
                    json!({
                        "name": cell.location_name,
                        "type": cell.poi_type,
                        "emotion": cell.mean_emotion,
                        "count": cell.record_count,
                        "site": [cell.longitude, cell.latitude],
                    }),
                )
            })
            .collect(),
        None,
    )
}

/// The unioned coverage polygon first, then one feature per service area.
/// Headline metrics ride along as foreign members.
#[must_use]
pub fn accessibility(result: &AccessibilityResult) -> FeatureCollection {
    let mut features = Vec::with_capacity(result.service_areas.len() + 1);
    features.push(feature(
        Some(Value::from(&result.union)),
        json!({ "kind": "coverage" }),
    ));
    features.extend(result.service_areas.iter().map(|area| {
        feature(
            Some(Value::from(&area.polygon)),
            json!({
                "kind": "serviceArea",
                "name": area.location_name,
                "emotion": area.emotion_value,
                "radiusKm": area.radius_km,
            }),
        )
    }));

    collection(
        features,
        Some(json!({
            "unionAreaKm2": result.union_area_km2,
            "coveragePointCount": result.coverage_point_count,
            "averageEmotion": result.average_emotion,
            "radiusKm": result.radius_km,
        })),
    )
}

/// One point feature per clustered record, tagged with its cluster id.
/// Per-cluster summaries ride along as the `clusters` foreign member.
pub fn clusters(
    records: &[EmotionRecord],
    assignment: &ClusterAssignment,
) -> Result<FeatureCollection, serde_json::Error> {
    let features = records
        .iter()
        .zip(&assignment.assignments)
        .filter_map(|(record, cluster)| cluster.map(|id| (record, id)))
        .map(|(record, id)| {
            feature(
                Some(Value::Point(vec![record.longitude, record.latitude])),
                json!({
                    "cluster": id,
                    "name": record.location_name,
                    "emotion": record.emotion_value,
                }),
            )
        })
        .collect();

    Ok(collection(
        features,
        Some(json!({
            "k": assignment.k,
            "iterations": assignment.iterations,
            "clusters": serde_json::to_value(&assignment.clusters)?,
        })),
    ))
}
