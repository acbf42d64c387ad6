//! One-shot summary combining every cheap analysis and the headline
//! figures of the expensive ones.

use emotion_map_analytics::{
    AnalyticsError, accessibility, aggregate, autocorrelation, clustering, distribution,
};
use emotion_map_analytics_models::{
    AnalysisConfig, AutocorrelationResult, ClusterSummary, CoordinateCorrelation, DailyTrend,
    DatasetOverview, EmotionDistribution, RegionalPattern, SpatialStats,
};
use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::GeometryEngine;
use serde::Serialize;

/// Coverage metrics without the polygons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub union_area_km2: f64,
    pub coverage_point_count: usize,
    pub average_emotion: f64,
    pub radius_km: f64,
}

/// Dashboard report. Analyses that cannot run on the given input are
/// `null` and the reason is logged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub overview: DatasetOverview,
    pub districts: Vec<String>,
    pub poi_types: Vec<String>,
    pub spatial_stats: SpatialStats,
    pub trend: Vec<DailyTrend>,
    pub distribution: Option<EmotionDistribution>,
    pub correlation: Option<CoordinateCorrelation>,
    pub autocorrelation: Option<AutocorrelationResult>,
    pub clusters: Option<Vec<ClusterSummary>>,
    pub coverage: Option<CoverageSummary>,
    pub regional_patterns: Vec<RegionalPattern>,
}

fn optional<T>(name: &str, result: Result<T, AnalyticsError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("report: {name} unavailable: {e}");
            None
        }
    }
}

#[must_use]
pub fn build(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    config: &AnalysisConfig,
) -> Report {
    let kmeans = clustering::KmeansParams {
        k: config.clustering.k,
        max_iterations: config.clustering.max_iterations,
    };

    Report {
        overview: distribution::overview(records),
        districts: aggregate::districts(records),
        poi_types: aggregate::poi_types(records),
        spatial_stats: aggregate::spatial_stats(records),
        trend: aggregate::temporal_trend(records),
        distribution: optional("distribution", distribution::emotion_distribution(records)),
        correlation: optional("correlation", distribution::coordinate_correlation(records)),
        autocorrelation: optional(
            "moran's I",
            autocorrelation::morans_i(records, engine, config.autocorrelation.warn_above),
        ),
        clusters: optional("clusters", clustering::kmeans_cluster(records, &kmeans))
            .map(|assignment| assignment.clusters),
        coverage: optional(
            "accessibility",
            accessibility::accessibility(records, engine, config.accessibility.service_radius_km),
        )
        .map(|result| CoverageSummary {
            union_area_km2: result.union_area_km2,
            coverage_point_count: result.coverage_point_count,
            average_emotion: result.average_emotion,
            radius_km: result.radius_km,
        }),
        regional_patterns: distribution::regional_patterns(
            records,
            config.regions.precision,
            config.regions.min_count,
        ),
    }
}

#[cfg(test)]
mod tests {
    use emotion_map_geometry::GeoEngine;

    use super::*;

    #[test]
    fn empty_input_degrades_to_nulls() {
        let report = build(&[], &GeoEngine::new(), &AnalysisConfig::default());
        assert_eq!(report.overview.total_records, 0);
        assert!(report.distribution.is_none());
        assert!(report.autocorrelation.is_none());
        assert!(report.clusters.is_none());
        assert!(report.coverage.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["coverage"].is_null());
        assert!(json["spatialStats"]["byDistrict"].is_object());
    }
}
