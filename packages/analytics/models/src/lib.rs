#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types and tunable defaults for the emotion analytics engine.
//!
//! Every type here is plain data: built fresh by one analytics call,
//! serializable, and carrying no behavior beyond small constructors.

pub mod config;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use emotion_map_emotion_models::TimeSlot;
use emotion_map_geometry::BoundingBox;
use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

pub use config::AnalysisConfig;

/// Count, values and mean of one category within a grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    /// Number of contributing records.
    pub count: usize,
    /// Emotion values in input order.
    pub values: Vec<f64>,
    /// Arithmetic mean of `values`.
    pub mean: f64,
}

impl CategoryAggregate {
    /// Builds an aggregate from its values. An empty slice has a `NaN` mean.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: Vec<f64>) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        Self {
            count,
            values,
            mean,
        }
    }
}

/// One day of the temporal trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// Calendar date.
    pub date: NaiveDate,
    /// Records observed on this date.
    pub count: usize,
    /// Mean emotion value on this date.
    pub mean: f64,
}

/// Fixed-proportion split of distinct locations into display bands.
///
/// This is a 30/30/40 bucketing heuristic with no statistical meaning; no
/// density is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityBands {
    /// `floor(0.3 * total)`.
    pub high: usize,
    /// `floor(0.3 * total)`.
    pub medium: usize,
    /// `total - high - medium`.
    pub low: usize,
    /// Number of distinct `(longitude, latitude)` pairs.
    pub total: usize,
}

/// Dashboard summary: density bands plus the three category groupings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialStats {
    /// Density bands over distinct locations.
    pub density: DensityBands,
    /// Aggregates keyed by district.
    pub by_district: BTreeMap<String, CategoryAggregate>,
    /// Aggregates keyed by time slot.
    pub by_time_slot: BTreeMap<TimeSlot, CategoryAggregate>,
    /// Aggregates keyed by POI type.
    pub by_poi_type: BTreeMap<String, CategoryAggregate>,
}

/// Reading of a Moran's I value against the fixed ±0.3 thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Interpretation {
    /// `I > 0.3`: similar values sit near each other.
    ClusteredPositive,
    /// `I < -0.3`: dissimilar values sit near each other.
    ClusteredNegative,
    /// Anything in between.
    Random,
}

impl Interpretation {
    /// Threshold magnitude separating clustered from random.
    pub const THRESHOLD: f64 = 0.3;

    /// Classifies an index value.
    #[must_use]
    pub fn from_index(index: f64) -> Self {
        if index > Self::THRESHOLD {
            Self::ClusteredPositive
        } else if index < -Self::THRESHOLD {
            Self::ClusteredNegative
        } else {
            Self::Random
        }
    }

    /// Human-readable explanation for dashboards.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ClusteredPositive => {
                "Significant positive spatial autocorrelation: emotion values cluster spatially"
            }
            Self::ClusteredNegative => {
                "Significant negative spatial autocorrelation: emotion values are spatially dispersed"
            }
            Self::Random => "No notable spatial autocorrelation: emotion values look randomly placed",
        }
    }
}

/// Global Moran's I over all record pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocorrelationResult {
    /// Moran's I. Not clamped to `[-1, 1]`.
    pub index: f64,
    /// Threshold reading of `index`.
    pub interpretation: Interpretation,
    /// Number of records that contributed.
    pub sample_size: usize,
}

/// One interpolated or weighted grid value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridValue {
    /// Grid point longitude.
    pub longitude: f64,
    /// Grid point latitude.
    pub latitude: f64,
    /// Surface value at this point.
    pub value: f64,
}

/// Which surface a [`Surface`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SurfaceKind {
    /// Inverse-distance-weighted interpolation.
    Idw,
    /// Weighted-grid density approximation.
    KernelDensity,
}

/// A gridded surface over the extent of the input records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    /// Surface type.
    pub kind: SurfaceKind,
    /// Grid spacing in kilometres.
    pub cell_size_km: f64,
    /// Extent the grid was laid over.
    pub bbox: BoundingBox,
    /// Number of samples used.
    pub sample_count: usize,
    /// Grid values, column-major from the south-west corner.
    pub cells: Vec<GridValue>,
}

/// Emotion statistics of one spatial cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Cluster id in `[0, k)`.
    pub cluster_id: usize,
    /// Final centroid longitude.
    pub centroid_longitude: f64,
    /// Final centroid latitude.
    pub centroid_latitude: f64,
    /// Records assigned to this cluster.
    pub count: usize,
    /// Mean emotion of assigned records (`None` for an empty cluster).
    pub mean_emotion: Option<f64>,
    /// Sample standard deviation of emotion (`None` below two records).
    pub std_emotion: Option<f64>,
}

/// k-means partition of the input records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAssignment {
    /// Requested number of clusters.
    pub k: usize,
    /// Parallel to the input: cluster id for each valid record, `None` for
    /// records dropped as invalid.
    pub assignments: Vec<Option<usize>>,
    /// Per-cluster centroid and emotion statistics, indexed by cluster id.
    pub clusters: Vec<ClusterSummary>,
    /// Lloyd iterations run before convergence or the iteration cap.
    pub iterations: usize,
}

/// Buffer polygon around one distinct location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferZone {
    /// Location name.
    pub location_name: String,
    /// POI type of the first record seen at this location.
    pub poi_type: String,
    /// Location longitude.
    pub longitude: f64,
    /// Location latitude.
    pub latitude: f64,
    /// Mean emotion of every record at this location.
    pub mean_emotion: f64,
    /// Number of records at this location.
    pub record_count: usize,
    /// Buffer radius in kilometres.
    pub radius_km: f64,
    /// Buffer polygon.
    pub polygon: Polygon<f64>,
}

/// Voronoi cell of one distinct location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoronoiCell {
    /// Name of the first record seen at this site.
    pub location_name: String,
    /// POI type of the first record seen at this site.
    pub poi_type: String,
    /// Site longitude.
    pub longitude: f64,
    /// Site latitude.
    pub latitude: f64,
    /// Mean emotion of every record at this site.
    pub mean_emotion: f64,
    /// Number of records collapsed into this site.
    pub record_count: usize,
    /// Cell polygon, `None` when the cell lies outside the clip box.
    pub polygon: Option<Polygon<f64>>,
}

/// Service-area buffer around one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceArea {
    /// Location name.
    pub location_name: String,
    /// Record longitude.
    pub longitude: f64,
    /// Record latitude.
    pub latitude: f64,
    /// Record emotion value.
    pub emotion_value: f64,
    /// Service radius in kilometres.
    pub radius_km: f64,
    /// Service-area polygon.
    pub polygon: Polygon<f64>,
}

/// Euclidean-buffer coverage of a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityResult {
    /// Area of the unioned service areas in km².
    pub union_area_km2: f64,
    /// Number of records that contributed a service area.
    pub coverage_point_count: usize,
    /// Mean emotion over contributing records.
    pub average_emotion: f64,
    /// Service radius in kilometres.
    pub radius_km: f64,
    /// Union of every service area.
    pub union: MultiPolygon<f64>,
    /// Individual service areas in input order.
    pub service_areas: Vec<ServiceArea>,
}

/// Heatmap weight for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Emotion value divided by 10.
    pub intensity: f64,
}

/// Descriptive statistics of emotion values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionDistribution {
    /// Number of valid records.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample standard deviation (`None` below two records).
    pub std_dev: Option<f64>,
    /// Bias-corrected sample skewness (`None` below three records or at
    /// zero variance).
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis (`None` below four records or at
    /// zero variance).
    pub kurtosis: Option<f64>,
}

/// Pearson correlation of each coordinate with emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateCorrelation {
    /// Longitude vs emotion (`None` when either variance is zero).
    pub longitude: Option<f64>,
    /// Latitude vs emotion (`None` when either variance is zero).
    pub latitude: Option<f64>,
}

/// Mean emotion of one rounded-coordinate grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalPattern {
    /// Rounded longitude of the cell.
    pub longitude: f64,
    /// Rounded latitude of the cell.
    pub latitude: f64,
    /// Mean emotion within the cell.
    pub mean_emotion: f64,
    /// Records within the cell.
    pub count: usize,
}

/// Inclusive range of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

/// Headline figures about a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    /// Records supplied.
    pub total_records: usize,
    /// Records with finite coordinates and emotion.
    pub valid_records: usize,
    /// Records dropped as invalid.
    pub invalid_records: usize,
    /// Distinct `(longitude, latitude)` pairs among valid records.
    pub distinct_locations: usize,
    /// First and last observation date among valid records.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Longitude range of valid records.
    pub longitude_range: Option<ValueRange>,
    /// Latitude range of valid records.
    pub latitude_range: Option<ValueRange>,
    /// Emotion range of valid records.
    pub emotion_range: Option<ValueRange>,
}
