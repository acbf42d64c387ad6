//! Tunable analysis parameters.
//!
//! [`DEFAULT_CONFIG_TOML`] is the documented form of
//! [`AnalysisConfig::default`]; any key may be omitted from a user file.

use emotion_map_geometry::{BoundingBox, GeometryError};
use serde::{Deserialize, Serialize};

/// The default configuration as TOML, embedded at compile time.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Most decimal places regional patterns round coordinates to.
pub const MAX_REGION_PRECISION: u32 = 12;

/// Default Voronoi clip box covering the Zibo study area.
pub const DEFAULT_VORONOI_CLIP: BoundingBox = BoundingBox {
    min_lon: 117.5,
    min_lat: 36.0,
    max_lon: 118.5,
    max_lat: 37.5,
};

/// All tunable parameters, grouped by the analysis they affect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// k-means parameters.
    pub clustering: ClusteringConfig,
    /// Buffer and Voronoi parameters.
    pub zones: ZonesConfig,
    /// Service-area parameters.
    pub accessibility: AccessibilityConfig,
    /// IDW and density-surface parameters.
    pub interpolation: InterpolationConfig,
    /// Moran's I parameters.
    pub autocorrelation: AutocorrelationConfig,
    /// Rounded-grid regional pattern parameters.
    pub regions: RegionsConfig,
}

impl AnalysisConfig {
    /// Checks every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] naming the first
    /// offending key.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.clustering.k == 0 {
            return Err(invalid("clustering.k must be positive"));
        }
        if self.clustering.max_iterations == 0 {
            return Err(invalid("clustering.max_iterations must be positive"));
        }
        positive("zones.buffer_radius_km", self.zones.buffer_radius_km)?;
        self.zones.voronoi_clip.validate()?;
        positive(
            "accessibility.service_radius_km",
            self.accessibility.service_radius_km,
        )?;
        positive("interpolation.idw_cell_size_km", self.interpolation.idw_cell_size_km)?;
        positive("interpolation.idw_power", self.interpolation.idw_power)?;
        positive("interpolation.kde_cell_size_km", self.interpolation.kde_cell_size_km)?;
        positive("interpolation.kde_radius_km", self.interpolation.kde_radius_km)?;
        if self.interpolation.max_grid_points == 0 {
            return Err(invalid("interpolation.max_grid_points must be positive"));
        }
        if self.regions.precision > MAX_REGION_PRECISION {
            return Err(GeometryError::InvalidParameter {
                message: format!("regions.precision must be at most {MAX_REGION_PRECISION}"),
            });
        }
        Ok(())
    }
}

fn invalid(message: &str) -> GeometryError {
    GeometryError::InvalidParameter {
        message: message.to_string(),
    }
}

fn positive(key: &str, value: f64) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidParameter {
            message: format!("{key} must be a positive finite number, got {value}"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of clusters.
    pub k: usize,
    /// Lloyd iteration cap.
    pub max_iterations: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: 5,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    /// Buffer radius around each distinct location, in km.
    pub buffer_radius_km: f64,
    /// Clip box for Voronoi cells.
    pub voronoi_clip: BoundingBox,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            buffer_radius_km: 0.5,
            voronoi_clip: DEFAULT_VORONOI_CLIP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Service radius around each record, in km.
    pub service_radius_km: f64,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            service_radius_km: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// IDW grid spacing in km.
    pub idw_cell_size_km: f64,
    /// IDW distance exponent.
    pub idw_power: f64,
    /// Density grid spacing in km.
    pub kde_cell_size_km: f64,
    /// Density search radius in km.
    pub kde_radius_km: f64,
    /// Largest grid either surface may allocate.
    pub max_grid_points: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            idw_cell_size_km: 0.5,
            idw_power: 2.0,
            kde_cell_size_km: 0.5,
            kde_radius_km: 0.5,
            max_grid_points: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocorrelationConfig {
    /// Sample size above which the quadratic pair loop logs a warning.
    pub warn_above: usize,
}

impl Default for AutocorrelationConfig {
    fn default() -> Self {
        Self { warn_above: 5000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Decimal places coordinates are rounded to.
    pub precision: u32,
    /// Cells must hold strictly more records than this to be reported.
    pub min_count: usize,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            precision: 1,
            min_count: 5,
        }
    }
}
