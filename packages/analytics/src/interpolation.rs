//! Gridded surfaces over the extent of the valid records.
//!
//! Both surfaces lay a [`GeometryEngine::point_grid`] over the bounding
//! box of the valid records and evaluate every grid point against every
//! sample, so cost is `grid points × samples` distance evaluations.

use emotion_map_analytics_models::{GridValue, Surface, SurfaceKind};
use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::GeometryEngine;
use geo::Point;

use crate::{AnalyticsError, point_of, positive_km, require, valid_for};

/// Added to every sample distance so a grid point on top of a sample gets
/// a finite weight.
pub const DISTANCE_EPSILON_KM: f64 = 1e-4;

/// A located value to interpolate from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Sample location.
    pub point: Point<f64>,
    /// Observed value.
    pub value: f64,
}

impl SamplePoint {
    /// Takes the record's location and emotion value.
    #[must_use]
    pub fn from_record(record: &EmotionRecord) -> Self {
        Self {
            point: point_of(record),
            value: record.emotion_value,
        }
    }
}

/// Parameters for IDW interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwParams {
    /// Grid spacing in km.
    pub cell_size_km: f64,
    /// Distance exponent (default: 2.0).
    pub power: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            cell_size_km: 0.5,
            power: 2.0,
        }
    }
}

/// Parameters for the weighted density surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelDensityParams {
    /// Grid spacing in km.
    pub cell_size_km: f64,
    /// Samples within this many km of a grid point contribute to it.
    pub radius_km: f64,
}

impl Default for KernelDensityParams {
    fn default() -> Self {
        Self {
            cell_size_km: 0.5,
            radius_km: 0.5,
        }
    }
}

/// IDW estimate at `target`: `Σ(w·v) / Σw` with `w = 1 / (d + ε)^power`.
///
/// Returns `NaN` for an empty sample set.
#[must_use]
pub fn idw_value_at(
    samples: &[SamplePoint],
    engine: &dyn GeometryEngine,
    target: Point<f64>,
    power: f64,
) -> f64 {
    let mut sum_w = 0.0;
    let mut sum_wv = 0.0;
    for sample in samples {
        let d = engine.distance_km(target, sample.point);
        let w = 1.0 / (d + DISTANCE_EPSILON_KM).powf(power);
        sum_w += w;
        sum_wv += w * sample.value;
    }
    sum_wv / sum_w
}

/// Interpolates emotion values onto a grid with inverse distance weighting.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientInput`] with no valid records
/// * [`AnalyticsError::InvalidParameter`] for a non-positive cell size or
///   power
/// * [`AnalyticsError::Geometry`] if the grid exceeds the engine's limit
pub fn idw_interpolate(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    params: &IdwParams,
) -> Result<Surface, AnalyticsError> {
    positive_km("cell_size_km", params.cell_size_km)?;
    positive_km("power", params.power)?;

    let samples: Vec<_> = valid_for("idw_interpolate", records)
        .into_iter()
        .map(SamplePoint::from_record)
        .collect();
    require("idw_interpolate", 1, samples.len())?;

    let points: Vec<_> = samples.iter().map(|s| s.point).collect();
    let bbox = engine.bounding_box(&points)?;
    let grid = engine.point_grid(&bbox, params.cell_size_km)?;
    log::debug!(
        "idw_interpolate: {} grid points from {} samples",
        grid.len(),
        samples.len()
    );

    let cells = grid
        .into_iter()
        .map(|p| GridValue {
            longitude: p.x(),
            latitude: p.y(),
            value: idw_value_at(&samples, engine, p, params.power),
        })
        .collect();

    Ok(Surface {
        kind: SurfaceKind::Idw,
        cell_size_km: params.cell_size_km,
        bbox,
        sample_count: samples.len(),
        cells,
    })
}

/// Weighted-grid density surface.
///
/// Each grid point's value is the plain sum of the emotion values of the
/// samples within `radius_km` of it. There is no kernel function and no
/// normalization, so this is a coarse weighted count rather than a true
/// kernel density estimate.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientInput`] with no valid records
/// * [`AnalyticsError::InvalidParameter`] for a non-positive cell size or
///   radius
/// * [`AnalyticsError::Geometry`] if the grid exceeds the engine's limit
pub fn kernel_density_surface(
    records: &[EmotionRecord],
    engine: &dyn GeometryEngine,
    params: &KernelDensityParams,
) -> Result<Surface, AnalyticsError> {
    positive_km("cell_size_km", params.cell_size_km)?;
    positive_km("radius_km", params.radius_km)?;

    let samples: Vec<_> = valid_for("kernel_density_surface", records)
        .into_iter()
        .map(SamplePoint::from_record)
        .collect();
    require("kernel_density_surface", 1, samples.len())?;

    let points: Vec<_> = samples.iter().map(|s| s.point).collect();
    let bbox = engine.bounding_box(&points)?;
    let grid = engine.point_grid(&bbox, params.cell_size_km)?;

    let cells = grid
        .into_iter()
        .map(|p| GridValue {
            longitude: p.x(),
            latitude: p.y(),
            value: samples
                .iter()
                .filter(|s| engine.distance_km(p, s.point) <= params.radius_km)
                .map(|s| s.value)
                .sum(),
        })
        .collect();

    Ok(Surface {
        kind: SurfaceKind::KernelDensity,
        cell_size_km: params.cell_size_km,
        bbox,
        sample_count: samples.len(),
        cells,
    })
}
