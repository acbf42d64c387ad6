#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry kernel for the emotion analytics engine.
//!
//! All coordinates are `(longitude, latitude)` pairs in degrees. Distances
//! and buffer radii are kilometres; areas are square metres (callers
//! convert to km²). The capability set lives behind [`GeometryEngine`] so
//! the analytics layer can be backed by any compliant engine; [`GeoEngine`]
//! is the implementation built on the `geo` crate with an `rstar` R-tree
//! for Voronoi neighbor lookups.

mod engine;
pub mod voronoi;

use geo::{Coord, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::GeoEngine;

/// Errors raised by geometry operations on structurally unusable input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Too few inputs for the operation to be defined.
    #[error("Insufficient input for {operation}: need at least {required}, got {actual}")]
    InsufficientInput {
        /// Operation that was attempted.
        operation: &'static str,
        /// Minimum number of inputs required.
        required: usize,
        /// Number of inputs supplied.
        actual: usize,
    },

    /// A caller-supplied parameter is out of range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what went wrong.
        message: String,
    },

    /// Input that most geometry engines reject (e.g. duplicate Voronoi sites).
    #[error("Degenerate input: {message}")]
    DegenerateInput {
        /// Description of what went wrong.
        message: String,
    },

    /// A point grid would exceed the configured size limit.
    #[error("Point grid of {points} points exceeds the limit of {limit}")]
    GridTooLarge {
        /// Number of points the grid would contain.
        points: usize,
        /// Configured maximum.
        limit: usize,
    },
}

/// Axis-aligned longitude/latitude extent.
///
/// Serializes with camelCase keys; snake_case keys are accepted on input
/// so the box can appear in TOML configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western edge (degrees).
    #[serde(alias = "min_lon")]
    pub min_lon: f64,
    /// Southern edge (degrees).
    #[serde(alias = "min_lat")]
    pub min_lat: f64,
    /// Eastern edge (degrees).
    #[serde(alias = "max_lon")]
    pub max_lon: f64,
    /// Northern edge (degrees).
    #[serde(alias = "max_lat")]
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box, checking that edges are finite and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] if an edge is not finite
    /// or a minimum exceeds its maximum.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, GeometryError> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Checks that edges are finite and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] on a malformed box.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let edges = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(GeometryError::InvalidParameter {
                message: format!("bounding box edges must be finite: {edges:?}"),
            });
        }
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return Err(GeometryError::InvalidParameter {
                message: format!("bounding box minimum exceeds maximum: {edges:?}"),
            });
        }
        Ok(())
    }

    /// East-west extent in degrees.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// North-south extent in degrees.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Returns `true` if the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: Point<f64>) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.x())
            && (self.min_lat..=self.max_lat).contains(&point.y())
    }

    /// Returns the box as a `geo` rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_lon,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lon,
                y: self.max_lat,
            },
        )
    }

    /// Returns the box as a closed polygon.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

/// Capability set the analytics layer needs from a geometry engine.
///
/// Implementations must use one distance model consistently: the value
/// returned by [`GeometryEngine::distance_km`] is the same notion of
/// distance used to size buffers and grid cells.
pub trait GeometryEngine: Send + Sync {
    /// Distance between two points in kilometres.
    fn distance_km(&self, a: Point<f64>, b: Point<f64>) -> f64;

    /// Circular buffer of `radius_km` around a point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] if the radius is not a
    /// positive finite number or the center is not finite.
    fn buffer(&self, center: Point<f64>, radius_km: f64) -> Result<Polygon<f64>, GeometryError>;

    /// Union of two or more polygons.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientInput`] for fewer than two
    /// polygons.
    fn union(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError>;

    /// Smallest box containing every point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InsufficientInput`] for an empty slice.
    fn bounding_box(&self, points: &[Point<f64>]) -> Result<BoundingBox, GeometryError>;

    /// Regular grid of points spaced `cell_size_km` apart, centred in `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidParameter`] for a non-positive cell
    /// size and [`GeometryError::GridTooLarge`] when the engine's size
    /// limit would be exceeded.
    fn point_grid(
        &self,
        bbox: &BoundingBox,
        cell_size_km: f64,
    ) -> Result<Vec<Point<f64>>, GeometryError>;

    /// Voronoi cell for each site, clipped to `clip`.
    ///
    /// The result is parallel to `sites`; a site whose cell lies entirely
    /// outside `clip` maps to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateInput`] if two sites share exact
    /// coordinates.
    fn voronoi(
        &self,
        sites: &[Point<f64>],
        clip: &BoundingBox,
    ) -> Result<Vec<Option<Polygon<f64>>>, GeometryError>;

    /// Area of a (multi)polygon in square metres.
    fn area_m2(&self, geometry: &MultiPolygon<f64>) -> f64;
}
