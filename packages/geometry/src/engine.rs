//! [`GeometryEngine`] backed by the `geo` crate.
//!
//! Distances are haversine great-circle distances on the mean earth
//! radius. Buffers are geodesic circles approximated by a regular polygon
//! whose vertices are haversine destinations, so a buffer's edge sits at
//! exactly `radius_km` by the same distance model. Areas are geodesic.

use geo::{
    BooleanOps, BoundingRect, Destination, Distance, GeodesicArea, Haversine, LineString,
    MultiPoint, MultiPolygon, Point, Polygon,
};

use crate::{BoundingBox, GeometryEngine, GeometryError, voronoi};

/// Default number of vertices on a buffer circle.
pub const DEFAULT_BUFFER_STEPS: usize = 64;

/// Default upper bound on the number of points a grid may contain.
pub const DEFAULT_MAX_GRID_POINTS: usize = 1_000_000;

/// Geometry engine built on `geo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoEngine {
    buffer_steps: usize,
    max_grid_points: usize,
}

impl Default for GeoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoEngine {
    /// Creates an engine with default buffer resolution and grid limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer_steps: DEFAULT_BUFFER_STEPS,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }

    /// Sets the number of vertices used to approximate buffer circles
    /// (minimum 8).
    #[must_use]
    pub fn with_buffer_steps(mut self, steps: usize) -> Self {
        self.buffer_steps = steps.max(8);
        self
    }

    /// Sets the largest point grid [`GeometryEngine::point_grid`] will build.
    #[must_use]
    pub const fn with_max_grid_points(mut self, limit: usize) -> Self {
        self.max_grid_points = limit;
        self
    }

    /// Number of vertices on a buffer circle.
    #[must_use]
    pub const fn buffer_steps(&self) -> usize {
        self.buffer_steps
    }

    /// Configured grid size limit.
    #[must_use]
    pub const fn max_grid_points(&self) -> usize {
        self.max_grid_points
    }
}

impl GeometryEngine for GeoEngine {
    fn distance_km(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        Haversine.distance(a, b) / 1000.0
    }

    #[allow(clippy::cast_precision_loss)]
    fn buffer(&self, center: Point<f64>, radius_km: f64) -> Result<Polygon<f64>, GeometryError> {
        if !center.x().is_finite() || !center.y().is_finite() {
            return Err(GeometryError::InvalidParameter {
                message: format!("buffer center is not finite: ({}, {})", center.x(), center.y()),
            });
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                message: format!("buffer radius must be positive, got {radius_km} km"),
            });
        }

        let radius_m = radius_km * 1000.0;
        let steps = self.buffer_steps;
        let ring: LineString<f64> = (0..steps)
            .map(|i| {
                let bearing = -360.0 * i as f64 / steps as f64;
                Haversine.destination(center, bearing, radius_m)
            })
            .collect();

        Ok(Polygon::new(ring, vec![]))
    }

    fn union(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError> {
        if polygons.len() < 2 {
            return Err(GeometryError::InsufficientInput {
                operation: "union",
                required: 2,
                actual: polygons.len(),
            });
        }

        // Pairwise reduction keeps each boolean op on similarly-sized inputs.
        let mut layer: Vec<MultiPolygon<f64>> =
            polygons.iter().cloned().map(MultiPolygon::from).collect();
        while layer.len() > 1 {
            layer = layer
                .chunks(2)
                .filter_map(|pair| {
                    let (first, rest) = pair.split_first()?;
                    Some(rest.iter().fold(first.clone(), |acc, p| acc.union(p)))
                })
                .collect();
        }

        log::trace!("union of {} polygons complete", polygons.len());
        Ok(layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![])))
    }

    fn bounding_box(&self, points: &[Point<f64>]) -> Result<BoundingBox, GeometryError> {
        MultiPoint::from(points.to_vec())
            .bounding_rect()
            .map(BoundingBox::from)
            .ok_or(GeometryError::InsufficientInput {
                operation: "bounding box",
                required: 1,
                actual: 0,
            })
    }

    fn point_grid(
        &self,
        bbox: &BoundingBox,
        cell_size_km: f64,
    ) -> Result<Vec<Point<f64>>, GeometryError> {
        bbox.validate()?;
        if !cell_size_km.is_finite() || cell_size_km <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                message: format!("grid cell size must be positive, got {cell_size_km} km"),
            });
        }

        let south_west = Point::new(bbox.min_lon, bbox.min_lat);
        let width_km = self.distance_km(south_west, Point::new(bbox.max_lon, bbox.min_lat));
        let height_km = self.distance_km(south_west, Point::new(bbox.min_lon, bbox.max_lat));

        let columns = Axis::new(bbox.min_lon, bbox.width(), width_km, cell_size_km);
        let rows = Axis::new(bbox.min_lat, bbox.height(), height_km, cell_size_km);

        let total = columns.len().saturating_mul(rows.len());
        if total > self.max_grid_points {
            return Err(GeometryError::GridTooLarge {
                points: total,
                limit: self.max_grid_points,
            });
        }

        let mut grid = Vec::with_capacity(total);
        for x in columns.positions() {
            for y in rows.positions() {
                grid.push(Point::new(x, y));
            }
        }
        Ok(grid)
    }

    fn voronoi(
        &self,
        sites: &[Point<f64>],
        clip: &BoundingBox,
    ) -> Result<Vec<Option<Polygon<f64>>>, GeometryError> {
        voronoi::clipped_cells(sites, clip)
    }

    fn area_m2(&self, geometry: &MultiPolygon<f64>) -> f64 {
        geometry.geodesic_area_unsigned()
    }
}

/// Grid coordinates along one axis, centred so the leftover margin is
/// split evenly on both sides. A zero-extent axis holds its single
/// coordinate.
struct Axis {
    first: f64,
    step: f64,
    count: usize,
}

impl Axis {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn new(start: f64, extent_deg: f64, extent_km: f64, cell_km: f64) -> Self {
        if extent_deg <= 0.0 || extent_km <= 0.0 {
            return Self {
                first: start,
                step: 0.0,
                count: 1,
            };
        }

        let step = cell_km / extent_km * extent_deg;
        let steps = (extent_deg / step).floor();
        let offset = steps.mul_add(-step, extent_deg) / 2.0;

        Self {
            first: start + offset,
            step,
            count: (steps as usize).saturating_add(1),
        }
    }

    const fn len(&self) -> usize {
        self.count
    }

    #[allow(clippy::cast_precision_loss)]
    fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|i| (i as f64).mul_add(self.step, self.first))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn engine() -> GeoEngine {
        GeoEngine::new()
    }

    fn relative_error(actual: f64, expected: f64) -> f64 {
        ((actual - expected) / expected).abs()
    }

    #[test]
    fn distance_is_symmetric_and_positive() {
        let a = Point::new(118.0, 36.8);
        let b = Point::new(118.01, 36.81);
        let ab = engine().distance_km(a, b);
        let ba = engine().distance_km(b, a);
        assert!(ab > 0.0);
        assert!(ab < 2.0);
        assert!(relative_error(ab, ba) < 1e-12);
        assert!(engine().distance_km(a, a).abs() < 1e-12);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = engine().distance_km(Point::new(118.0, 36.0), Point::new(118.0, 37.0));
        // Mean earth radius 6371.0088 km * pi / 180.
        assert!(relative_error(d, 6371.0088 * PI / 180.0) < 1e-6);
    }

    #[test]
    fn buffer_vertices_sit_on_radius() {
        let center = Point::new(118.05, 36.81);
        let polygon = engine().buffer(center, 0.5).unwrap();
        let ring = polygon.exterior();
        assert_eq!(ring.0.len(), DEFAULT_BUFFER_STEPS + 1);
        for coord in ring.coords() {
            let d = engine().distance_km(center, Point::from(*coord));
            assert!(relative_error(d, 0.5) < 1e-6, "vertex at {d} km");
        }
    }

    #[test]
    fn buffer_area_approximates_circle() {
        let polygon = engine().buffer(Point::new(118.0, 36.8), 1.0).unwrap();
        let area_km2 = engine().area_m2(&MultiPolygon::from(polygon)) / 1_000_000.0;
        assert!(relative_error(area_km2, PI) < 0.02, "area {area_km2}");
    }

    #[test]
    fn buffer_rejects_bad_radius() {
        let center = Point::new(118.0, 36.8);
        assert!(engine().buffer(center, 0.0).is_err());
        assert!(engine().buffer(center, -1.0).is_err());
        assert!(engine().buffer(center, f64::NAN).is_err());
        assert!(engine().buffer(Point::new(f64::NAN, 36.8), 1.0).is_err());
    }

    #[test]
    fn union_requires_two_polygons() {
        let one = engine().buffer(Point::new(118.0, 36.8), 1.0).unwrap();
        assert!(matches!(
            engine().union(&[]),
            Err(GeometryError::InsufficientInput { actual: 0, .. })
        ));
        assert!(matches!(
            engine().union(&[one]),
            Err(GeometryError::InsufficientInput { actual: 1, .. })
        ));
    }

    #[test]
    fn union_of_disjoint_buffers_adds_areas() {
        let a = engine().buffer(Point::new(118.0, 36.8), 1.0).unwrap();
        let b = engine().buffer(Point::new(118.5, 36.8), 1.0).unwrap();
        let separate = engine().area_m2(&MultiPolygon::from(a.clone()))
            + engine().area_m2(&MultiPolygon::from(b.clone()));
        let unioned = engine().union(&[a, b]).unwrap();
        assert_eq!(unioned.0.len(), 2);
        assert!(relative_error(engine().area_m2(&unioned), separate) < 1e-4);
    }

    #[test]
    fn union_of_overlapping_buffers_is_smaller_than_sum() {
        let a = engine().buffer(Point::new(118.0, 36.8), 1.0).unwrap();
        let b = engine().buffer(Point::new(118.005, 36.8), 1.0).unwrap();
        let c = engine().buffer(Point::new(118.01, 36.8), 1.0).unwrap();
        let single = engine().area_m2(&MultiPolygon::from(a.clone()));
        let unioned = engine().union(&[a, b, c]).unwrap();
        assert_eq!(unioned.0.len(), 1);
        let area = engine().area_m2(&unioned);
        assert!(area > single);
        assert!(area < 3.0 * single);
    }

    #[test]
    fn bounding_box_of_points() {
        let points = [
            Point::new(118.0, 36.9),
            Point::new(117.9, 36.7),
            Point::new(118.2, 36.8),
        ];
        let bbox = engine().bounding_box(&points).unwrap();
        assert_eq!(bbox, BoundingBox::new(117.9, 36.7, 118.2, 36.9).unwrap());
        assert!(matches!(
            engine().bounding_box(&[]),
            Err(GeometryError::InsufficientInput { .. })
        ));
    }

    #[test]
    fn point_grid_stays_inside_bbox() {
        let bbox = BoundingBox::new(118.0, 36.8, 118.1, 36.9).unwrap();
        let grid = engine().point_grid(&bbox, 1.0).unwrap();
        assert!(grid.len() > 50);
        for p in &grid {
            assert!(bbox.contains(*p), "{p:?} outside grid bbox");
        }
    }

    #[test]
    fn point_grid_spacing_matches_cell_size() {
        let bbox = BoundingBox::new(118.0, 36.8, 118.1, 36.9).unwrap();
        let grid = engine().point_grid(&bbox, 1.0).unwrap();
        // First two points share a column and are one cell apart north-south.
        let d = engine().distance_km(grid[0], grid[1]);
        assert!(relative_error(d, 1.0) < 1e-3, "spacing {d}");
    }

    #[test]
    fn point_grid_of_degenerate_bbox_is_single_point() {
        let bbox = BoundingBox::new(118.0, 36.8, 118.0, 36.8).unwrap();
        let grid = engine().point_grid(&bbox, 0.5).unwrap();
        assert_eq!(grid, vec![Point::new(118.0, 36.8)]);
    }

    #[test]
    fn point_grid_respects_limit() {
        let bbox = BoundingBox::new(117.5, 36.0, 118.5, 37.5).unwrap();
        let limited = engine().with_max_grid_points(100);
        assert!(matches!(
            limited.point_grid(&bbox, 0.01),
            Err(GeometryError::GridTooLarge { limit: 100, .. })
        ));
        assert!(engine().point_grid(&bbox, 0.0).is_err());
    }
}
