//! Clipped Voronoi cells by successive half-plane intersection.
//!
//! Each cell starts as the clip rectangle and is cut by the perpendicular
//! bisector between its site and every other site, visited nearest-first
//! through an R-tree. Once the next site is farther than twice the
//! distance from the site to its furthest remaining cell vertex, no
//! further bisector can touch the cell and the walk stops early.
//!
//! Cells are computed in the planar longitude/latitude plane, which is
//! what web-map Voronoi layers render.

use std::collections::BTreeSet;

use geo::{LineString, Point, Polygon};
use rstar::RTree;

use crate::{BoundingBox, GeometryError};

type Vertex = [f64; 2];

/// Computes the clipped Voronoi cell of every site.
///
/// Output is parallel to `sites`. A cell clipped away entirely yields
/// `None`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateInput`] if two sites share exact
/// coordinates, or [`GeometryError::InvalidParameter`] if a site is not
/// finite or the clip box is malformed.
pub fn clipped_cells(
    sites: &[Point<f64>],
    clip: &BoundingBox,
) -> Result<Vec<Option<Polygon<f64>>>, GeometryError> {
    clip.validate()?;

    let mut seen = BTreeSet::new();
    for site in sites {
        if !site.x().is_finite() || !site.y().is_finite() {
            return Err(GeometryError::InvalidParameter {
                message: format!("Voronoi site is not finite: ({}, {})", site.x(), site.y()),
            });
        }
        if !seen.insert(((site.x() + 0.0).to_bits(), (site.y() + 0.0).to_bits())) {
            return Err(GeometryError::DegenerateInput {
                message: format!(
                    "duplicate Voronoi site at ({}, {}); collapse duplicates first",
                    site.x(),
                    site.y()
                ),
            });
        }
    }

    let tree = RTree::bulk_load(sites.iter().map(|p| [p.x(), p.y()]).collect::<Vec<Vertex>>());
    let frame = [
        [clip.min_lon, clip.min_lat],
        [clip.max_lon, clip.min_lat],
        [clip.max_lon, clip.max_lat],
        [clip.min_lon, clip.max_lat],
    ];

    Ok(sites
        .iter()
        .map(|site| cell_for_site(&tree, [site.x(), site.y()], &frame))
        .collect())
}

fn cell_for_site(tree: &RTree<Vertex>, site: Vertex, frame: &[Vertex]) -> Option<Polygon<f64>> {
    let mut cell = frame.to_vec();

    for other in tree.nearest_neighbor_iter(&site) {
        if *other == site {
            continue;
        }
        let reach = cell
            .iter()
            .map(|v| squared_distance(*v, site))
            .fold(0.0_f64, f64::max);
        // Bisector lies at half the site separation: stop once it is past
        // every vertex (compare squared: (d/2)^2 > reach).
        if squared_distance(*other, site) > 4.0 * reach {
            break;
        }
        cell = clip_to_bisector(&cell, site, *other);
        if cell.len() < 3 {
            return None;
        }
    }

    if cell.len() < 3 {
        return None;
    }

    let ring: LineString<f64> = cell.into_iter().map(|[x, y]| (x, y)).collect();
    Some(Polygon::new(ring, vec![]))
}

/// Keeps the part of a convex polygon closer to `site` than to `other`.
fn clip_to_bisector(polygon: &[Vertex], site: Vertex, other: Vertex) -> Vec<Vertex> {
    let normal = [other[0] - site[0], other[1] - site[1]];
    let mid = [(site[0] + other[0]) / 2.0, (site[1] + other[1]) / 2.0];
    let side = |p: Vertex| (p[0] - mid[0]).mul_add(normal[0], (p[1] - mid[1]) * normal[1]);

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let d_current = side(current);
        let d_next = side(next);

        if d_current <= 0.0 {
            out.push(current);
        }
        if (d_current < 0.0 && d_next > 0.0) || (d_current > 0.0 && d_next < 0.0) {
            let t = d_current / (d_current - d_next);
            out.push([
                t.mul_add(next[0] - current[0], current[0]),
                t.mul_add(next[1] - current[1], current[1]),
            ]);
        }
    }
    out
}

fn squared_distance(a: Vertex, b: Vertex) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx.mul_add(dx, dy * dy)
}
