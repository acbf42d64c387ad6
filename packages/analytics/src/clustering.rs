//! k-means partition of record locations.
//!
//! Runs Lloyd's algorithm on planar `(longitude, latitude)` coordinates.
//! Initialization is deterministic: the first `k` distinct locations in
//! input order seed the centroids, so the same input always yields the
//! same partition.

use std::collections::BTreeSet;

use emotion_map_analytics_models::{ClusterAssignment, ClusterSummary};
use emotion_map_emotion_models::EmotionRecord;

use crate::AnalyticsError;

/// Parameters for k-means clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmeansParams {
    /// Number of clusters (default: 5).
    pub k: usize,
    /// Maximum Lloyd iterations (default: 100).
    pub max_iterations: usize,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            k: 5,
            max_iterations: 100,
        }
    }
}

type Coordinate = [f64; 2];

/// Partitions the valid records into `k` spatial clusters.
///
/// Every valid record is tagged with exactly one cluster id in `[0, k)`;
/// invalid records map to `None`. Iteration stops once no assignment
/// changes or after `max_iterations` rounds. A cluster that loses all its
/// members keeps its previous centroid.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidParameter`] if `k` or `max_iterations` is zero
/// * [`AnalyticsError::InsufficientInput`] if there are fewer distinct
///   locations than `k`
pub fn kmeans_cluster(
    records: &[EmotionRecord],
    params: &KmeansParams,
) -> Result<ClusterAssignment, AnalyticsError> {
    if params.k == 0 || params.max_iterations == 0 {
        return Err(AnalyticsError::InvalidParameter {
            message: format!(
                "k-means needs positive k and max_iterations, got k={} max_iterations={}",
                params.k, params.max_iterations
            ),
        });
    }
    let k = params.k;

    let valid: Vec<(usize, Coordinate, f64)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_valid())
        .map(|(i, r)| (i, [r.longitude, r.latitude], r.emotion_value))
        .collect();
    let dropped = records.len() - valid.len();
    if dropped > 0 {
        log::debug!("kmeans_cluster: dropped {dropped} invalid record(s)");
    }

    let mut centroids = initial_centroids(&valid, k);
    if centroids.len() < k {
        return Err(AnalyticsError::InsufficientInput {
            operation: "kmeans_cluster",
            required: k,
            actual: centroids.len(),
        });
    }

    let mut labels: Vec<usize> = valid.iter().map(|(_, c, _)| nearest(&centroids, *c)).collect();
    let mut iterations = 1;

    while iterations < params.max_iterations {
        let mut sums = vec![[0.0_f64; 2]; k];
        let mut counts = vec![0_usize; k];
        for ((_, c, _), &label) in valid.iter().zip(&labels) {
            sums[label][0] += c[0];
            sums[label][1] += c[1];
            counts[label] += 1;
        }
        for (centroid, (sum, &count)) in centroids.iter_mut().zip(sums.iter().zip(&counts)) {
            if count > 0 {
                #[allow(clippy::cast_precision_loss)]
                let n = count as f64;
                *centroid = [sum[0] / n, sum[1] / n];
            }
        }

        let next: Vec<usize> = valid.iter().map(|(_, c, _)| nearest(&centroids, *c)).collect();
        iterations += 1;
        if next == labels {
            break;
        }
        labels = next;
    }

    log::debug!("kmeans_cluster: k={k} n={} after {iterations} iteration(s)", valid.len());

    let mut assignments = vec![None; records.len()];
    let mut members: Vec<Vec<f64>> = vec![Vec::new(); k];
    for ((index, _, emotion), &label) in valid.iter().zip(&labels) {
        assignments[*index] = Some(label);
        members[label].push(*emotion);
    }

    let clusters = centroids
        .iter()
        .zip(&members)
        .enumerate()
        .map(|(cluster_id, (centroid, values))| summarize(cluster_id, *centroid, values))
        .collect();

    Ok(ClusterAssignment {
        k,
        assignments,
        clusters,
        iterations,
    })
}

/// First `k` distinct coordinates in input order.
fn initial_centroids(valid: &[(usize, Coordinate, f64)], k: usize) -> Vec<Coordinate> {
    let mut seen = BTreeSet::new();
    valid
        .iter()
        .map(|(_, c, _)| *c)
        .filter(|c| seen.insert(((c[0] + 0.0).to_bits(), (c[1] + 0.0).to_bits())))
        .take(k)
        .collect()
}

/// Index of the closest centroid; ties go to the lowest index.
fn nearest(centroids: &[Coordinate], point: Coordinate) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let dx = point[0] - c[0];
        let dy = point[1] - c[1];
        let distance = dx.mul_add(dx, dy * dy);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

#[allow(clippy::cast_precision_loss)]
fn summarize(cluster_id: usize, centroid: Coordinate, values: &[f64]) -> ClusterSummary {
    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std_emotion = mean.filter(|_| count > 1).map(|m| {
        let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
        (ss / (count - 1) as f64).sqrt()
    });
    ClusterSummary {
        cluster_id,
        centroid_longitude: centroid[0],
        centroid_latitude: centroid[1],
        count,
        mean_emotion: mean,
        std_emotion,
    }
}
