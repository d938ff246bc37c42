//! Lloyd's k-means over points in D-dimensional real space.
//!
//! Points are passed as one flat row-major buffer with a `dim` stride, so a
//! magnitude grid can be clustered without a per-point allocation.
//!
//! Seeding is deterministic: the first `k` distinct points in input order
//! become the initial centroids. When fewer than `k` distinct points exist
//! the seeds cycle through the distinct ones, so exactly `k` centroids are
//! always produced (some may coincide).
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, Result};

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub k: usize,
    /// Upper bound on Lloyd iterations.
    pub iterations: usize,
    /// Early-stop threshold on per-centroid movement.
    pub epsilon: f64,
    /// Whether `epsilon` is honoured at all.
    pub use_epsilon: bool,
}

impl Default for KMeansConfig {
    /// The parameters used for automatic threshold calibration.
    fn default() -> Self {
        Self {
            k: 3,
            iterations: 10,
            epsilon: 0.01,
            use_epsilon: true,
        }
    }
}

impl KMeansConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(EdgeError::InvalidConfiguration(
                "k-means needs at least one cluster".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(EdgeError::InvalidConfiguration(
                "k-means needs at least one iteration".to_string(),
            ));
        }
        if self.use_epsilon && !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(EdgeError::InvalidConfiguration(format!(
                "k-means epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// `k * dim` centroid coordinates, flat, in seed order (not sorted).
    pub centroids: Vec<f64>,
    pub dim: usize,
    /// Cluster index of every input point after the last assignment step.
    pub assignments: Vec<usize>,
    /// Lloyd iterations actually run.
    pub iterations: usize,
}

impl Clustering {
    pub fn k(&self) -> usize {
        self.centroids.len() / self.dim
    }

    /// Coordinates of centroid `i`.
    pub fn centroid(&self, i: usize) -> &[f64] {
        &self.centroids[i * self.dim..(i + 1) * self.dim]
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[f64], dim: usize) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, centroid) in centroids.chunks_exact(dim).enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn seed(points: &[f64], dim: usize, k: usize) -> Vec<f64> {
    let mut distinct: Vec<f64> = Vec::with_capacity(k * dim);
    for point in points.chunks_exact(dim) {
        if !distinct.chunks_exact(dim).any(|seen| seen == point) {
            distinct.extend_from_slice(point);
            if distinct.len() == k * dim {
                return distinct;
            }
        }
    }
    let found = distinct.len() / dim;
    let mut seeds = Vec::with_capacity(k * dim);
    for i in 0..k {
        let at = (i % found) * dim;
        seeds.extend_from_slice(&distinct[at..at + dim]);
    }
    seeds
}

/// Cluster the `points.len() / dim` points of a flat row-major buffer into
/// `config.k` groups.
///
/// Clusters that receive no points keep their previous centroid.
pub fn cluster(points: &[f64], dim: usize, config: &KMeansConfig) -> Result<Clustering> {
    config.validate()?;
    if dim == 0 {
        return Err(EdgeError::InvalidInput(
            "k-means points must have at least one coordinate".to_string(),
        ));
    }
    if points.is_empty() {
        return Err(EdgeError::InvalidInput(
            "k-means needs at least one point".to_string(),
        ));
    }
    if points.len() % dim != 0 {
        return Err(EdgeError::InvalidInput(format!(
            "{} coordinates do not split into points of dimension {dim}",
            points.len()
        )));
    }
    if points.iter().any(|v| !v.is_finite()) {
        return Err(EdgeError::InvalidInput(
            "k-means points must be finite".to_string(),
        ));
    }

    let k = config.k;
    let mut centroids = seed(points, dim, k);
    let mut assignments = vec![0usize; points.len() / dim];
    let mut sums = vec![0.0; k * dim];
    let mut counts = vec![0usize; k];
    let mut iterations = 0;
    while iterations < config.iterations {
        iterations += 1;

        sums.fill(0.0);
        counts.fill(0);
        for (point, assignment) in points.chunks_exact(dim).zip(assignments.iter_mut()) {
            let best = nearest(point, &centroids, dim);
            *assignment = best;
            counts[best] += 1;
            sums[best * dim..(best + 1) * dim]
                .iter_mut()
                .zip(point)
                .for_each(|(s, v)| *s += v);
        }

        let mut max_shift: f64 = 0.0;
        for ((centroid, sum), &count) in centroids
            .chunks_exact_mut(dim)
            .zip(sums.chunks_exact(dim))
            .zip(&counts)
        {
            if count == 0 {
                continue;
            }
            let mut shift = 0.0;
            for (c, s) in centroid.iter_mut().zip(sum) {
                let updated = s / count as f64;
                shift += (updated - *c) * (updated - *c);
                *c = updated;
            }
            max_shift = max_shift.max(shift.sqrt());
        }
        trace!("k-means iteration {iterations}: max centroid shift {max_shift:.4}");

        if config.use_epsilon && max_shift < config.epsilon {
            break;
        }
    }

    Ok(Clustering {
        centroids,
        dim,
        assignments,
        iterations,
    })
}

/// One-dimensional clustering returning the `k` centroid values.
pub fn cluster_1d(values: &[f64], config: &KMeansConfig) -> Result<Vec<f64>> {
    Ok(cluster(values, 1, config)?.centroids)
}
