//! Double thresholding and connectivity-based edge linking.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, Result};
use crate::grid::Grid;
use crate::kmeans::{cluster_1d, KMeansConfig};

/// Where the low/high hysteresis thresholds come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Thresholds {
    /// Derive both from a 3-means clustering of the suppressed magnitudes.
    #[default]
    Auto,
    /// Caller-supplied, `low <= high`.
    Explicit { low: u8, high: u8 },
}

impl Thresholds {
    /// Checked constructor: `0 <= low <= high <= 255`.
    pub fn explicit(low: i32, high: i32) -> Result<Self> {
        if !(0..=255).contains(&low) || !(0..=255).contains(&high) {
            return Err(EdgeError::InvalidConfiguration(format!(
                "thresholds must lie in [0, 255], got low={low} high={high}"
            )));
        }
        let thresholds = Thresholds::Explicit {
            low: low as u8,
            high: high as u8,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Thresholds::Explicit { low, high } if low > high => {
                Err(EdgeError::InvalidConfiguration(format!(
                    "low threshold {low} exceeds high threshold {high}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Per-pixel strong/weak classification; the two masks are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeClassification {
    pub weak: Grid<bool>,
    pub strong: Grid<bool>,
}

impl EdgeClassification {
    /// Row-major indices of strong pixels, the seeds for linking.
    pub fn strong_indices(&self) -> Vec<usize> {
        self.strong
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
            .collect()
    }

    pub fn weak_indices(&self) -> Vec<usize> {
        self.weak
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, &w)| w.then_some(i))
            .collect()
    }
}

/// Strong if `magnitude >= high`, weak if `low <= magnitude < high`.
///
/// Zero magnitudes (flat or suppressed pixels) are never candidates.
pub fn classify(magnitude: &Grid<i32>, low: i32, high: i32) -> EdgeClassification {
    let strong = magnitude.map(|&m| m > 0 && m >= high);
    let weak = magnitude.map(|&m| m > 0 && m >= low && m < high);
    EdgeClassification { weak, strong }
}

/// Output of [`link_edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedEdges {
    pub edges: Grid<bool>,
    /// Components that reached `min_edge_size`.
    pub accepted: usize,
    /// Components discarded for being too small.
    pub rejected: usize,
}

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Grow an 8-connected component from every unvisited strong pixel through
/// strong or weak pixels, keeping components of at least `min_edge_size`
/// pixels.
///
/// Depth-first with an explicit stack; neighbours are pushed in reverse so
/// they are visited in `NEIGHBORS` order. Visited marks are shared across
/// seeds, so each pixel is expanded at most once.
pub fn link_edges(classification: &EdgeClassification, min_edge_size: usize) -> LinkedEdges {
    let (rows, cols) = classification.strong.dims();
    let strong = classification.strong.as_slice();
    let weak = classification.weak.as_slice();
    let mut marked = vec![false; rows * cols];
    let mut edges = classification.strong.map(|_| false);
    let mut stack: Vec<(isize, isize)> = Vec::new();
    let mut component: Vec<usize> = Vec::new();
    let (mut accepted, mut rejected) = (0, 0);

    for seed in classification.strong_indices() {
        if marked[seed] {
            continue;
        }
        stack.push(((seed / cols) as isize, (seed % cols) as isize));
        while let Some((r, c)) = stack.pop() {
            if r < 0 || c < 0 || r as usize >= rows || c as usize >= cols {
                continue;
            }
            let index = c as usize + r as usize * cols;
            if marked[index] {
                continue;
            }
            marked[index] = true;
            if strong[index] || weak[index] {
                component.push(index);
                for &(dr, dc) in NEIGHBORS.iter().rev() {
                    stack.push((r + dr, c + dc));
                }
            }
        }

        if component.len() >= min_edge_size {
            accepted += 1;
            let out = edges.as_mut_slice();
            for &index in &component {
                out[index] = true;
            }
        } else {
            rejected += 1;
        }
        component.clear();
    }

    debug!("edge linking: {accepted} components kept, {rejected} below {min_edge_size} pixels");
    LinkedEdges {
        edges,
        accepted,
        rejected,
    }
}

/// Cluster all magnitudes into three groups and return the two lowest
/// centroids, truncated, as `(low, high)`.
pub fn auto_thresholds(magnitude: &Grid<i32>) -> Result<(i32, i32)> {
    let values: Vec<f64> = magnitude.as_slice().iter().map(|&m| m as f64).collect();
    let mut centroids = cluster_1d(&values, &KMeansConfig::default())?;
    centroids.sort_by(f64::total_cmp);
    match centroids.as_slice() {
        [low, high, ..] => Ok((*low as i32, *high as i32)),
        _ => Err(EdgeError::ComputationFailure(format!(
            "expected 3 centroids, got {}",
            centroids.len()
        ))),
    }
}

/// Classify then link, resolving `thresholds` first.
pub fn hysteresis(
    magnitude: &Grid<i32>,
    thresholds: Thresholds,
    min_edge_size: usize,
) -> Result<(EdgeClassification, LinkedEdges, (i32, i32))> {
    thresholds.validate()?;
    let (low, high) = match thresholds {
        Thresholds::Explicit { low, high } => (low as i32, high as i32),
        Thresholds::Auto => auto_thresholds(magnitude)?,
    };
    debug!("hysteresis thresholds: low={low} high={high}");
    let classification = classify(magnitude, low, high);
    let linked = link_edges(&classification, min_edge_size);
    Ok((classification, linked, (low, high)))
}
