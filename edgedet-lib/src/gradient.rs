//! Gradient magnitude and quantized direction from a horizontal/vertical
//! kernel pair.
//!
//! Directions use a y-up frame: the vertical kernels respond positively when
//! intensity grows towards row 0.
use serde::{Deserialize, Serialize};

use crate::convolution::convolve;
use crate::error::Result;
use crate::grid::Grid;
use crate::kernels::KernelPair;
use crate::padding::Padding;

/// How `Gx` and `Gy` combine into a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    /// `|Gx| + |Gy|`
    L1,
    /// `sqrt(Gx² + Gy²)`
    #[default]
    L2,
}

impl Norm {
    /// Magnitude truncated towards zero.
    #[inline]
    pub fn magnitude(self, gx: i32, gy: i32) -> i32 {
        let (x, y) = (gx as f64, gy as f64);
        match self {
            Norm::L1 => (x.abs() + y.abs()) as i32,
            Norm::L2 => (x.powi(2) + y.powi(2)).sqrt() as i32,
        }
    }
}

/// Gradient orientation quantized to the four canonical axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 0°: intensity changes left to right.
    Horizontal,
    /// 45°: up-right / down-left.
    Diagonal45,
    /// 90°: intensity changes top to bottom.
    Vertical,
    /// 135°: up-left / down-right.
    Diagonal135,
}

impl Direction {
    /// Quantize `atan2(gy, gx)` to the nearest of 0°, 45°, 90° and 135°.
    pub fn from_components(gx: i32, gy: i32) -> Self {
        let angle = (gy as f64).atan2(gx as f64).to_degrees().rem_euclid(180.0);
        if !(22.5..157.5).contains(&angle) {
            Direction::Horizontal
        } else if angle < 67.5 {
            Direction::Diagonal45
        } else if angle < 112.5 {
            Direction::Vertical
        } else {
            Direction::Diagonal135
        }
    }

    /// `(row, col)` offsets of the neighbours behind and ahead along the
    /// gradient.
    #[inline]
    pub fn neighbor_offsets(self) -> [(isize, isize); 2] {
        match self {
            Direction::Horizontal => [(0, -1), (0, 1)],
            Direction::Vertical => [(-1, 0), (1, 0)],
            Direction::Diagonal45 => [(1, -1), (-1, 1)],
            Direction::Diagonal135 => [(1, 1), (-1, -1)],
        }
    }
}

/// Per-pixel gradient buffers, all aligned with the input grid.
#[derive(Debug, Clone)]
pub struct Gradient {
    pub gx: Grid<i32>,
    pub gy: Grid<i32>,
    pub magnitude: Grid<i32>,
    pub direction: Grid<Direction>,
}

/// Convolve `smoothed` with both kernels of `pair` and derive magnitude and
/// direction per pixel.
pub fn compute_gradient(
    smoothed: &Grid<i32>,
    pair: &KernelPair,
    norm: Norm,
    padding: Padding,
) -> Result<Gradient> {
    let gx = convolve(smoothed, &pair.x, padding)?;
    let gy = convolve(smoothed, &pair.y, padding)?;
    let magnitude = gx.zip_map(&gy, |&x, &y| norm.magnitude(x, y))?;
    let direction = gx.zip_map(&gy, |&x, &y| Direction::from_components(x, y))?;
    Ok(Gradient {
        gx,
        gy,
        magnitude,
        direction,
    })
}
