//! Fixed and parametric kernels used by the detectors.
//!
//! Every kernel is odd-sized and centre-anchored. The Roberts Cross pair is
//! natively 2×2; it is embedded into 3×3 so that its anchor (the top-left
//! tap of the 2×2) sits at the centre.
use std::f64::consts::E;

use crate::error::{EdgeError, Result};

/// A small centre-anchored 2D weight matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

/// Horizontal/vertical kernel pair of a gradient operator.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelPair {
    pub x: Kernel,
    pub y: Kernel,
}

impl Kernel {
    /// Fails unless both dimensions are odd and positive and `weights`
    /// holds exactly `rows * cols` values.
    pub fn new(rows: usize, cols: usize, weights: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EdgeError::InvalidInput("kernel is empty".to_string()));
        }
        if rows % 2 == 0 || cols % 2 == 0 {
            return Err(EdgeError::InvalidInput(format!(
                "kernel dimensions must be odd, got {rows}x{cols}"
            )));
        }
        if weights.len() != rows * cols {
            return Err(EdgeError::InvalidInput(format!(
                "kernel has {} weights, expected {}",
                weights.len(),
                rows * cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != n_cols) {
            return Err(EdgeError::InvalidInput("kernel rows are ragged".to_string()));
        }
        Self::new(rows.len(), n_cols, rows.concat())
    }

    // constants below are odd by construction
    fn fixed<const N: usize>(taps: &[[f64; N]; N]) -> Self {
        Self {
            rows: N,
            cols: N,
            weights: taps.iter().flatten().copied().collect(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[col + row * self.cols]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

const GAUSSIAN_5X5: [[f64; 5]; 5] = [
    [2.0 / 159.0, 4.0 / 159.0, 5.0 / 159.0, 4.0 / 159.0, 2.0 / 159.0],
    [4.0 / 159.0, 9.0 / 159.0, 12.0 / 159.0, 9.0 / 159.0, 4.0 / 159.0],
    [5.0 / 159.0, 12.0 / 159.0, 15.0 / 159.0, 12.0 / 159.0, 5.0 / 159.0],
    [4.0 / 159.0, 9.0 / 159.0, 12.0 / 159.0, 9.0 / 159.0, 4.0 / 159.0],
    [2.0 / 159.0, 4.0 / 159.0, 5.0 / 159.0, 4.0 / 159.0, 2.0 / 159.0],
];

const GAUSSIAN_5X5_LARGE: [[f64; 5]; 5] = [
    [1.0 / 256.0, 4.0 / 256.0, 6.0 / 256.0, 4.0 / 256.0, 1.0 / 256.0],
    [4.0 / 256.0, 16.0 / 256.0, 24.0 / 256.0, 16.0 / 256.0, 4.0 / 256.0],
    [6.0 / 256.0, 24.0 / 256.0, 36.0 / 256.0, 24.0 / 256.0, 6.0 / 256.0],
    [4.0 / 256.0, 16.0 / 256.0, 24.0 / 256.0, 16.0 / 256.0, 4.0 / 256.0],
    [1.0 / 256.0, 4.0 / 256.0, 6.0 / 256.0, 4.0 / 256.0, 1.0 / 256.0],
];

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

const PREWITT_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];
const PREWITT_Y: [[f64; 3]; 3] = [[1.0, 1.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -1.0, -1.0]];

const ROBERTS_X: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];
const ROBERTS_Y: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];

const LAPLACIAN: [[f64; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];

/// The default 5×5 smoothing kernel (σ ≈ 1.4), weights /159.
pub fn gaussian_5x5() -> Kernel {
    Kernel::fixed(&GAUSSIAN_5X5)
}

/// Binomial 5×5 smoothing kernel, weights /256. Smooths harder than [`gaussian_5x5`].
pub fn gaussian_5x5_large() -> Kernel {
    Kernel::fixed(&GAUSSIAN_5X5_LARGE)
}

/// Create a normalized `size`×`size` gaussian kernel.
///
/// # Arguments
///
/// * `size` - Side length, must be odd.
/// * `sigma` - Standard deviation, must be finite and positive.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Result<Kernel> {
    if size % 2 == 0 {
        return Err(EdgeError::InvalidInput(format!(
            "gaussian kernel size must be odd, got {size}"
        )));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(EdgeError::InvalidInput(format!(
            "gaussian sigma must be positive, got {sigma}"
        )));
    }
    let half = (size / 2) as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity(size * size);
    for i in -half..=half {
        for j in -half..=half {
            let d2 = (i * i + j * j) as f64;
            weights.push(E.powf(-d2 / two_sigma_sq));
        }
    }
    let sum: f64 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= sum);
    Kernel::new(size, size, weights)
}

/// Box kernel whose `rows * cols` equal weights sum to one.
pub fn averaging_kernel(rows: usize, cols: usize) -> Result<Kernel> {
    let entry = 1.0 / (rows * cols) as f64;
    Kernel::new(rows, cols, vec![entry; rows * cols])
}

pub fn sobel() -> KernelPair {
    KernelPair {
        x: Kernel::fixed(&SOBEL_X),
        y: Kernel::fixed(&SOBEL_Y),
    }
}

pub fn prewitt() -> KernelPair {
    KernelPair {
        x: Kernel::fixed(&PREWITT_X),
        y: Kernel::fixed(&PREWITT_Y),
    }
}

pub fn roberts_cross() -> KernelPair {
    KernelPair {
        x: Kernel::fixed(&ROBERTS_X),
        y: Kernel::fixed(&ROBERTS_Y),
    }
}

/// 8-neighbour Laplacian, both axes in one kernel.
pub fn laplacian() -> Kernel {
    Kernel::fixed(&LAPLACIAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fixed_gaussians_are_normalized() {
        assert_abs_diff_eq!(gaussian_5x5().sum(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gaussian_5x5_large().sum(), 1.0, epsilon = 1e-12);
        assert_eq!(gaussian_5x5().weight(2, 2), 15.0 / 159.0);
    }

    #[test]
    fn parametric_gaussian() {
        for (size, sigma) in [(1, 0.5), (3, 0.8), (5, 1.4), (7, 3.0), (11, 0.3)] {
            let kernel = gaussian_kernel(size, sigma).unwrap();
            assert_eq!((kernel.rows(), kernel.cols()), (size, size));
            assert_abs_diff_eq!(kernel.sum(), 1.0, epsilon = 1e-9);
        }

        let kernel = gaussian_kernel(3, 1.0).unwrap();
        // symmetric, peak at the centre
        assert_abs_diff_eq!(kernel.weight(0, 0), kernel.weight(2, 2), epsilon = 1e-15);
        assert_abs_diff_eq!(kernel.weight(0, 1), kernel.weight(1, 0), epsilon = 1e-15);
        assert!(kernel.weight(1, 1) > kernel.weight(0, 1));
        assert!(kernel.weight(0, 1) > kernel.weight(0, 0));
        // exp(-1/2) ratio between the centre and a 4-neighbour
        assert_abs_diff_eq!(
            kernel.weight(0, 1) / kernel.weight(1, 1),
            (-0.5f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn parametric_gaussian_rejects_bad_parameters() {
        assert!(matches!(gaussian_kernel(4, 1.0), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(gaussian_kernel(0, 1.0), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(gaussian_kernel(3, 0.0), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(gaussian_kernel(3, -1.0), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(gaussian_kernel(3, f64::NAN), Err(EdgeError::InvalidInput(_))));
    }

    #[test]
    fn kernel_validation() {
        assert!(matches!(Kernel::new(2, 2, vec![0.0; 4]), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(Kernel::new(0, 3, vec![]), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(Kernel::new(3, 3, vec![0.0; 8]), Err(EdgeError::InvalidInput(_))));
        assert!(matches!(
            Kernel::from_rows(&[vec![1.0, 2.0, 3.0], vec![1.0]]),
            Err(EdgeError::InvalidInput(_))
        ));
        assert!(Kernel::from_rows(&[vec![1.0, 2.0, 3.0]]).is_ok());
    }

    #[test]
    fn gradient_pairs_are_zero_sum() {
        for pair in [sobel(), prewitt(), roberts_cross()] {
            assert_eq!(pair.x.sum(), 0.0);
            assert_eq!(pair.y.sum(), 0.0);
            assert_eq!((pair.x.rows(), pair.x.cols()), (3, 3));
        }
        assert_eq!(laplacian().sum(), 0.0);
    }

    #[test]
    fn averaging() {
        let kernel = averaging_kernel(3, 5).unwrap();
        assert_abs_diff_eq!(kernel.sum(), 1.0, epsilon = 1e-12);
        assert!(averaging_kernel(2, 3).is_err());
    }
}
