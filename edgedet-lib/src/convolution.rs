use log::trace;

use crate::error::{EdgeError, Result};
use crate::grid::Grid;
use crate::kernels::Kernel;
use crate::padding::Padding;

/// Correlate `grid` with a centre-anchored `kernel`.
///
/// Output has the same dimensions as `grid`; out-of-bounds neighbours are
/// resolved by `padding`. Each weighted sum is rounded half away from zero.
pub fn convolve<T>(grid: &Grid<T>, kernel: &Kernel, padding: Padding) -> Result<Grid<i32>>
where
    T: Copy + Into<f64>,
{
    if grid.is_empty() {
        return Err(EdgeError::InvalidInput("cannot convolve an empty grid".to_string()));
    }
    let (rows, cols) = grid.dims();
    let (k_rows, k_cols) = (kernel.rows(), kernel.cols());
    let anchor_r = (k_rows / 2) as isize;
    let anchor_c = (k_cols / 2) as isize;
    trace!(
        "convolve {rows}x{cols} with {k_rows}x{k_cols} kernel, padding {:?}",
        padding
    );

    let src = grid.as_slice();
    let mut out = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut val = 0.0;
            for i in 0..k_rows {
                let Some(rr) = padding.map_index(r as isize + i as isize - anchor_r, rows) else {
                    continue;
                };
                for j in 0..k_cols {
                    let Some(cc) = padding.map_index(c as isize + j as isize - anchor_c, cols)
                    else {
                        continue;
                    };
                    val += kernel.weight(i, j) * src[cc + rr * cols].into();
                }
            }
            out.push(val.round() as i32);
        }
    }
    Grid::new(rows, cols, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{averaging_kernel, gaussian_5x5, sobel};

    fn sample() -> Grid<u8> {
        Grid::from_rows(vec![
            vec![1, 2, 3, 4],
            vec![5, 6, 7, 8],
            vec![9, 10, 11, 12],
        ])
        .unwrap()
    }

    #[test]
    fn keeps_dimensions_under_every_padding() {
        let grid = sample();
        for padding in [
            Padding::Zeros,
            Padding::Same,
            Padding::Symmetric,
            Padding::Circular,
        ] {
            for kernel in [gaussian_5x5(), sobel().x, Kernel::new(1, 1, vec![1.0]).unwrap()] {
                let out = convolve(&grid, &kernel, padding).unwrap();
                assert_eq!(out.dims(), grid.dims());
            }
            let tall = Kernel::new(7, 1, vec![1.0; 7]).unwrap();
            assert_eq!(convolve(&grid, &tall, padding).unwrap().dims(), (3, 4));
        }
    }

    #[test]
    fn identity_kernel() {
        let grid = sample();
        let identity = Kernel::new(3, 3, vec![0., 0., 0., 0., 1., 0., 0., 0., 0.]).unwrap();
        let out = convolve(&grid, &identity, Padding::Zeros).unwrap();
        assert_eq!(out, grid.map(|&v| v as i32));
    }

    #[test]
    fn padding_policies_at_the_corner() {
        let grid = sample();
        // sum of the 3x3 neighbourhood around (0, 0)
        let ones = Kernel::new(3, 3, vec![1.0; 9]).unwrap();
        let zeros = convolve(&grid, &ones, Padding::Zeros).unwrap();
        assert_eq!(zeros[(0, 0)], 1 + 2 + 5 + 6);
        let same = convolve(&grid, &ones, Padding::Same).unwrap();
        assert_eq!(same[(0, 0)], 1 + 1 + 2 + 1 + 1 + 2 + 5 + 5 + 6);
        let symmetric = convolve(&grid, &ones, Padding::Symmetric).unwrap();
        assert_eq!(symmetric[(0, 0)], 6 + 5 + 6 + 2 + 1 + 2 + 6 + 5 + 6);
        let circular = convolve(&grid, &ones, Padding::Circular).unwrap();
        assert_eq!(circular[(0, 0)], 12 + 9 + 10 + 4 + 1 + 2 + 8 + 5 + 6);
    }

    #[test]
    fn correlates_without_flipping() {
        let grid = sample();
        let out = convolve(&grid, &sobel().x, Padding::Same).unwrap();
        // columns step by one, so every row contributes 2 * |weight|: 2 * (1 + 2 + 1)
        assert_eq!(out[(1, 1)], 8);
        assert_eq!(out[(1, 2)], 8);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let grid = Grid::from_rows(vec![vec![1u8, 2]]).unwrap();
        let half = Kernel::new(1, 1, vec![0.5]).unwrap();
        let out = convolve(&grid, &half, Padding::Zeros).unwrap();
        assert_eq!(out.as_slice(), &[1, 1]);
        let neg = Kernel::new(1, 1, vec![-0.5]).unwrap();
        let out = convolve(&grid, &neg, Padding::Zeros).unwrap();
        assert_eq!(out.as_slice(), &[-1, -1]);
    }

    #[test]
    fn constant_grid_stays_constant_with_replicate() {
        let grid = Grid::filled(6, 7, 100u8).unwrap();
        let out = convolve(&grid, &averaging_kernel(3, 3).unwrap(), Padding::Same).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 100));
    }
}
