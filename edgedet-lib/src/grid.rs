use std::ops::{Index, IndexMut};

use crate::error::{EdgeError, Result};

/// A dense row-major 2D grid.
///
/// Element `(row, col)` lives at `col + row * cols`, the same layout the
/// pipeline stages index with directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Grayscale intensities in `[0, 255]`, the pipeline input.
pub type IntensityGrid = Grid<u8>;

/// Final detector output: `true` marks a confirmed edge pixel.
pub type EdgeGrid = Grid<bool>;

impl<T> Grid<T> {
    /// Wraps a row-major buffer. Fails if either dimension is zero or the
    /// buffer length does not match `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EdgeError::InvalidInput(format!(
                "grid dimensions must be positive, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(EdgeError::InvalidInput(format!(
                "data length ({}) does not match grid size {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self::new(rows, cols, data)
    }

    /// Builds a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != n_cols) {
            return Err(EdgeError::InvalidInput(format!(
                "row {bad} has {} columns, expected {n_cols}",
                rows[bad].len()
            )));
        }
        Self::new(n_rows, n_cols, rows.into_iter().flatten().collect())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed grid; kept for clippy's `len_without_is_empty`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Bounds-checked access with signed coordinates; `None` outside the grid.
    #[inline]
    pub fn get(&self, row: isize, col: isize) -> Option<&T> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        self.data.get(col as usize + row as usize * self.cols)
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Element-wise combination of two grids of equal dimensions.
    pub fn zip_map<U, V, F>(&self, other: &Grid<U>, mut f: F) -> Result<Grid<V>>
    where
        F: FnMut(&T, &U) -> V,
    {
        if self.dims() != other.dims() {
            return Err(EdgeError::InvalidInput(format!(
                "grid dimensions differ: {:?} vs {:?}",
                self.dims(),
                other.dims()
            )));
        }
        Ok(Grid {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Result<Self> {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }
}

impl<T: Copy + Into<f64>> Grid<T> {
    /// Arithmetic mean of all cells.
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.data.iter().map(|&v| v.into()).sum();
        sum / self.data.len() as f64
    }
}

impl Grid<bool> {
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[col + row * self.cols]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[col + row * self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_mismatched() {
        assert!(matches!(
            Grid::<u8>::new(0, 3, vec![]),
            Err(EdgeError::InvalidInput(_))
        ));
        assert!(matches!(
            Grid::new(2, 2, vec![1u8, 2, 3]),
            Err(EdgeError::InvalidInput(_))
        ));
        assert!(matches!(
            Grid::from_rows(vec![vec![1u8, 2], vec![3]]),
            Err(EdgeError::InvalidInput(_))
        ));
        assert!(matches!(
            Grid::<u8>::from_rows(vec![]),
            Err(EdgeError::InvalidInput(_))
        ));
    }

    #[test]
    fn row_major_indexing() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid.dims(), (2, 3));
        assert_eq!(grid[(1, 0)], 4);
        assert_eq!(grid[(0, 2)], 3);
        assert_eq!(grid.row(1), &[4, 5, 6]);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(1, 3), None);
        assert_eq!(grid.get(1, 2), Some(&6));
        assert_eq!(grid.to_rows(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn mean_and_count() {
        let grid = Grid::from_rows(vec![vec![1i32, 2], vec![3, 6]]).unwrap();
        assert_eq!(grid.mean(), 3.0);
        let mask = grid.map(|&v| v > 2);
        assert_eq!(mask.count_true(), 2);
    }
}
