use crate::grid::Grid;

/// Truncated arithmetic mean, the single-threshold heuristic used by the
/// non-Canny detectors.
pub fn mean_threshold(grid: &Grid<i32>) -> i32 {
    grid.mean() as i32
}

/// `true` where `magnitude >= threshold`. Zero magnitudes never pass.
pub fn threshold_magnitude(magnitude: &Grid<i32>, threshold: i32) -> Grid<bool> {
    magnitude.map(|&m| m != 0 && m >= threshold)
}

/// `true` where `|response| > threshold`. Zero responses never pass.
pub fn threshold_response(response: &Grid<i32>, threshold: i32) -> Grid<bool> {
    response.map(|&v| v != 0 && v.abs() > threshold)
}

/// `true` where `value > threshold`.
pub fn binarize(grid: &Grid<i32>, threshold: i32) -> Grid<bool> {
    grid.map(|&v| v > threshold)
}
