use crate::gradient::Direction;
use crate::grid::Grid;

/// Zero every magnitude that is not strictly greater than both neighbours
/// along its quantized gradient direction.
///
/// Neighbours outside the grid count as 0. `magnitude` and `direction` must
/// share dimensions; both come out of the same gradient pass.
pub fn non_maximum_suppression(magnitude: &Grid<i32>, direction: &Grid<Direction>) -> Grid<i32> {
    debug_assert_eq!(magnitude.dims(), direction.dims());
    let mut out = magnitude.clone();
    let (rows, cols) = magnitude.dims();
    for r in 0..rows {
        for c in 0..cols {
            let mod_v = magnitude[(r, c)];
            if mod_v == 0 {
                continue;
            }
            let is_max = direction[(r, c)].neighbor_offsets().iter().all(|&(dr, dc)| {
                let neighbor = magnitude
                    .get(r as isize + dr, c as isize + dc)
                    .copied()
                    .unwrap_or(0);
                mod_v > neighbor
            });
            if !is_max {
                out[(r, c)] = 0;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(rows: usize, cols: usize, d: Direction) -> Grid<Direction> {
        Grid::filled(rows, cols, d).unwrap()
    }

    #[test]
    fn keeps_ridge_along_horizontal_gradient() {
        let magnitude = Grid::from_rows(vec![
            vec![1, 5, 9, 5, 1],
            vec![1, 5, 9, 5, 1],
        ])
        .unwrap();
        let out = non_maximum_suppression(&magnitude, &uniform(2, 5, Direction::Horizontal));
        assert_eq!(
            out.to_rows(),
            vec![vec![0, 0, 9, 0, 0], vec![0, 0, 9, 0, 0]]
        );
    }

    #[test]
    fn ties_are_suppressed() {
        let magnitude = Grid::from_rows(vec![vec![0, 7, 7, 0]]).unwrap();
        let out = non_maximum_suppression(&magnitude, &uniform(1, 4, Direction::Horizontal));
        assert_eq!(out.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn border_compares_against_zero() {
        let magnitude = Grid::from_rows(vec![vec![4, 2, 1]]).unwrap();
        let out = non_maximum_suppression(&magnitude, &uniform(1, 3, Direction::Horizontal));
        assert_eq!(out.as_slice(), &[4, 0, 0]);
    }

    #[test]
    fn follows_the_direction() {
        let magnitude = Grid::from_rows(vec![
            vec![0, 0, 3],
            vec![0, 5, 0],
            vec![6, 0, 0],
        ])
        .unwrap();
        // along 45° the centre sits between 3 (up-right) and 6 (down-left)
        let diag = non_maximum_suppression(&magnitude, &uniform(3, 3, Direction::Diagonal45));
        assert_eq!(diag[(1, 1)], 0);
        // along 135° its neighbours are both zero
        let anti = non_maximum_suppression(&magnitude, &uniform(3, 3, Direction::Diagonal135));
        assert_eq!(anti[(1, 1)], 5);
        // vertically it beats 0 above and 0 below
        let vert = non_maximum_suppression(&magnitude, &uniform(3, 3, Direction::Vertical));
        assert_eq!(vert[(1, 1)], 5);
        assert_eq!(vert[(0, 2)], 3);
        assert_eq!(vert[(2, 0)], 6);
    }

    #[test]
    fn flat_grid_is_all_zero() {
        let magnitude = Grid::filled(4, 4, 0).unwrap();
        let out = non_maximum_suppression(&magnitude, &uniform(4, 4, Direction::Vertical));
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }
}
