use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EdgeError;

/// How convolution resolves neighbours that fall outside the grid.
///
/// Shown for a row `z1 z2 .. zn` padded by one cell on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// `0, z1, z2, .., zn-1, zn, 0`
    Zeros,
    /// `z1, z1, z2, .., zn-1, zn, zn`
    #[default]
    Same,
    /// `z2, z1, z2, .., zn-1, zn, zn-1`
    Symmetric,
    /// `zn, z1, z2, .., zn-1, zn, z1`
    Circular,
}

impl Padding {
    /// Maps a possibly out-of-range index into `[0, len)`.
    ///
    /// Returns `None` only for [`Padding::Zeros`], where the caller must
    /// substitute a zero sample. `len` must be positive.
    #[inline]
    pub fn map_index(self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        match self {
            Padding::Zeros => None,
            Padding::Same => Some(i.clamp(0, n - 1) as usize),
            Padding::Symmetric => Some(Self::reflect(i, n)),
            Padding::Circular => Some(i.rem_euclid(n) as usize),
        }
    }

    fn reflect(mut i: isize, n: isize) -> usize {
        if n == 1 {
            return 0;
        }
        while i < 0 || i >= n {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * n - i - 2;
            }
        }
        i as usize
    }
}

impl FromStr for Padding {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zeros" | "zero" => Ok(Padding::Zeros),
            "same" | "replicate" => Ok(Padding::Same),
            "symmetric" | "reflect" => Ok(Padding::Symmetric),
            "circular" | "wrap" => Ok(Padding::Circular),
            _ => Err(EdgeError::InvalidConfiguration(format!("unknown padding {s:?}"))),
        }
    }
}
