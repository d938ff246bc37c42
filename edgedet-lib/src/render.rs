//! Conversions between `image` buffers and pipeline grids.
//!
//! Decoding and colour-to-gray weighting stay with the caller; this module
//! only wraps an already-gray buffer and paints boolean grids back into
//! displayable rasters.
use std::str::FromStr;

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, Result};
use crate::grid::{EdgeGrid, Grid, IntensityGrid};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);
const RGB_WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const STRONG: Rgb<u8> = Rgb([0, 255, 0]);
const WEAK: Rgb<u8> = Rgb([0, 0, 255]);

/// How an edge grid is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderPolicy {
    /// Black edges on a white background.
    #[default]
    BlackOnWhite,
    /// White edges on a black background.
    WhiteOnBlack,
    /// Strong edges green, weak edges blue, background white.
    WeakStrong,
    /// Edges keep the original colour, stretched to full intensity.
    Original,
}

impl FromStr for RenderPolicy {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "black-on-white" | "reversed" => Ok(RenderPolicy::BlackOnWhite),
            "white-on-black" | "plain" => Ok(RenderPolicy::WhiteOnBlack),
            "weak-strong" => Ok(RenderPolicy::WeakStrong),
            "original" => Ok(RenderPolicy::Original),
            _ => Err(EdgeError::InvalidConfiguration(format!(
                "unknown render policy {s:?}"
            ))),
        }
    }
}

fn image_dims<T>(grid: &Grid<T>) -> Result<(u32, u32)> {
    let too_large = |what: &str, n: usize| {
        EdgeError::InvalidInput(format!("{n} {what} do not fit a raster"))
    };
    let width = u32::try_from(grid.cols()).map_err(|_| too_large("columns", grid.cols()))?;
    let height = u32::try_from(grid.rows()).map_err(|_| too_large("rows", grid.rows()))?;
    Ok((width, height))
}

/// Wrap a decoded grayscale buffer as the pipeline input.
pub fn intensity_grid(gray: &GrayImage) -> Result<IntensityGrid> {
    let (width, height) = gray.dimensions();
    Grid::new(height as usize, width as usize, gray.as_raw().clone())
}

fn paint_gray(edges: &EdgeGrid, edge: Luma<u8>, background: Luma<u8>) -> Result<GrayImage> {
    let (width, height) = image_dims(edges)?;
    Ok(GrayImage::from_fn(width, height, |x, y| {
        if edges[(y as usize, x as usize)] {
            edge
        } else {
            background
        }
    }))
}

pub fn black_on_white(edges: &EdgeGrid) -> Result<GrayImage> {
    paint_gray(edges, BLACK, WHITE)
}

pub fn white_on_black(edges: &EdgeGrid) -> Result<GrayImage> {
    paint_gray(edges, WHITE, BLACK)
}

/// White where `grid > threshold`, black elsewhere.
pub fn binarized(grid: &Grid<i32>, threshold: i32) -> Result<GrayImage> {
    white_on_black(&crate::threshold::binarize(grid, threshold))
}

/// Strong pixels green, weak pixels blue, everything else white.
pub fn weak_strong(weak: &Grid<bool>, strong: &Grid<bool>) -> Result<RgbImage> {
    if weak.dims() != strong.dims() {
        return Err(EdgeError::InvalidInput(format!(
            "weak mask is {:?} but strong mask is {:?}",
            weak.dims(),
            strong.dims()
        )));
    }
    let (width, height) = image_dims(strong)?;
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let at = (y as usize, x as usize);
        if strong[at] {
            STRONG
        } else if weak[at] {
            WEAK
        } else {
            RGB_WHITE
        }
    }))
}

/// Edge pixels take the original colour with its minimum channel used as
/// the black point; non-edge pixels are white.
pub fn over_original(edges: &EdgeGrid, original: &RgbImage) -> Result<RgbImage> {
    let (width, height) = image_dims(edges)?;
    if original.dimensions() != (width, height) {
        return Err(EdgeError::InvalidInput(format!(
            "original image is {:?} but edge grid is {width}x{height}",
            original.dimensions()
        )));
    }
    Ok(RgbImage::from_fn(width, height, |x, y| {
        if !edges[(y as usize, x as usize)] {
            return RGB_WHITE;
        }
        let Rgb(channels) = *original.get_pixel(x, y);
        let min = channels.iter().copied().min().unwrap_or(255);
        if min == 255 {
            return RGB_WHITE;
        }
        let scale = 255.0 / (255.0 - min as f64);
        Rgb(channels.map(|ch| {
            let stretched = 255 - (scale * (255.0 - ch as f64)) as i32;
            stretched.clamp(0, 255) as u8
        }))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal() -> EdgeGrid {
        Grid::from_fn(2, 3, |r, c| r == c).unwrap()
    }

    #[test]
    fn gray_round_trip_dimensions() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x + 10 * y) as u8]));
        let grid = intensity_grid(&gray).unwrap();
        assert_eq!(grid.dims(), (2, 3));
        assert_eq!(grid[(1, 2)], 12);
    }

    #[test]
    fn black_and_white_policies() {
        let edges = diagonal();
        let bw = black_on_white(&edges).unwrap();
        assert_eq!(bw.dimensions(), (3, 2));
        assert_eq!(bw.get_pixel(0, 0), &BLACK);
        assert_eq!(bw.get_pixel(1, 0), &WHITE);
        let wb = white_on_black(&edges).unwrap();
        assert_eq!(wb.get_pixel(1, 1), &WHITE);
        assert_eq!(wb.get_pixel(2, 1), &BLACK);
    }

    #[test]
    fn weak_and_strong_colours() {
        let strong = diagonal();
        let weak = Grid::from_fn(2, 3, |r, c| r == 0 && c == 2).unwrap();
        let img = weak_strong(&weak, &strong).unwrap();
        assert_eq!(img.get_pixel(0, 0), &STRONG);
        assert_eq!(img.get_pixel(2, 0), &WEAK);
        assert_eq!(img.get_pixel(0, 1), &RGB_WHITE);
        let wrong = Grid::filled(3, 3, false).unwrap();
        assert!(weak_strong(&wrong, &strong).is_err());
    }

    #[test]
    fn original_colour_is_stretched() {
        let edges = Grid::filled(1, 4, true).unwrap();
        let mut original = RgbImage::new(4, 1);
        original.put_pixel(0, 0, Rgb([200, 100, 50]));
        original.put_pixel(1, 0, Rgb([10, 20, 30]));
        original.put_pixel(2, 0, Rgb([255, 255, 255]));
        original.put_pixel(3, 0, Rgb([0, 0, 0]));
        let out = over_original(&edges, &original).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([187, 63, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([0, 11, 21]));
        assert_eq!(out.get_pixel(2, 0), &RGB_WHITE);
        assert_eq!(out.get_pixel(3, 0), &Rgb([0, 0, 0]));

        let none = Grid::filled(1, 4, false).unwrap();
        let out = over_original(&none, &original).unwrap();
        assert!(out.pixels().all(|p| *p == RGB_WHITE));
        assert!(over_original(&Grid::filled(2, 2, true).unwrap(), &original).is_err());
    }

    #[test]
    fn policy_names() {
        assert_eq!(
            "weak-strong".parse::<RenderPolicy>().unwrap(),
            RenderPolicy::WeakStrong
        );
        assert_eq!(RenderPolicy::default(), RenderPolicy::BlackOnWhite);
        assert!("sepia".parse::<RenderPolicy>().is_err());
    }

    #[test]
    fn binarized_threshold_is_exclusive() {
        let grid = Grid::from_rows(vec![vec![5, 6, 7]]).unwrap();
        let img = binarized(&grid, 6).unwrap();
        assert_eq!(img.as_raw(), &vec![0, 0, 255]);
    }
}
