//! Edge detection on in-memory intensity grids.
//!
//! Six detectors share one pipeline vocabulary: smoothing by convolution,
//! gradient or response kernels, and thresholding. [`Canny`] adds
//! non-maximum suppression and hysteresis linking, with thresholds either
//! supplied or calibrated by 3-means clustering of the gradient magnitudes.
//!
//! ```
//! use edgedet::{DetectorConfig, DetectorKind, Grid};
//!
//! // a one-pixel mid-grey transition between dark and bright halves
//! let image = Grid::from_fn(7, 9, |_, c| match c {
//!     0..=3 => 0u8,
//!     4 => 100,
//!     _ => 200,
//! })
//! .unwrap();
//! let config = DetectorConfig::builder().thresholds(10, 50).build().unwrap();
//! let edges = DetectorKind::Canny.detect(&image, &config).unwrap();
//! assert_eq!(edges.dims(), (7, 9));
//! assert_eq!(edges.count_true(), 7);
//! assert!((0..7).all(|r| edges[(r, 4)]));
//! ```
//!
//! Suppression keeps a pixel only when it is strictly greater than both
//! neighbours along the gradient. An ideal two-level step produces two
//! equal-magnitude ridge columns that suppress each other, so Canny finds
//! nothing on it; transitions an odd number of pixels wide keep their
//! centre.
pub mod config;
pub mod convolution;
pub mod detector;
pub mod error;
pub mod gradient;
pub mod grid;
pub mod hysteresis;
pub mod kernels;
pub mod kmeans;
pub mod nms;
pub mod padding;
pub mod render;
pub mod threshold;

pub use config::{DetectorConfig, DetectorConfigBuilder, Smoothing};
pub use convolution::convolve;
pub use detector::{
    Canny, CannyEdges, DetectorKind, EdgeDetector, Gaussian, Laplacian, Prewitt, RobertsCross,
    Sobel, ThresholdedEdges,
};
pub use error::{EdgeError, Result};
pub use gradient::{Direction, Norm};
pub use grid::{EdgeGrid, Grid, IntensityGrid};
pub use hysteresis::Thresholds;
pub use kernels::Kernel;
pub use kmeans::KMeansConfig;
pub use padding::Padding;
pub use render::RenderPolicy;
