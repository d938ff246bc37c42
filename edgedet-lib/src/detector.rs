//! The six edge detectors.
//!
//! All detectors smooth first, then either differentiate with a kernel pair
//! (Canny, Sobel, Prewitt, Roberts Cross) or take a single response
//! (Laplacian, Gaussian). Only Canny thins with non-maximum suppression and
//! links with hysteresis; the rest threshold against the mean of their
//! magnitude or response grid.
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::config::DetectorConfig;
use crate::convolution::convolve;
use crate::error::{EdgeError, Result};
use crate::gradient::compute_gradient;
use crate::grid::{EdgeGrid, Grid, IntensityGrid};
use crate::hysteresis::hysteresis;
use crate::kernels::{self, KernelPair};
use crate::nms::non_maximum_suppression;
use crate::threshold::{mean_threshold, threshold_magnitude, threshold_response};

/// A grid-to-edge-map transform.
pub trait EdgeDetector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    /// Run the full pipeline on `image`. The configuration is validated
    /// before any convolution.
    fn detect(&self, image: &IntensityGrid, config: &DetectorConfig) -> Result<EdgeGrid>;
}

/// Edges plus the single threshold a mean-thresholding detector derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdedEdges {
    pub edges: EdgeGrid,
    pub threshold: i32,
}

/// Everything Canny knows after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannyEdges {
    pub edges: EdgeGrid,
    pub weak: Grid<bool>,
    pub strong: Grid<bool>,
    pub low_threshold: i32,
    pub high_threshold: i32,
    pub accepted_components: usize,
    pub rejected_components: usize,
}

fn smooth(image: &IntensityGrid, config: &DetectorConfig) -> Result<Grid<i32>> {
    let kernel = config.smoothing.kernel()?;
    convolve(image, &kernel, config.padding)
}

fn gradient_edges(
    kind: DetectorKind,
    image: &IntensityGrid,
    config: &DetectorConfig,
    pair: &KernelPair,
) -> Result<ThresholdedEdges> {
    config.validate()?;
    let smoothed = smooth(image, config)?;
    let gradient = compute_gradient(&smoothed, pair, config.norm, config.padding)?;
    let threshold = mean_threshold(&gradient.magnitude);
    let edges = threshold_magnitude(&gradient.magnitude, threshold);
    debug!(
        "{kind}: {}x{} grid, mean threshold {threshold}, {} edge pixels",
        image.rows(),
        image.cols(),
        edges.count_true()
    );
    Ok(ThresholdedEdges { edges, threshold })
}

fn response_edges(kind: DetectorKind, response: Grid<i32>) -> ThresholdedEdges {
    let threshold = mean_threshold(&response);
    let edges = threshold_response(&response, threshold);
    debug!(
        "{kind}: {}x{} grid, mean threshold {threshold}, {} edge pixels",
        response.rows(),
        response.cols(),
        edges.count_true()
    );
    ThresholdedEdges { edges, threshold }
}

/// Smoothing, Sobel gradient, non-maximum suppression, then hysteresis
/// with explicit or k-means thresholds and component-size filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canny;

impl Canny {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<CannyEdges> {
        config.validate()?;
        let smoothed = smooth(image, config)?;
        let gradient =
            compute_gradient(&smoothed, &kernels::sobel(), config.norm, config.padding)?;
        let suppressed = non_maximum_suppression(&gradient.magnitude, &gradient.direction);
        let (classification, linked, (low, high)) =
            hysteresis(&suppressed, config.thresholds, config.min_edge_size)?;
        debug!(
            "canny: {}x{} grid, thresholds {low}/{high}, {} strong, {} weak, {} edge pixels",
            image.rows(),
            image.cols(),
            classification.strong.count_true(),
            classification.weak.count_true(),
            linked.edges.count_true()
        );
        Ok(CannyEdges {
            edges: linked.edges,
            weak: classification.weak,
            strong: classification.strong,
            low_threshold: low,
            high_threshold: high,
            accepted_components: linked.accepted,
            rejected_components: linked.rejected,
        })
    }
}

impl EdgeDetector for Canny {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Canny
    }

    fn detect(&self, image: &IntensityGrid, config: &DetectorConfig) -> Result<EdgeGrid> {
        Ok(self.detect_detailed(image, config)?.edges)
    }
}

/// Sobel gradient magnitude against its mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sobel;

impl Sobel {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<ThresholdedEdges> {
        gradient_edges(DetectorKind::Sobel, image, config, &kernels::sobel())
    }
}

/// Prewitt gradient magnitude against its mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prewitt;

impl Prewitt {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<ThresholdedEdges> {
        gradient_edges(DetectorKind::Prewitt, image, config, &kernels::prewitt())
    }
}

/// Roberts Cross diagonal gradient magnitude against its mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobertsCross;

impl RobertsCross {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<ThresholdedEdges> {
        gradient_edges(
            DetectorKind::RobertsCross,
            image,
            config,
            &kernels::roberts_cross(),
        )
    }
}

/// Absolute Laplacian response against the mean response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Laplacian;

impl Laplacian {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<ThresholdedEdges> {
        config.validate()?;
        let smoothed = smooth(image, config)?;
        let response = convolve(&smoothed, &kernels::laplacian(), config.padding)?;
        Ok(response_edges(DetectorKind::Laplacian, response))
    }
}

/// Smoothing only; the smoothed grid is thresholded like the Laplacian response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl Gaussian {
    pub fn detect_detailed(
        &self,
        image: &IntensityGrid,
        config: &DetectorConfig,
    ) -> Result<ThresholdedEdges> {
        config.validate()?;
        let smoothed = smooth(image, config)?;
        Ok(response_edges(DetectorKind::Gaussian, smoothed))
    }
}

macro_rules! thresholded_detector {
    ($($ty:ident),*) => {
        $(
            impl EdgeDetector for $ty {
                fn kind(&self) -> DetectorKind {
                    DetectorKind::$ty
                }

                fn detect(
                    &self,
                    image: &IntensityGrid,
                    config: &DetectorConfig,
                ) -> Result<EdgeGrid> {
                    Ok(self.detect_detailed(image, config)?.edges)
                }
            }
        )*
    };
}

thresholded_detector!(Sobel, Prewitt, RobertsCross, Laplacian, Gaussian);

/// The closed set of available detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Canny,
    Sobel,
    Laplacian,
    Prewitt,
    RobertsCross,
    Gaussian,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 6] = [
        DetectorKind::Canny,
        DetectorKind::Sobel,
        DetectorKind::Laplacian,
        DetectorKind::Prewitt,
        DetectorKind::RobertsCross,
        DetectorKind::Gaussian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DetectorKind::Canny => "canny",
            DetectorKind::Sobel => "sobel",
            DetectorKind::Laplacian => "laplacian",
            DetectorKind::Prewitt => "prewitt",
            DetectorKind::RobertsCross => "roberts-cross",
            DetectorKind::Gaussian => "gaussian",
        }
    }

    pub fn detector(self) -> &'static dyn EdgeDetector {
        match self {
            DetectorKind::Canny => &Canny,
            DetectorKind::Sobel => &Sobel,
            DetectorKind::Laplacian => &Laplacian,
            DetectorKind::Prewitt => &Prewitt,
            DetectorKind::RobertsCross => &RobertsCross,
            DetectorKind::Gaussian => &Gaussian,
        }
    }

    pub fn detect(self, image: &IntensityGrid, config: &DetectorConfig) -> Result<EdgeGrid> {
        self.detector().detect(image, config)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectorKind {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "canny" => Ok(DetectorKind::Canny),
            "sobel" => Ok(DetectorKind::Sobel),
            "laplacian" => Ok(DetectorKind::Laplacian),
            "prewitt" => Ok(DetectorKind::Prewitt),
            "robertscross" | "roberts" => Ok(DetectorKind::RobertsCross),
            "gaussian" => Ok(DetectorKind::Gaussian),
            _ => Err(EdgeError::InvalidConfiguration(format!(
                "unknown detector {s:?}"
            ))),
        }
    }
}
