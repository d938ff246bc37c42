//! Detector configuration.
//!
//! Every field has a default, so `DetectorConfig::default()` is a usable
//! configuration for all six detectors. Fields a detector does not use are
//! ignored by it (only Canny reads `norm`, `thresholds` and `min_edge_size`).
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gradient::Norm;
use crate::hysteresis::Thresholds;
use crate::kernels::{gaussian_5x5, gaussian_5x5_large, gaussian_kernel, Kernel};
use crate::padding::Padding;

/// The smoothing kernel applied before differentiation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    /// Fixed 5×5 kernel, weights /159.
    #[default]
    Fixed,
    /// Fixed binomial 5×5 kernel, weights /256.
    Large,
    /// `size`×`size` kernel generated from `sigma`.
    Gaussian { size: usize, sigma: f64 },
}

impl Smoothing {
    pub fn kernel(&self) -> Result<Kernel> {
        match *self {
            Smoothing::Fixed => Ok(gaussian_5x5()),
            Smoothing::Large => Ok(gaussian_5x5_large()),
            Smoothing::Gaussian { size, sigma } => gaussian_kernel(size, sigma),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub norm: Norm,
    pub thresholds: Thresholds,
    pub min_edge_size: usize,
    pub smoothing: Smoothing,
    pub padding: Padding,
}

impl DetectorConfig {
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }

    /// Fails with `InvalidConfiguration` on misordered thresholds and
    /// `InvalidInput` on unusable smoothing parameters.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if let Smoothing::Gaussian { .. } = self.smoothing {
            self.smoothing.kernel()?;
        }
        Ok(())
    }
}

/// Builder for [`DetectorConfig`]; errors surface from [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct DetectorConfigBuilder {
    config: DetectorConfig,
    thresholds: Option<(i32, i32)>,
}

impl DetectorConfigBuilder {
    /// Explicit hysteresis thresholds, `0 <= low <= high <= 255`.
    pub fn thresholds(mut self, low: i32, high: i32) -> Self {
        self.thresholds = Some((low, high));
        self
    }

    /// Derive thresholds with k-means (the default).
    pub fn auto_thresholds(mut self) -> Self {
        self.thresholds = None;
        self.config.thresholds = Thresholds::Auto;
        self
    }

    pub fn norm(mut self, norm: Norm) -> Self {
        self.config.norm = norm;
        self
    }

    pub fn l1_norm(self, l1: bool) -> Self {
        self.norm(if l1 { Norm::L1 } else { Norm::L2 })
    }

    pub fn min_edge_size(mut self, min_edge_size: usize) -> Self {
        self.config.min_edge_size = min_edge_size;
        self
    }

    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.config.smoothing = smoothing;
        self
    }

    pub fn gaussian(self, size: usize, sigma: f64) -> Self {
        self.smoothing(Smoothing::Gaussian { size, sigma })
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn build(self) -> Result<DetectorConfig> {
        let mut config = self.config;
        if let Some((low, high)) = self.thresholds {
            config.thresholds = Thresholds::explicit(low, high)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EdgeError;

    #[test]
    fn defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.norm, Norm::L2);
        assert_eq!(config.thresholds, Thresholds::Auto);
        assert_eq!(config.min_edge_size, 0);
        assert_eq!(config.smoothing, Smoothing::Fixed);
        assert_eq!(config.padding, Padding::Same);
        assert_eq!(DetectorConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn builder_sets_fields() {
        let config = DetectorConfig::builder()
            .thresholds(15, 35)
            .min_edge_size(10)
            .l1_norm(true)
            .gaussian(7, 2.0)
            .padding(Padding::Circular)
            .build()
            .unwrap();
        assert_eq!(config.thresholds, Thresholds::Explicit { low: 15, high: 35 });
        assert_eq!(config.min_edge_size, 10);
        assert_eq!(config.norm, Norm::L1);
        assert_eq!(config.smoothing, Smoothing::Gaussian { size: 7, sigma: 2.0 });
        assert_eq!(config.padding, Padding::Circular);
    }

    #[test]
    fn builder_rejects_bad_values() {
        let err = DetectorConfig::builder().thresholds(60, 10).build();
        assert!(matches!(err, Err(EdgeError::InvalidConfiguration(_))));
        let err = DetectorConfig::builder().thresholds(0, 256).build();
        assert!(matches!(err, Err(EdgeError::InvalidConfiguration(_))));
        let err = DetectorConfig::builder().gaussian(4, 1.0).build();
        assert!(matches!(err, Err(EdgeError::InvalidInput(_))));
        // switching back to auto clears a bad explicit pair
        assert!(DetectorConfig::builder()
            .thresholds(60, 10)
            .auto_thresholds()
            .build()
            .is_ok());
    }

    #[test]
    fn serde_round_trip_shape() {
        let json = r#"{
            "norm": "l1",
            "thresholds": { "mode": "explicit", "low": 15, "high": 35 },
            "min_edge_size": 10,
            "smoothing": { "kind": "gaussian", "size": 5, "sigma": 1.4 }
        }"#;
        let config: DetectorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.norm, Norm::L1);
        assert_eq!(config.thresholds, Thresholds::Explicit { low: 15, high: 35 });
        assert_eq!(config.padding, Padding::Same);
        assert_eq!(config.smoothing, Smoothing::Gaussian { size: 5, sigma: 1.4 });

        let auto: DetectorConfig =
            serde_json::from_str(r#"{ "thresholds": { "mode": "auto" } }"#).unwrap();
        assert_eq!(auto, DetectorConfig::default());
    }
}
