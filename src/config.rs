//! Configuration for the chromasom trainer.
//!
//! Configuration is read from a YAML document with a mandatory `som` section
//! and an optional `output` section:
//!
//! ```yaml
//! som:
//!   grid_width: 100
//!   grid_height: 100
//!   max_iterations: 1000
//! output:
//!   path: som_result.png
//! ```

use crate::error::{Result, SomError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Default raster file name.
pub const DEFAULT_OUTPUT_FILE: &str = "som_result.png";

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SOM (Self-Organizing Map) configuration.
    pub som: SomConfig,

    /// Raster output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SomError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable before any training starts.
    pub fn validate(&self) -> Result<()> {
        self.som.validate()?;
        if self.output.scale == 0 {
            return Err(SomError::Config("output.scale must be positive".to_string()));
        }
        Ok(())
    }
}

/// Self-Organizing Map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Number of grid cells along x.
    pub grid_width: usize,

    /// Number of grid cells along y.
    pub grid_height: usize,

    /// Number of passes over the full sample sequence.
    pub max_iterations: usize,

    /// Initial learning rate.
    /// Default: 0.1.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Length of every prototype vector.
    /// Default: 3 (RGB-like features).
    #[serde(default = "default_weight_dimension")]
    pub weight_dimension: usize,

    /// Random seed for reproducibility.
    /// Default: None (random).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_learning_rate() -> f64 {
    crate::DEFAULT_LEARNING_RATE
}

fn default_weight_dimension() -> usize {
    crate::RGB_DIM
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            max_iterations: 1000,
            learning_rate: default_learning_rate(),
            weight_dimension: default_weight_dimension(),
            seed: None,
        }
    }
}

impl SomConfig {
    /// Creates a configuration for a `width × height` grid.
    pub fn new(grid_width: usize, grid_height: usize, max_iterations: usize) -> Self {
        Self {
            grid_width,
            grid_height,
            max_iterations,
            ..Default::default()
        }
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initial neighborhood radius: half the longer grid side.
    #[inline]
    pub fn initial_radius(&self) -> f64 {
        self.grid_width.max(self.grid_height) as f64 / 2.0
    }

    /// Rejects values the configuration file can express but training cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SomError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.max_iterations == 0 {
            return Err(SomError::Config("max_iterations must be positive".to_string()));
        }
        if self.weight_dimension == 0 {
            return Err(SomError::Config("weight_dimension must be positive".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SomError::Config(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Raster output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output raster path. The format follows the extension.
    /// Default: `som_result.png`.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Pixels per grid cell along each axis.
    /// Default: 1.
    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_scale() -> u32 {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            scale: default_scale(),
        }
    }
}
