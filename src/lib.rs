//! # chromasom - Self-Organizing Maps for tabular data
//!
//! chromasom trains a Self-Organizing Map (SOM) on three numeric columns of a
//! CSV file and renders the trained grid as an RGB image, so that rows with
//! similar features end up as neighboring, similarly colored cells.
//!
//! ## Overview
//!
//! A SOM is a 2D grid of prototype vectors. Training repeatedly presents
//! every sample, finds its best matching unit (BMU) and pulls the BMU and its
//! grid neighbors towards the sample. The neighborhood radius and learning
//! rate decay exponentially over a fixed number of iterations.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chromasom::{load_samples, save_grid_image, Config, SomTrainer};
//!
//! let config = Config::from_file("config.yaml")?;
//! let columns = vec!["age".to_string(), "income".to_string(), "score".to_string()];
//! let samples = load_samples("customers.csv", &columns)?;
//!
//! let mut trainer = SomTrainer::new(config.som.clone())?;
//! let grid = trainer.train(&samples)?;
//!
//! save_grid_image(grid, "som_result.png", 1)?;
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Prototype grid, decay schedule and training loop
//! - [`data`] - CSV column selection and min-max normalization
//! - [`config`] - YAML configuration
//! - [`render`] - Raster output

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod som;

// Re-export commonly used types
pub use config::{Config, OutputConfig, SomConfig};
pub use data::{load_samples, read_samples, Sample};
pub use error::{Result, SomError};
pub use render::{grid_to_image, save_grid_image};
pub use som::{Bmu, PrototypeGrid, SomTrainer, TrainingMetrics, TrainingSchedule};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Feature vector length for RGB-like data.
pub const RGB_DIM: usize = 3;

/// Default initial learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
