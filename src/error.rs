//! Error types for the chromasom Self-Organizing Map trainer.

use thiserror::Error;

/// The main error type for chromasom operations.
#[derive(Error, Debug)]
pub enum SomError {
    /// Bad grid dimensions, iteration budget or learning rate.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A vector's length does not match the grid's vector length.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The vector length the grid was built with.
        expected: usize,
        /// The length that was supplied.
        found: usize,
    },

    /// Nothing to train on.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The neighborhood radius collapsed to a value the influence formula cannot use.
    #[error("Degenerate neighborhood radius {radius} at iteration {iteration}")]
    DegenerateRadius {
        /// Iteration at which the radius became unusable.
        iteration: usize,
        /// The offending radius.
        radius: f64,
    },

    /// The requested columns do not resolve to the expected number of features.
    #[error("Expected exactly {expected} columns, found {found}")]
    ColumnCount {
        /// Required number of columns.
        expected: usize,
        /// Number of columns requested.
        found: usize,
    },

    /// Requested columns that the input file does not contain.
    #[error("The following columns were not found in the file: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    /// Malformed tabular data.
    #[error("Data error: {0}")]
    Data(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raster encoding error.
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for chromasom operations.
pub type Result<T> = std::result::Result<T, SomError>;

impl From<csv::Error> for SomError {
    fn from(err: csv::Error) -> Self {
        SomError::Data(err.to_string())
    }
}

impl From<serde_yaml::Error> for SomError {
    fn from(err: serde_yaml::Error) -> Self {
        SomError::Config(err.to_string())
    }
}

impl From<image::ImageError> for SomError {
    fn from(err: image::ImageError) -> Self {
        SomError::Image(err.to_string())
    }
}
