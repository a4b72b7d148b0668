//! Error types for grid definitions and coordinate reference systems.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or interpreting a target grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// A grid parameter definition file could not be read.
    #[error("failed to read grid parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The grid is not registered at the cell center (-0.5, -0.5).
    #[error("Can not use non standard gpd: {0}")]
    NonStandardGpd(String),

    /// A required key is absent from the parameter file.
    #[error("grid {grid} is missing required parameter '{key}'")]
    MissingParameter { grid: String, key: String },

    /// A required key is present but holds the wrong kind of value.
    #[error("grid {grid} has invalid value '{value}' for parameter '{key}'")]
    InvalidParameter {
        grid: String,
        key: String,
        value: String,
    },

    /// No grid with this name is bundled.
    #[error("unknown grid: {0}")]
    UnknownGrid(String),

    /// The CRS identifier is not one of the supported EASE-Grid 2.0 systems.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// A WKT string could not be interpreted.
    #[error("invalid WKT: {0}")]
    InvalidWkt(String),
}

impl GridError {
    /// Create a MissingParameter error.
    pub fn missing_parameter(grid: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingParameter {
            grid: grid.into(),
            key: key.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(
        grid: impl Into<String>,
        key: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidParameter {
            grid: grid.into(),
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Create an InvalidWkt error.
    pub fn invalid_wkt(msg: impl Into<String>) -> Self {
        Self::InvalidWkt(msg.into())
    }
}

/// Result type for grid operations.
pub type GridResult<T> = std::result::Result<T, GridError>;
