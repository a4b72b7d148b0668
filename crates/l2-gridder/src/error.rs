//! Error types for the gridding pipeline.

use ease_grid::GridError;
use netcdf_tree::TreeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while regridding a SMAP L2 file.
#[derive(Error, Debug)]
pub enum GridderError {
    /// Unknown collection short name, or a group the collection does not define.
    #[error("{0}")]
    InvalidCollection(String),

    /// Target grid could not be resolved or is not cell-center registered.
    #[error("grid configuration error: {0}")]
    GridConfiguration(#[from] GridError),

    /// A variable selected for flattening is not shaped (N, 3).
    #[error("variable {name} has shape {shape:?}, expected (N, 3)")]
    InvalidVariableShape { name: String, shape: Vec<usize> },

    /// The resolved fill value does not fit the variable's element type.
    #[error("fill value {fill} of variable {name} cannot be represented as {dtype}")]
    UnrepresentableFill {
        name: String,
        fill: String,
        dtype: String,
    },

    /// A row or column index variable is absent from the input.
    #[error("missing variable: {path}")]
    MissingVariable { path: String },

    /// The collection short name could not be found in the input metadata.
    #[error("missing metadata: {0}")]
    MissingMetadata(String),

    /// The collection registry could not be parsed.
    #[error("invalid collection registry: {0}")]
    Registry(String),

    #[error("NetCDF error: {0}")]
    Tree(#[from] TreeError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GridderError {
    /// Create an InvalidCollection error.
    pub fn invalid_collection(msg: impl Into<String>) -> Self {
        Self::InvalidCollection(msg.into())
    }

    /// Create an InvalidVariableShape error.
    pub fn invalid_shape(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self::InvalidVariableShape {
            name: name.into(),
            shape,
        }
    }

    pub fn unrepresentable_fill(
        name: impl Into<String>,
        fill: impl ToString,
        dtype: impl ToString,
    ) -> Self {
        Self::UnrepresentableFill {
            name: name.into(),
            fill: fill.to_string(),
            dtype: dtype.to_string(),
        }
    }

    /// Create a MissingVariable error.
    pub fn missing_variable(path: impl ToString) -> Self {
        Self::MissingVariable {
            path: path.to_string(),
        }
    }

    /// Create an Io error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for gridding operations.
pub type Result<T> = std::result::Result<T, GridderError>;
