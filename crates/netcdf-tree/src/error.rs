//! Error types for tree construction and NetCDF I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Error types for the hierarchical dataset layer.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Error reported by libnetcdf
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    /// A file could not be opened or created
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    /// Filesystem error outside of libnetcdf
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No group at the requested path
    #[error("Missing group: {0}")]
    MissingGroup(String),

    /// No variable at the requested path
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Data length does not match the product of the dimension lengths
    #[error("Variable {name} holds {actual} values but its dimensions require {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Two variables in one group use the same dimension name with different lengths
    #[error("Dimension {name} in group {group} is used with lengths {first} and {second}")]
    DimensionConflict {
        group: String,
        name: String,
        first: usize,
        second: usize,
    },

    /// Data type that the tree model cannot hold or the writer cannot emit
    #[error("Unsupported data type for variable {name}: {dtype}")]
    UnsupportedType { name: String, dtype: String },

    /// A fill value that does not fit the element type of its array
    #[error("Fill value {fill} cannot be represented as {dtype}")]
    UnrepresentableFill { fill: String, dtype: String },
}

impl TreeError {
    pub fn open(path: impl Into<PathBuf>, source: netcdf::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_type(name: impl Into<String>, dtype: impl ToString) -> Self {
        Self::UnsupportedType {
            name: name.into(),
            dtype: dtype.to_string(),
        }
    }

    pub fn unrepresentable_fill(fill: impl ToString, dtype: impl ToString) -> Self {
        Self::UnrepresentableFill {
            fill: fill.to_string(),
            dtype: dtype.to_string(),
        }
    }
}
