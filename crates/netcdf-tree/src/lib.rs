//! Hierarchical dataset model with NetCDF-4 I/O.
//!
//! This crate provides:
//! - [`DataTree`] / [`Group`] / [`Variable`]: an owned, ordered tree of
//!   groups and typed arrays with an explicit [`Encoding`] record
//! - [`read_tree`]: load an entire NetCDF-4/HDF5 file into memory
//! - [`TreeWriter`]: append top-level groups to an output file one at a time
//!
//! # Example
//!
//! ```ignore
//! use netcdf_tree::{read_tree, write_tree};
//!
//! let tree = read_tree("SMAP_L2_SM_P_E.h5")?;
//! write_tree("copy.nc", &tree)?;
//! ```

pub mod error;
pub mod model;
pub mod reader;
pub mod writer;

pub use error::{TreeError, TreeResult};
pub use model::{
    ArrayData, AttrValue, Attributes, Compression, DataTree, DataType, Dimension, Encoding,
    Group, GroupPath, Scalar, Variable, DEFAULT_FLOAT_FILL,
};
pub use reader::{read_tree, silence_hdf5_errors};
pub use writer::{write_tree, TreeWriter};
