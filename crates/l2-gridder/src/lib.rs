//! SMAP L2 gridder.
//!
//! SMAP L2 soil-moisture products store each retrieval as a 1D swath sample
//! with the EASE-Grid 2.0 row and column of the cell it belongs to. This
//! crate places those samples on their grid, producing a self-describing
//! NetCDF-4 file with one `(y-dim, x-dim)` raster per variable.
//!
//! - [`collections`]: which grid and index variables each product group uses
//! - [`fill`]: fill-value resolution and the valid-sample mask
//! - [`flatten`]: splitting (N, 3) variables into 1D components
//! - [`scatter`]: the 1D to 2D scatter and the target grid variables
//! - [`process`]: walking an input file and writing the output
//!
//! # Example
//!
//! ```ignore
//! use l2_gridder::transform_file;
//!
//! transform_file("SMAP_L2_SM_P_E_36365_D_20210822T000000.h5", "gridded.nc")?;
//! ```

pub mod collections;
pub mod error;
pub mod fill;
pub mod flatten;
pub mod process;
pub mod scatter;

pub use collections::{CollectionConfig, CollectionGroupConfig, CollectionRegistry};
pub use error::{GridderError, Result};
pub use fill::{default_fill_value, resolve_fill_value, valid_mask};
pub use flatten::{select_flatten_candidates, split_component_variable};
pub use process::{collection_short_name, process_input, transform_file, Gridder, TreeSink};
pub use scatter::{
    scatter_to_grid, ScatterOptions, SourceIndexArrays, TargetGrid, DEFAULT_COMPRESSION_LEVEL,
};
