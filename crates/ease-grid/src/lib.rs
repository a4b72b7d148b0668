//! EASE-Grid 2.0 support for the SMAP L2 gridder.
//!
//! Everything needed to place a gridded SMAP variable in projected space:
//!
//! - [`gpd`]: parser for NSIDC grid parameter definition (`.gpd`) files
//! - [`geotransform`]: GDAL-style affine transform and dimension coordinates
//! - [`crs`]: CF grid-mapping records for the two supported EASE-Grid 2.0 CRSs
//! - [`store`]: the registry of named grids bundled with the crate
//!
//! Only cell-center registered grids (origin column/row of -0.5) are
//! supported, which covers every grid the SMAP L2 products are tied to.
//!
//! # Example
//!
//! ```
//! use ease_grid::{compute_dims, GridStore};
//!
//! let definition = GridStore::bundled().definition("M36km").unwrap();
//! let (x, y) = compute_dims(&definition).unwrap();
//! assert_eq!(x.len(), 964);
//! assert_eq!(y.len(), 406);
//! ```

pub mod crs;
pub mod error;
pub mod geotransform;
pub mod gpd;
pub mod store;
mod wkt;

pub use crs::{CfValue, CrsRecord, EpsgCode, EPSG_6931_WKT, EPSG_6933_WKT};
pub use error::{GridError, GridResult};
pub use geotransform::{compute_dims, validate_gpd_style, Geotransform};
pub use gpd::{
    convert_value, parse_grid_parameter_file, parse_grid_parameters, GpdValue, GridDefinition,
    GridParameters,
};
pub use store::{GridEntry, GridName, GridStore};
