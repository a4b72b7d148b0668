//! SMAP L2 gridding service.
//!
//! Wraps the `l2-gridder` transform with input retrieval, a per-request
//! working directory and output staging.

pub mod adapter;
pub mod config;
pub mod error;
pub mod retrieval;
pub mod staging;

pub use adapter::{GridRequest, GridSettings, GridderAdapter, StagedOutput};
pub use config::{GridderConfig, LogFormat};
pub use error::{ServiceError, SERVICE_NAME};
pub use retrieval::{output_file_name, HttpRetriever, Retriever};
pub use staging::{ObjectStager, Stager, StagingLocation, NETCDF4_CONTENT_TYPE};
