//! One request end to end: download, grid, stage.
//!
//! ```text
//! source URL ──► Retriever ──► <tmp>/granule.h5
//!                                   │
//!                     spawn_blocking(transform_file)
//!                                   │
//!                          <tmp>/working_gridded.nc
//!                                   │
//!                 Stager ──► <staging>/granule_regridded.nc
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info, instrument};

use ease_grid::GridStore;
use l2_gridder::{CollectionRegistry, Gridder, ScatterOptions};

use crate::config::GridderConfig;
use crate::error::ServiceError;
use crate::retrieval::{output_file_name, Retriever};
use crate::staging::{Stager, NETCDF4_CONTENT_TYPE};

/// Name of the transform output inside the working directory.
const WORKING_FILE_NAME: &str = "working_gridded.nc";

/// A single gridding request.
#[derive(Debug, Clone)]
pub struct GridRequest {
    /// URL or path of the input granule.
    pub source: String,
    pub staging_location: String,
    pub access_token: Option<String>,
}

/// Location and type of a staged result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOutput {
    pub url: String,
    pub title: String,
    pub media_type: &'static str,
}

/// Gridding settings shared by every request.
#[derive(Debug, Clone)]
pub struct GridSettings {
    registry: Arc<CollectionRegistry>,
    options: ScatterOptions,
    timeout: Option<Duration>,
}

impl GridSettings {
    /// Settings from service configuration, loading a custom registry if one
    /// is configured.
    pub fn from_config(config: &GridderConfig) -> Result<Self> {
        let registry = match &config.collections {
            Some(path) => CollectionRegistry::from_yaml_file(path)
                .with_context(|| format!("Failed to load collections from {}", path.display()))?,
            None => CollectionRegistry::builtin()?.clone(),
        };
        Ok(Self {
            registry: Arc::new(registry),
            options: ScatterOptions {
                compression_level: config.compression_level,
            },
            timeout: config.timeout,
        })
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Grid `input` into `output` on the current thread.
    pub fn transform(&self, input: &Path, output: &Path) -> Result<()> {
        Gridder::new(&self.registry, GridStore::bundled())
            .with_options(self.options)
            .transform_file(input, output)
            .with_context(|| format!("Failed to grid {}", input.display()))
    }

    /// Grid on the blocking pool, bounded by the configured timeout.
    pub async fn transform_blocking(&self, input: PathBuf, output: PathBuf) -> Result<()> {
        let settings = self.clone();
        let task = tokio::task::spawn_blocking(move || settings.transform(&input, &output));

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| anyhow!("Gridding did not finish within {}s", limit.as_secs()))?,
            None => task.await,
        };
        joined.context("Gridding task panicked")?
    }
}

/// Runs requests with a given retriever and stager.
pub struct GridderAdapter<R, S> {
    retriever: R,
    stager: S,
    settings: GridSettings,
    work_dir: Option<PathBuf>,
}

impl<R: Retriever, S: Stager> GridderAdapter<R, S> {
    pub fn new(retriever: R, stager: S, settings: GridSettings) -> Self {
        Self {
            retriever,
            stager,
            settings,
            work_dir: None,
        }
    }

    /// Create per-request temporary directories under `dir`.
    pub fn with_work_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.work_dir = dir;
        self
    }

    /// Process one request. The failure is logged before it is returned.
    #[instrument(skip(self, request), fields(source = %request.source))]
    pub async fn process(&self, request: &GridRequest) -> Result<StagedOutput, ServiceError> {
        match self.run(request).await {
            Ok(output) => {
                info!(url = %output.url, "Request complete");
                Ok(output)
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Request failed");
                Err(ServiceError::from(e))
            }
        }
    }

    async fn run(&self, request: &GridRequest) -> Result<StagedOutput> {
        let working_dir = match &self.work_dir {
            Some(dir) => tempfile::tempdir_in(dir),
            None => tempfile::tempdir(),
        }
        .context("Failed to create working directory")?;

        let input = self
            .retriever
            .download(
                &request.source,
                working_dir.path(),
                request.access_token.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to retrieve {}", request.source))?;

        let target_name = output_file_name(&request.source)?;
        let working_output = working_dir.path().join(WORKING_FILE_NAME);
        self.settings
            .transform_blocking(input, working_output.clone())
            .await?;

        let url = self
            .stager
            .stage(
                &working_output,
                &target_name,
                NETCDF4_CONTENT_TYPE,
                &request.staging_location,
            )
            .await?;

        Ok(StagedOutput {
            url,
            title: target_name,
            media_type: NETCDF4_CONTENT_TYPE,
        })
    }
}
