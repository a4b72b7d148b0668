//! Publishing gridded outputs to a staging location.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, local::LocalFileSystem, path::Path as ObjectPath, ObjectStore};
use tracing::{debug, info, instrument};

/// Media type of every staged output.
pub const NETCDF4_CONTENT_TYPE: &str = "application/x-netcdf4";

/// Copies a local file to a staging location and returns its URL.
#[async_trait]
pub trait Stager: Send + Sync {
    async fn stage(
        &self,
        local: &Path,
        target_name: &str,
        content_type: &str,
        location: &str,
    ) -> Result<String>;
}

/// A parsed staging location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingLocation {
    /// Directory on the local filesystem.
    Local(PathBuf),
    /// Bucket and key prefix (without trailing slash) in S3.
    S3 { bucket: String, prefix: String },
}

impl StagingLocation {
    pub fn parse(location: &str) -> Result<Self> {
        if let Some(rest) = location.strip_prefix("s3://") {
            let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(anyhow!("Staging location {} has no bucket", location));
            }
            return Ok(StagingLocation::S3 {
                bucket: bucket.to_string(),
                prefix: prefix.trim_matches('/').to_string(),
            });
        }
        let path = location.strip_prefix("file://").unwrap_or(location);
        if path.is_empty() {
            return Err(anyhow!("Staging location is empty"));
        }
        Ok(StagingLocation::Local(PathBuf::from(path)))
    }

    fn key(&self, target_name: &str) -> String {
        match self {
            StagingLocation::S3 { prefix, .. } if !prefix.is_empty() => {
                format!("{}/{}", prefix, target_name)
            }
            _ => target_name.to_string(),
        }
    }

    /// URL the object will be reachable at once staged.
    pub fn url(&self, target_name: &str) -> String {
        match self {
            StagingLocation::Local(dir) => format!("file://{}", dir.join(target_name).display()),
            StagingLocation::S3 { bucket, .. } => {
                format!("s3://{}/{}", bucket, self.key(target_name))
            }
        }
    }

    fn store(&self) -> Result<Arc<dyn ObjectStore>> {
        match self {
            StagingLocation::Local(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                Ok(Arc::new(LocalFileSystem::new_with_prefix(dir)?))
            }
            StagingLocation::S3 { bucket, .. } => {
                // Credentials and region come from the standard AWS_* variables.
                let store = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .context("Failed to create S3 client")?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Stages through `object_store`, local or S3 depending on the location.
#[derive(Debug, Default, Clone)]
pub struct ObjectStager;

#[async_trait]
impl Stager for ObjectStager {
    #[instrument(skip(self, local), fields(local = %local.display()))]
    async fn stage(
        &self,
        local: &Path,
        target_name: &str,
        content_type: &str,
        location: &str,
    ) -> Result<String> {
        let location = StagingLocation::parse(location)?;
        let store = location.store()?;

        let data = tokio::fs::read(local)
            .await
            .with_context(|| format!("Failed to read {}", local.display()))?;
        let size = data.len();
        let key = ObjectPath::from(location.key(target_name));
        debug!(size, key = %key, content_type, "Writing object");

        store
            .put(&key, Bytes::from(data).into())
            .await
            .with_context(|| format!("Failed to stage {}", target_name))?;

        let url = location.url(target_name);
        info!(url = %url, size, "Staged output");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            StagingLocation::parse("s3://staging-bucket/public/job-1/").unwrap(),
            StagingLocation::S3 {
                bucket: "staging-bucket".to_string(),
                prefix: "public/job-1".to_string()
            }
        );
        assert_eq!(
            StagingLocation::parse("s3://bucket").unwrap(),
            StagingLocation::S3 {
                bucket: "bucket".to_string(),
                prefix: String::new()
            }
        );
        assert_eq!(
            StagingLocation::parse("file:///tmp/out").unwrap(),
            StagingLocation::Local(PathBuf::from("/tmp/out"))
        );
        assert!(StagingLocation::parse("s3:///prefix").is_err());
        assert!(StagingLocation::parse("").is_err());
    }

    #[test]
    fn test_urls() {
        let s3 = StagingLocation::parse("s3://bucket/a/b").unwrap();
        assert_eq!(s3.url("out.nc"), "s3://bucket/a/b/out.nc");
        let root = StagingLocation::parse("s3://bucket/").unwrap();
        assert_eq!(root.url("out.nc"), "s3://bucket/out.nc");
        let local = StagingLocation::parse("/data/staged").unwrap();
        assert_eq!(local.url("out.nc"), "file:///data/staged/out.nc");
    }

    #[tokio::test]
    async fn test_stage_to_local_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("working_gridded.nc");
        std::fs::write(&source, b"gridded").unwrap();
        let staging = dir.path().join("staged");

        let url = ObjectStager
            .stage(
                &source,
                "granule_regridded.nc",
                NETCDF4_CONTENT_TYPE,
                staging.to_str().unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(url, format!("file://{}", staging.join("granule_regridded.nc").display()));
        assert_eq!(
            std::fs::read(staging.join("granule_regridded.nc")).unwrap(),
            b"gridded"
        );
    }
}
