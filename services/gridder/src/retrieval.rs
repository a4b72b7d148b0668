//! Fetching input granules into a working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Fetches a source reference into a local directory.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Place `source` inside `dir` and return the local path.
    async fn download(
        &self,
        source: &str,
        dir: &Path,
        access_token: Option<&str>,
    ) -> Result<PathBuf>;
}

/// Retrieves HTTP(S) URLs with reqwest and copies local files.
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str, target: &Path, access_token: Option<&str>) -> Result<()> {
        let mut request = self.client.get(url);
        if let Some(token) = access_token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let mut response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Download of {} failed with HTTP {}", url, status);
        }

        let mut file = fs::File::create(target)
            .await
            .with_context(|| format!("Failed to create {}", target.display()))?;
        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        debug!(bytes, "Wrote response body");
        Ok(())
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    #[instrument(skip(self, dir, access_token), fields(source = %source))]
    async fn download(
        &self,
        source: &str,
        dir: &Path,
        access_token: Option<&str>,
    ) -> Result<PathBuf> {
        let target = dir.join(source_file_name(source)?);

        if is_http(source) {
            self.fetch(source, &target, access_token).await?;
        } else {
            let local = local_path(source);
            fs::copy(&local, &target)
                .await
                .with_context(|| format!("Failed to copy {}", local.display()))?;
        }

        info!(path = %target.display(), "Retrieved input");
        Ok(target)
    }
}

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Filesystem path of a `file://` URL or plain path.
pub fn local_path(source: &str) -> PathBuf {
    PathBuf::from(source.strip_prefix("file://").unwrap_or(source))
}

/// Last path segment of a URL or path, without query or fragment.
pub fn source_file_name(source: &str) -> Result<String> {
    let without_query = source
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(source);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot determine a file name from {}", source))
}

/// Name of the gridded output for a source: `<stem>_regridded.nc`.
pub fn output_file_name(source: &str) -> Result<String> {
    let name = source_file_name(source)?;
    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&name);
    Ok(format!("{}_regridded.nc", stem))
}
