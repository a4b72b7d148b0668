//! Service configuration from environment variables.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use l2_gridder::DEFAULT_COMPRESSION_LEVEL;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("Unknown log format '{}', expected text or json", other),
        }
    }
}

/// Runtime settings for the gridder service.
#[derive(Debug, Clone, PartialEq)]
pub struct GridderConfig {
    /// Parent of the per-request temporary directories. System temp if unset.
    pub work_dir: Option<PathBuf>,

    /// Where gridded outputs are staged: a directory, `file://` or `s3://` URL.
    pub staging_location: Option<String>,

    /// Bearer token sent with HTTP downloads.
    pub access_token: Option<String>,

    /// Collection registry YAML replacing the built-in one.
    pub collections: Option<PathBuf>,

    /// Limit on the gridding step of one request.
    pub timeout: Option<Duration>,

    /// Deflate level for numeric output variables.
    pub compression_level: i32,

    pub log_format: LogFormat,
}

impl Default for GridderConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            staging_location: None,
            access_token: None,
            collections: None,
            timeout: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            log_format: LogFormat::Text,
        }
    }
}

impl GridderConfig {
    /// Load configuration from `GRIDDER_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = get("GRIDDER_TIMEOUT_SECS")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("GRIDDER_TIMEOUT_SECS is not a number: {}", v))
            })
            .transpose()?
            .map(Duration::from_secs);

        let compression_level = get("GRIDDER_COMPRESSION_LEVEL")
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .with_context(|| format!("GRIDDER_COMPRESSION_LEVEL is not a number: {}", v))
            })
            .transpose()?
            .unwrap_or(DEFAULT_COMPRESSION_LEVEL);

        let log_format = get("GRIDDER_LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            work_dir: get("GRIDDER_WORK_DIR").map(PathBuf::from),
            staging_location: get("GRIDDER_STAGING_LOCATION"),
            access_token: get("GRIDDER_ACCESS_TOKEN"),
            collections: get("GRIDDER_COLLECTIONS").map(PathBuf::from),
            timeout,
            compression_level,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.compression_level) {
            bail!(
                "Compression level must be between 1 and 9, got {}",
                self.compression_level
            );
        }
        if self.timeout == Some(Duration::ZERO) {
            bail!("Timeout must be greater than zero");
        }
        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                bail!("Work directory {} does not exist", dir.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<GridderConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GridderConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, GridderConfig::default());
        assert_eq!(config.compression_level, 6);
    }

    #[test]
    fn test_all_values() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().to_str().unwrap();
        let config = config(&[
            ("GRIDDER_WORK_DIR", work_dir),
            ("GRIDDER_STAGING_LOCATION", "s3://staging/results/"),
            ("GRIDDER_ACCESS_TOKEN", "token"),
            ("GRIDDER_COLLECTIONS", "/etc/gridder/collections.yaml"),
            ("GRIDDER_TIMEOUT_SECS", "600"),
            ("GRIDDER_COMPRESSION_LEVEL", "9"),
            ("GRIDDER_LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.work_dir, Some(dir.path().to_path_buf()));
        assert_eq!(config.staging_location.as_deref(), Some("s3://staging/results/"));
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(
            config.collections,
            Some(PathBuf::from("/etc/gridder/collections.yaml"))
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config(&[("GRIDDER_ACCESS_TOKEN", ""), ("GRIDDER_TIMEOUT_SECS", " ")]).unwrap();
        assert_eq!(config.access_token, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_compression_level_range() {
        assert!(config(&[("GRIDDER_COMPRESSION_LEVEL", "0")]).is_err());
        assert!(config(&[("GRIDDER_COMPRESSION_LEVEL", "10")]).is_err());
        assert!(config(&[("GRIDDER_COMPRESSION_LEVEL", "high")]).is_err());
        assert!(config(&[("GRIDDER_COMPRESSION_LEVEL", "1")]).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("GRIDDER_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("GRIDDER_TIMEOUT_SECS", "-5")]).is_err());
        assert!(config(&[("GRIDDER_LOG_FORMAT", "xml")]).is_err());
        assert!(config(&[("GRIDDER_WORK_DIR", "/nonexistent/gridder/work")]).is_err());
    }
}
