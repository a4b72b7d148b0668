//! SMAP L2 gridder.
//!
//! `local` grids a file on disk; `service` retrieves a granule, grids it and
//! stages the result.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gridder_service::{
    GridRequest, GridSettings, GridderAdapter, GridderConfig, HttpRetriever, LogFormat,
    ObjectStager,
};

/// Default limit on a single HTTP download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Parser, Debug)]
#[command(name = "smap-l2-gridder")]
#[command(about = "Grid SMAP L2 swath products onto EASE-Grid 2.0")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Collection registry YAML (overrides GRIDDER_COLLECTIONS)
    #[arg(long, global = true)]
    collections: Option<PathBuf>,

    /// Deflate level 1-9 (overrides GRIDDER_COMPRESSION_LEVEL)
    #[arg(long, global = true)]
    compression_level: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grid a local file
    Local {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Retrieve, grid and stage one granule
    Service {
        /// URL or path of the input granule
        #[arg(long)]
        source: String,

        /// Staging directory, file:// or s3:// URL (overrides GRIDDER_STAGING_LOCATION)
        #[arg(long)]
        staging_location: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = GridderConfig::from_env()?;
    if let Some(path) = &args.collections {
        config.collections = Some(path.clone());
    }
    if let Some(level) = args.compression_level {
        config.compression_level = level;
    }
    config.validate()?;

    init_tracing(&args.log_level, config.log_format);

    let settings = GridSettings::from_config(&config)?;
    info!(
        collections = ?settings.registry().short_names().collect::<Vec<_>>(),
        compression_level = config.compression_level,
        "Loaded configuration"
    );

    match args.command {
        Command::Local { input, output } => {
            let (input_path, output_path) = (input.clone(), output.clone());
            settings.transform_blocking(input, output).await?;
            info!(
                input = %input_path.display(),
                output = %output_path.display(),
                "Gridded local file"
            );
        }
        Command::Service {
            source,
            staging_location,
        } => {
            let staging_location = staging_location
                .or_else(|| config.staging_location.clone())
                .context("No staging location: pass --staging-location or set GRIDDER_STAGING_LOCATION")?;

            let adapter = GridderAdapter::new(
                HttpRetriever::new(DOWNLOAD_TIMEOUT)?,
                ObjectStager,
                settings,
            )
            .with_work_dir(config.work_dir.clone());

            let request = GridRequest {
                source,
                staging_location,
                access_token: config.access_token.clone(),
            };
            let output = adapter.process(&request).await?;
            println!("{}", output.url);
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
