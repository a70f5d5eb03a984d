//! CLI subcommands.

pub mod batch;
pub mod compare;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use comparador_core::ComparadorConfig;
use tracing::debug;

/// Output format shared by the commands.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("comparador")
        .join("config.json")
}

/// Load the explicit config file, else the default one if it exists, else
/// built-in defaults. The result is validated before use.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ComparadorConfig> {
    let config = match config_path {
        Some(path) => ComparadorConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                ComparadorConfig::from_file(&default_path)?
            } else {
                ComparadorConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}
