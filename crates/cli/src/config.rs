//! CLI configuration utilities

use anyhow::{Context, Result};
use busadmin_core::{SessionConfig, ValidateConfig};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "BUSADMIN";

/// Resolve the data directory: flag, then `BUSADMIN_STATE_DIR`, then the
/// platform data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(dir) = std::env::var("BUSADMIN_STATE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("busadmin")
        }
    })
}

/// Load the session configuration.
///
/// Layers, lowest first: built-in defaults, the config file (`path`, or
/// `<data-dir>/config.json` when present), `BUSADMIN_*` environment
/// variables, then `base_url` from the command line.
pub fn load_session_config(
    path: Option<&Path>,
    data_dir: &Path,
    base_url: Option<&str>,
) -> Result<SessionConfig> {
    let mut builder = Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            let default_path = data_dir.join(CONFIG_FILE);
            builder = builder.add_source(File::from(default_path).required(false));
        }
    }

    builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true),
        )
        .set_override_option("base_url", base_url)?;

    let config: SessionConfig = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;
    config.validate()?;

    Ok(config)
}

/// Save session configuration to JSON file
pub fn save_session_config<P: AsRef<Path>>(config: &SessionConfig, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    save_session_config(&SessionConfig::default(), path)
}
