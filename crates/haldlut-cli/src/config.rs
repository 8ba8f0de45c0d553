//! Configuration resolution for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use haldlut_core::{BackendPreference, EngineConfig};

/// Directory `list` scans when none is given.
const DEFAULT_LUT_DIR: &str = "luts";

/// Engine settings in order of precedence: command-line flags, environment,
/// config file, defaults.
pub fn resolve_engine_config(
    config_file: Option<&Path>,
    backend: Option<BackendPreference>,
    no_parallel: bool,
) -> Result<EngineConfig> {
    let base = match config_file {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = base.with_env_overrides();
    if let Some(backend) = backend {
        config.backend = backend;
    }
    if no_parallel {
        config.parallel = false;
    }
    tracing::debug!(?config, "resolved engine config");
    Ok(config)
}

/// LUT directory from `HALDLUT_LUT_DIR`, else `./luts`.
pub fn default_lut_dir() -> PathBuf {
    std::env::var_os("HALDLUT_LUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LUT_DIR))
}
