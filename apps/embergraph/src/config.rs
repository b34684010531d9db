//! # Configuration
//!
//! Resolves the data directory from, in order of precedence:
//! 1. the `--data-dir` flag
//! 2. the `EMBERGRAPH_DATA_DIR` environment variable
//! 3. `data_dir` in `embergraph.toml`
//! 4. the built-in default (`.embergraph`)

use embergraph_core::GraphError;
use embergraph_core::primitives::DEFAULT_DATA_DIR;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "EMBERGRAPH_DATA_DIR";

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "embergraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}

/// Load the config file.
///
/// A missing default file is not an error. A missing file that was asked for
/// explicitly is.
pub fn load_config(path: Option<&Path>) -> Result<Option<AppConfig>, GraphError> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(GraphError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| GraphError::IoError(format!("Cannot read {}: {}", path.display(), e)))?;
    let config: AppConfig = toml::from_str(&contents).map_err(|e| {
        GraphError::DeserializationError(format!("Invalid config {}: {}", path.display(), e))
    })?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}

/// Pick the data directory. `env` is the value of `DATA_DIR_ENV`, passed in
/// so callers decide where it comes from.
pub fn resolve_data_dir(
    flag: Option<&Path>,
    env: Option<String>,
    config: Option<&AppConfig>,
) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env.filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    config
        .and_then(|c| c.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
