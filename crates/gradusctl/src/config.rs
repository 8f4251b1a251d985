//! CLI configuration.
//!
//! Read from `<config dir>/gradus/config.toml`; every field is optional and
//! a missing or broken file silently falls back to defaults. The data
//! directory override chain is: `--data-dir` flag, `GRADUS_DATA_DIR`
//! environment variable, config file, platform default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gradus_core::ProgramStore;

/// Storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding program.json
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Days shown by `history` when no --days is given
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

fn default_history_days() -> u32 {
    14
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtlConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl CtlConfig {
    /// Load from the user config path, falling back to defaults on any
    /// problem. Configuration must never stop the tool from starting.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("ignoring malformed config {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }
}

/// Path of the user config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gradus")
        .join("config.toml")
}

/// Resolve the program store through the override chain.
pub fn resolve_store(flag: Option<&Path>, config: &CtlConfig) -> ProgramStore {
    if let Some(dir) = flag {
        return ProgramStore::with_root(dir);
    }
    if let Ok(dir) = std::env::var("GRADUS_DATA_DIR") {
        if !dir.is_empty() {
            return ProgramStore::with_root(Path::new(&dir));
        }
    }
    if let Some(dir) = &config.storage.data_dir {
        return ProgramStore::with_root(dir);
    }
    ProgramStore::new(ProgramStore::default_path())
}
