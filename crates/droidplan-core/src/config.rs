use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use droidplan_util::errors::DroidplanError;

/// Global user configuration loaded from `~/.droidplan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Toolchain defaults applied to every project, e.g. `compileSdk = "35"`.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Extra Maven repositories consulted when fetching platforms.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_load_timeout", rename = "load-timeout-secs")]
    pub load_timeout_secs: u64,
    #[serde(default)]
    pub offline: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            load_timeout_secs: default_load_timeout(),
            offline: false,
        }
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_load_timeout() -> u64 {
    60
}

/// Platform cache settings from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.droidplan/platforms".to_string()
}

impl CacheConfig {
    /// The cache directory with a leading `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.strip_prefix("~/") {
            Some(rest) => dirs_path()
                .parent()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.dir)),
            None => PathBuf::from(&self.dir),
        }
    }
}

impl GlobalConfig {
    /// Load `~/.droidplan/config.toml`, or defaults if it doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load a config file from an explicit path, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| DroidplanError::Generic {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            DroidplanError::Generic {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

pub use droidplan_util::dirs_path;
