//! Platforms (bills of materials): version pins for families of libraries,
//! imported by coordinate instead of restating every version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::dependency::DependencyCoordinate;

/// A `[[platforms]]` entry in `Droidplan.toml`.
///
/// When `members` is given the platform is defined inline and never fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformImport {
    pub coordinate: String,
    #[serde(default)]
    pub members: Option<BTreeMap<String, String>>,
}

impl PlatformImport {
    /// Parse the coordinate; platforms must always pin a version.
    pub fn to_coordinate(&self) -> ResolveResult<DependencyCoordinate> {
        let coord = DependencyCoordinate::parse(&self.coordinate)?;
        if coord.version.is_none() {
            return Err(DroidplanError::Descriptor {
                message: format!("Platform '{}' must pin a version", self.coordinate),
            });
        }
        Ok(coord)
    }

    /// The inline platform, if members were declared in the descriptor.
    pub fn inline(&self) -> ResolveResult<Option<Platform>> {
        match &self.members {
            Some(members) => Ok(Some(Platform::new(self.to_coordinate()?, members.clone()))),
            None => Ok(None),
        }
    }
}

/// A loaded platform: its own pinned coordinate plus the versions it manages,
/// keyed by `group:artifact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(with = "coordinate_string")]
    pub coordinate: DependencyCoordinate,
    #[serde(default)]
    pub members: BTreeMap<String, String>,
}

impl Platform {
    pub fn new(coordinate: DependencyCoordinate, members: BTreeMap<String, String>) -> Self {
        Self {
            coordinate,
            members,
        }
    }

    /// Version pinned for `group:artifact`, if this platform manages it.
    pub fn version_of(&self, key: &str) -> Option<&str> {
        self.members.get(key).map(String::as_str)
    }

    /// Parse a platform file (`coordinate = "..."` plus a `[members]` table).
    pub fn parse(content: &str) -> ResolveResult<Self> {
        toml::from_str(content).map_err(|e| DroidplanError::Descriptor {
            message: format!("Failed to parse platform file: {e}"),
        })
    }
}

mod coordinate_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dependency::DependencyCoordinate;

    pub fn serialize<S: Serializer>(c: &DependencyCoordinate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(c)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DependencyCoordinate, D::Error> {
        let raw = String::deserialize(d)?;
        DependencyCoordinate::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Loads platform manifests by coordinate.
///
/// Implementations are called synchronously while the run is in its
/// loading stage and must report a miss as [`DroidplanError::PlatformNotFound`].
pub trait PlatformFetcher: Send + Sync {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform>;
}

/// Platforms stored as TOML files under `<root>/<group path>/<artifact>/<version>.toml`.
#[derive(Debug, Clone)]
pub struct LocalPlatformStore {
    root: PathBuf,
}

impl LocalPlatformStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn path_for(&self, coordinate: &DependencyCoordinate) -> PathBuf {
        self.root
            .join(coordinate.group.replace('.', "/"))
            .join(&coordinate.artifact)
            .join(format!("{}.toml", coordinate.version.as_deref().unwrap_or_default()))
    }

    /// Persist a platform so later runs can load it offline.
    pub fn store(&self, platform: &Platform) -> ResolveResult<PathBuf> {
        let path = self.path_for(&platform.coordinate);
        let content = toml::to_string_pretty(platform).map_err(|e| DroidplanError::Generic {
            message: format!("Failed to serialize platform {}: {e}", platform.coordinate),
        })?;
        droidplan_util::fs::write_with_parents(&path, &content)?;
        Ok(path)
    }
}

impl PlatformFetcher for LocalPlatformStore {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform> {
        let path = self.path_for(coordinate);
        if !path.is_file() {
            return Err(DroidplanError::PlatformNotFound {
                coordinate: coordinate.to_string(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let platform = Platform::parse(&content)?;
        tracing::debug!("loaded platform {} from {}", coordinate, path.display());
        Ok(platform)
    }
}

/// Tries several fetchers in order; the first one that knows the platform wins.
#[derive(Default)]
pub struct FetcherChain {
    fetchers: Vec<Box<dyn PlatformFetcher>>,
}

impl FetcherChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fetcher: Box<dyn PlatformFetcher>) {
        self.fetchers.push(fetcher);
    }

    pub fn with(mut self, fetcher: impl PlatformFetcher + 'static) -> Self {
        self.fetchers.push(Box::new(fetcher));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }
}

impl PlatformFetcher for FetcherChain {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform> {
        for fetcher in &self.fetchers {
            match fetcher.fetch(coordinate) {
                Err(DroidplanError::PlatformNotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(DroidplanError::PlatformNotFound {
            coordinate: coordinate.to_string(),
        })
    }
}
