//! Version catalogs: which versions of each toolchain component
//! (`compileSdk`, `jvmTarget`, `ndkVersion`, ...) are available, and which
//! one is the toolchain default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use droidplan_util::errors::{DroidplanError, ResolveResult};

/// Source of available component versions.
pub trait VersionCatalogProvider {
    /// Every component this provider knows about.
    fn components(&self) -> Vec<String>;

    /// Available versions for `component`, in the provider's order.
    fn list_available(&self, component: &str) -> Vec<String>;

    /// The toolchain default for `component`, if one is declared.
    fn default_version(&self, component: &str) -> Option<String>;
}

/// One component's entry in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersions {
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
}

/// A `catalog.toml` file:
///
/// ```toml
/// [components.compileSdk]
/// available = ["33", "34", "35"]
/// default = "35"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub components: BTreeMap<String, ComponentVersions>,
}

impl CatalogFile {
    /// Load and validate a catalog file.
    pub fn from_path(path: &Path) -> ResolveResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DroidplanError::Catalog {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ResolveResult<Self> {
        let catalog: Self = toml::from_str(content).map_err(|e| DroidplanError::Catalog {
            message: format!("Failed to parse catalog: {e}"),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> ResolveResult<()> {
        for (name, entry) in &self.components {
            if let Some(default) = &entry.default {
                if !entry.available.iter().any(|v| v == default) {
                    return Err(DroidplanError::Catalog {
                        message: format!(
                            "Default '{default}' for component '{name}' is not in its available list"
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl VersionCatalogProvider for CatalogFile {
    fn components(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }

    fn list_available(&self, component: &str) -> Vec<String> {
        self.components
            .get(component)
            .map(|c| c.available.clone())
            .unwrap_or_default()
    }

    fn default_version(&self, component: &str) -> Option<String> {
        self.components.get(component)?.default.clone()
    }
}

/// A frozen, read-only view of one or more providers, captured once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    entries: BTreeMap<String, ComponentVersions>,
}

impl CatalogSnapshot {
    /// Capture every component of `provider`.
    pub fn capture(provider: &dyn VersionCatalogProvider) -> Self {
        let mut snapshot = Self::default();
        snapshot.layer(provider);
        snapshot
    }

    /// Merge another provider underneath this snapshot: its versions are
    /// appended when missing, and its default is used only when none is set.
    pub fn layer(&mut self, provider: &dyn VersionCatalogProvider) {
        for component in provider.components() {
            let entry = self.entries.entry(component.clone()).or_default();
            for version in provider.list_available(&component) {
                if !entry.available.contains(&version) {
                    entry.available.push(version);
                }
            }
            if entry.default.is_none() {
                entry.default = provider.default_version(&component);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VersionCatalogProvider for CatalogSnapshot {
    fn components(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn list_available(&self, component: &str) -> Vec<String> {
        self.entries
            .get(component)
            .map(|c| c.available.clone())
            .unwrap_or_default()
    }

    fn default_version(&self, component: &str) -> Option<String> {
        self.entries.get(component)?.default.clone()
    }
}
