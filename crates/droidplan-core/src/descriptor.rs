use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::dependency::{DependencyCoordinate, DependencySpec};
use crate::platform::PlatformImport;
use crate::plugin::PluginDeclaration;
use crate::requirement::{VersionRequirement, VersionValue};
use crate::variant::{AttributePolicy, BuildVariant, VariantTable};

/// File name of the project descriptor.
pub const DESCRIPTOR_FILE: &str = "Droidplan.toml";

/// The parsed representation of a `Droidplan.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub project: ProjectMetadata,

    /// Plugins in declaration order; the order breaks sequencing ties.
    #[serde(default)]
    pub plugins: Vec<PluginDeclaration>,

    /// Project-wide toolchain requirements (`compileSdk`, `jvmTarget`, ...).
    #[serde(default)]
    pub versions: BTreeMap<String, VersionValue>,

    #[serde(default)]
    pub toolchain: ToolchainSection,

    /// Platform imports, in lookup order.
    #[serde(default)]
    pub platforms: Vec<PlatformImport>,

    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,

    #[serde(default)]
    pub variants: BTreeMap<String, VariantTable>,

    #[serde(default)]
    pub attributes: AttributePolicy,

    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryEntry>,
}

/// Project identity from the `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, rename = "application-id")]
    pub application_id: Option<String>,
    #[serde(default, rename = "version-code")]
    pub version_code: Option<u32>,
    #[serde(default, rename = "version-name")]
    pub version_name: Option<String>,
    /// Path to the version catalog, relative to the descriptor.
    #[serde(default)]
    pub catalog: Option<String>,
}

/// Explicit toolchain context from `[toolchain]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolchainSection {
    /// Defaults used when a component has no requirement.
    #[serde(default)]
    pub defaults: BTreeMap<String, VersionValue>,

    /// Groups of components that must resolve to the same version.
    #[serde(default)]
    pub linked: Option<Vec<Vec<String>>>,
}

/// A Maven repository reference, either a URL string or a detailed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl Descriptor {
    /// Load and parse a `Droidplan.toml` file.
    ///
    /// `${env:VAR}` references are resolved first, using `.droidplan.env`
    /// next to the descriptor and then the process environment.
    pub fn from_path(path: &Path) -> ResolveResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DroidplanError::Descriptor {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let env_vars =
            crate::properties::load_env_file(&dir.join(crate::properties::ENV_FILE))
                .unwrap_or_default();
        let resolved = crate::properties::interpolate(&content, &env_vars);

        Self::parse(&resolved)
    }

    /// Parse descriptor TOML (no interpolation).
    pub fn parse(content: &str) -> ResolveResult<Self> {
        toml::from_str(content).map_err(|e| DroidplanError::Descriptor {
            message: format!("Failed to parse {DESCRIPTOR_FILE}: {e}"),
        })
    }

    /// Project-level dependency coordinates, in declaration order.
    pub fn coordinates(&self) -> ResolveResult<Vec<DependencyCoordinate>> {
        self.dependencies.iter().map(DependencySpec::to_coordinate).collect()
    }

    /// Variants as flat declarations, sorted by name.
    pub fn build_variants(&self) -> Vec<BuildVariant> {
        self.variants
            .iter()
            .map(|(name, table)| BuildVariant::from_table(name, table))
            .collect()
    }

    /// Requirements from `[versions]`.
    pub fn project_requirements(&self) -> Vec<VersionRequirement> {
        self.versions
            .iter()
            .map(|(component, value)| VersionRequirement::new(component, &value.as_expr(), "[versions]"))
            .collect()
    }

    /// Checks that do not need any graph algorithm: unique plugin ids,
    /// well-formed coordinates, and at least one variant.
    pub fn validate(&self) -> ResolveResult<()> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.id.as_str()) {
                return Err(DroidplanError::Descriptor {
                    message: format!("Plugin '{}' is declared more than once", plugin.id),
                });
            }
        }
        self.coordinates()?;
        for import in &self.platforms {
            import.to_coordinate()?;
        }
        for (name, table) in &self.variants {
            for spec in &table.dependencies {
                spec.to_coordinate().map_err(|e| DroidplanError::Descriptor {
                    message: format!("In variant '{name}': {e}"),
                })?;
            }
        }
        if self.variants.is_empty() {
            return Err(DroidplanError::Descriptor {
                message: "No variants declared; add at least one [variants.<name>] table"
                    .to_string(),
            });
        }
        Ok(())
    }
}
