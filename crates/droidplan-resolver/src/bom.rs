//! Platform (BOM) alignment: assigns versions to unversioned dependencies
//! from an ordered list of imported platforms.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::platform::Platform;
use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::warnings::ShadowingWarning;

/// Why a dependency ended up with its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VersionSource {
    /// Declared with a version.
    Explicit,
    /// Managed by the named platform.
    Platform { coordinate: String },
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Platform { coordinate } => write!(f, "platform {coordinate}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedVersion {
    pub version: String,
    pub source: VersionSource,
}

/// Result of aligning one dependency list.
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// `group:artifact` to aligned version.
    pub versions: BTreeMap<String, AlignedVersion>,
    pub warnings: Vec<ShadowingWarning>,
}

impl Alignment {
    /// Plain `group:artifact -> version` view for a build plan.
    pub fn resolved(&self) -> BTreeMap<String, String> {
        self.versions
            .iter()
            .map(|(key, aligned)| (key.clone(), aligned.version.clone()))
            .collect()
    }
}

/// Align `deps` against `platforms`.
///
/// An explicit version always wins. Otherwise the first platform (in
/// declaration order) that manages the coordinate provides it, and any later
/// platform pinning a different version is reported as shadowed.
pub fn align(deps: &[DependencyCoordinate], platforms: &[Platform]) -> ResolveResult<Alignment> {
    let mut alignment = Alignment::default();

    for dep in dedup_later_wins(deps) {
        let key = dep.key();
        if let Some(version) = &dep.version {
            alignment.versions.insert(
                key,
                AlignedVersion {
                    version: version.clone(),
                    source: VersionSource::Explicit,
                },
            );
            continue;
        }

        let mut providers = platforms
            .iter()
            .filter_map(|p| p.version_of(&key).map(|v| (p, v)));
        let Some((used, used_version)) = providers.next() else {
            return Err(DroidplanError::UnmanagedDependency { coordinate: key });
        };

        let shadowed: Vec<(String, String)> = providers
            .filter(|(_, v)| *v != used_version)
            .map(|(p, v)| (p.coordinate.to_string(), v.to_string()))
            .collect();
        if !shadowed.is_empty() {
            let warning = ShadowingWarning {
                coordinate: key.clone(),
                used_platform: used.coordinate.to_string(),
                used_version: used_version.to_string(),
                shadowed,
            };
            tracing::warn!("{warning}");
            alignment.warnings.push(warning);
        }

        alignment.versions.insert(
            key,
            AlignedVersion {
                version: used_version.to_string(),
                source: VersionSource::Platform {
                    coordinate: used.coordinate.to_string(),
                },
            },
        );
    }

    Ok(alignment)
}

/// Collapse repeated `group:artifact` entries: the later declaration replaces
/// the earlier one but keeps its position.
fn dedup_later_wins(deps: &[DependencyCoordinate]) -> Vec<&DependencyCoordinate> {
    let mut out: Vec<&DependencyCoordinate> = Vec::with_capacity(deps.len());
    for dep in deps {
        match out.iter_mut().find(|d| d.key() == dep.key()) {
            Some(slot) => *slot = dep,
            None => out.push(dep),
        }
    }
    out
}
