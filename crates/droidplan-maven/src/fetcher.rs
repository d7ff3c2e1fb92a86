//! [`PlatformFetcher`] backed by Maven repositories.
//!
//! A platform's members are the versioned `dependencyManagement` entries of
//! its POM after parent inheritance and property interpolation, plus the
//! members of every nested BOM import. Entries the POM declares itself win
//! over imported ones, and earlier imports win over later ones.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use reqwest::blocking::Client;

use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::platform::{Platform, PlatformFetcher};
use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::cache::PomCache;
use crate::download;
use crate::pom::{self, Pom};
use crate::repository::MavenRepository;

/// Maximum depth of parent and import chains.
pub const MAX_POM_DEPTH: usize = 8;

pub struct MavenPlatformFetcher {
    repositories: Vec<MavenRepository>,
    cache: Option<PomCache>,
    client: OnceLock<Client>,
}

impl MavenPlatformFetcher {
    pub fn new(repositories: Vec<MavenRepository>) -> Self {
        Self {
            repositories,
            cache: None,
            client: OnceLock::new(),
        }
    }

    /// Read POMs from, and store downloaded POMs into, `cache`.
    pub fn with_cache(mut self, cache: PomCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn repositories(&self) -> &[MavenRepository] {
        &self.repositories
    }

    /// The client is built on first use so that it is created on the
    /// loading thread rather than inside the async runtime.
    fn client(&self) -> ResolveResult<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = download::build_client()?;
        Ok(self.client.get_or_init(|| client))
    }

    fn raw_pom(&self, group: &str, artifact: &str, version: &str) -> ResolveResult<Option<String>> {
        if let Some(xml) = self.cache.as_ref().and_then(|c| c.get(group, artifact, version)) {
            tracing::debug!("POM cache hit for {group}:{artifact}:{version}");
            return Ok(Some(xml));
        }
        if self.repositories.is_empty() {
            return Ok(None);
        }

        let client = self.client()?;
        for repo in &self.repositories {
            let url = repo.pom_url(group, artifact, version);
            tracing::debug!("fetching {url}");
            if let Some(xml) = download::download_text(client, repo, &url)? {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put(group, artifact, version, &xml) {
                        tracing::warn!("could not cache POM for {group}:{artifact}:{version}: {e}");
                    }
                }
                return Ok(Some(xml));
            }
        }
        Ok(None)
    }

    /// Parse a POM with its parent chain applied and properties resolved.
    fn effective_pom(&self, group: &str, artifact: &str, version: &str, depth: usize) -> ResolveResult<Pom> {
        let coordinate = format!("{group}:{artifact}:{version}");
        if depth > MAX_POM_DEPTH {
            return Err(DroidplanError::Generic {
                message: format!("POM chain is nested more than {MAX_POM_DEPTH} levels deep at {coordinate}"),
            });
        }
        let xml = self
            .raw_pom(group, artifact, version)?
            .ok_or_else(|| DroidplanError::PlatformNotFound {
                coordinate: coordinate.clone(),
            })?;
        let mut pom = pom::parse_pom(&xml)?;

        if let Some(parent) = pom.parent.clone() {
            let parent_pom = self
                .effective_pom(&parent.group_id, &parent.artifact_id, &parent.version, depth + 1)
                .map_err(|e| nested(&coordinate, "parent", e))?;
            pom.apply_parent(&parent_pom);
        }
        pom.resolve_properties();
        Ok(pom)
    }

    fn managed_members(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
        depth: usize,
    ) -> ResolveResult<BTreeMap<String, String>> {
        let pom = self.effective_pom(group, artifact, version, depth)?;
        let mut members = pom.managed_versions();

        for import in pom.bom_imports() {
            let Some(import_version) = &import.version else {
                tracing::warn!(
                    "{group}:{artifact}:{version} imports {} without a version, skipping",
                    import.key()
                );
                continue;
            };
            let nested_members = self
                .managed_members(&import.group_id, &import.artifact_id, import_version, depth + 1)
                .map_err(|e| nested(&format!("{group}:{artifact}:{version}"), "import", e))?;
            for (key, v) in nested_members {
                members.entry(key).or_insert(v);
            }
        }
        Ok(members)
    }
}

/// A missing parent or import is not a miss for the platform itself.
fn nested(coordinate: &str, relation: &str, error: DroidplanError) -> DroidplanError {
    match error {
        DroidplanError::PlatformNotFound { coordinate: missing } => DroidplanError::Generic {
            message: format!("{coordinate} references {relation} {missing}, which could not be found"),
        },
        other => other,
    }
}

impl PlatformFetcher for MavenPlatformFetcher {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform> {
        let version = coordinate
            .version
            .as_deref()
            .ok_or_else(|| DroidplanError::Descriptor {
                message: format!("Platform '{coordinate}' must pin a version"),
            })?;
        let members = self.managed_members(&coordinate.group, &coordinate.artifact, version, 0)?;
        tracing::debug!("platform {coordinate} manages {} artifacts", members.len());
        Ok(Platform::new(coordinate.clone(), members))
    }
}
