//! On-disk POM cache mirroring the Maven repository layout.

use std::fs;
use std::path::{Path, PathBuf};

use droidplan_util::errors::ResolveResult;

use crate::repository::MavenRepository;

/// Raw POM files under `<root>/<group path>/<artifact>/<version>/`.
#[derive(Debug, Clone)]
pub struct PomCache {
    root: PathBuf,
}

impl PomCache {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pom_path(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.root
            .join(MavenRepository::coordinate_path(group, artifact, version))
            .join(format!("{artifact}-{version}.pom"))
    }

    /// The cached POM text, if present.
    pub fn get(&self, group: &str, artifact: &str, version: &str) -> Option<String> {
        fs::read_to_string(self.pom_path(group, artifact, version)).ok()
    }

    pub fn put(&self, group: &str, artifact: &str, version: &str, xml: &str) -> ResolveResult<PathBuf> {
        let path = self.pom_path(group, artifact, version);
        droidplan_util::fs::write_with_parents(&path, xml)?;
        Ok(path)
    }
}
