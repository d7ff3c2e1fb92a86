//! Android SDK discovery, used to contribute installed platforms to the
//! `compileSdk` and `targetSdk` catalog entries.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::VersionCatalogProvider;

/// Components whose available versions come from installed `android-N` platforms.
const SDK_COMPONENTS: &[&str] = &["compileSdk", "targetSdk"];

/// Installed platforms found in an Android SDK directory.
#[derive(Debug, Clone)]
pub struct AndroidSdkCatalog {
    pub home: PathBuf,
    pub installed_platforms: Vec<u32>,
}

impl AndroidSdkCatalog {
    /// Look for an SDK in the usual places and inventory it.
    pub fn discover() -> Option<Self> {
        let home = std::env::var("HOME").ok().map(PathBuf::from);
        let candidates: Vec<PathBuf> = [
            std::env::var("ANDROID_HOME").ok().map(PathBuf::from),
            std::env::var("ANDROID_SDK_ROOT").ok().map(PathBuf::from),
            home.as_ref().map(|h| h.join("Android/Sdk")),
            home.as_ref().map(|h| h.join("Library/Android/sdk")),
        ]
        .into_iter()
        .flatten()
        .collect();

        candidates
            .into_iter()
            .find(|dir| dir.is_dir())
            .map(|dir| Self::from_home(&dir))
    }

    /// Scan `<home>/platforms` for `android-N` directories.
    pub fn from_home(home: &Path) -> Self {
        let mut installed_platforms: Vec<u32> = fs::read_dir(home.join("platforms"))
            .into_iter()
            .flatten()
            .filter_map(|e| {
                let name = e.ok()?.file_name().to_string_lossy().to_string();
                name.strip_prefix("android-")?.parse().ok()
            })
            .collect();
        installed_platforms.sort_unstable();
        tracing::debug!(
            "android sdk at {} has platforms {:?}",
            home.display(),
            installed_platforms
        );

        Self {
            home: home.to_path_buf(),
            installed_platforms,
        }
    }
}

impl VersionCatalogProvider for AndroidSdkCatalog {
    fn components(&self) -> Vec<String> {
        if self.installed_platforms.is_empty() {
            return Vec::new();
        }
        SDK_COMPONENTS.iter().map(|c| c.to_string()).collect()
    }

    fn list_available(&self, component: &str) -> Vec<String> {
        if !SDK_COMPONENTS.contains(&component) {
            return Vec::new();
        }
        self.installed_platforms.iter().map(u32::to_string).collect()
    }

    fn default_version(&self, _component: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventories_installed_platforms() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["android-35", "android-33", "android-34-ext", "sources"] {
            fs::create_dir_all(tmp.path().join("platforms").join(dir)).unwrap();
        }
        let sdk = AndroidSdkCatalog::from_home(tmp.path());
        assert_eq!(sdk.installed_platforms, vec![33, 35]);
        assert_eq!(sdk.list_available("compileSdk"), vec!["33", "35"]);
        assert!(sdk.list_available("jvmTarget").is_empty());
    }

    #[test]
    fn empty_sdk_contributes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let sdk = AndroidSdkCatalog::from_home(tmp.path());
        assert!(sdk.components().is_empty());
    }
}
