//! Assembles the platform fetcher used by the loading stage.

use std::path::Path;
use std::sync::Arc;

use droidplan_core::config::GlobalConfig;
use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::descriptor::Descriptor;
use droidplan_core::platform::{FetcherChain, LocalPlatformStore, Platform, PlatformFetcher};
use droidplan_maven::cache::PomCache;
use droidplan_maven::fetcher::MavenPlatformFetcher;
use droidplan_maven::repository::MavenRepository;
use droidplan_util::errors::ResolveResult;

/// Fetches from Maven and writes every hit into the local platform store so
/// later runs (and offline runs) find it there.
pub struct StoringFetcher {
    inner: MavenPlatformFetcher,
    store: LocalPlatformStore,
}

impl StoringFetcher {
    pub fn new(inner: MavenPlatformFetcher, store: LocalPlatformStore) -> Self {
        Self { inner, store }
    }
}

impl PlatformFetcher for StoringFetcher {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform> {
        let platform = self.inner.fetch(coordinate)?;
        match self.store.store(&platform) {
            Ok(path) => tracing::debug!("stored platform {coordinate} at {}", path.display()),
            Err(e) => tracing::warn!("could not store platform {coordinate}: {e}"),
        }
        Ok(platform)
    }
}

/// Repositories from the descriptor, then the global config. Google Maven and
/// Maven Central are used when neither names any.
pub fn repositories(descriptor: &Descriptor, global: &GlobalConfig) -> Vec<MavenRepository> {
    let mut repos: Vec<MavenRepository> = descriptor
        .repositories
        .iter()
        .map(|(name, entry)| MavenRepository::from_entry(name, entry))
        .collect();
    for (name, url) in &global.repositories {
        if !repos.iter().any(|r| &r.name == name) {
            repos.push(MavenRepository::new(name, url));
        }
    }
    if repos.is_empty() {
        repos.push(MavenRepository::google());
        repos.push(MavenRepository::maven_central());
    }
    repos
}

/// The local platform store first, then Maven unless `offline`.
pub fn platform_fetcher(
    descriptor: &Descriptor,
    global: &GlobalConfig,
    offline: bool,
) -> Arc<dyn PlatformFetcher> {
    let cache_root = global.cache.resolved_dir();
    let mut chain = FetcherChain::new().with(LocalPlatformStore::new(&cache_root));

    if offline {
        tracing::debug!("offline: platforms come from {} only", cache_root.display());
    } else {
        let maven = MavenPlatformFetcher::new(repositories(descriptor, global))
            .with_cache(PomCache::new(&pom_cache_dir(&cache_root)));
        chain.push(Box::new(StoringFetcher::new(
            maven,
            LocalPlatformStore::new(&cache_root),
        )));
    }
    Arc::new(chain)
}

fn pom_cache_dir(cache_root: &Path) -> std::path::PathBuf {
    cache_root.join("poms")
}
