//! One-time loading stage: descriptor, catalog snapshot, and platforms.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use droidplan_core::android_sdk::AndroidSdkCatalog;
use droidplan_core::catalog::{CatalogFile, CatalogSnapshot};
use droidplan_core::config::GlobalConfig;
use droidplan_core::context::ResolutionContext;
use droidplan_core::descriptor::Descriptor;
use droidplan_core::platform::PlatformFetcher;
use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::engine::ResolutionInput;

/// Inputs to the loading stage beyond the descriptor path.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Catalog file overriding the descriptor's `project.catalog`.
    pub catalog_path: Option<PathBuf>,
    /// Installed SDK platforms layered under the catalog file.
    pub android_sdk: Option<AndroidSdkCatalog>,
    pub global: GlobalConfig,
    pub timeout: Duration,
}

impl LoadOptions {
    pub fn new(global: GlobalConfig) -> Self {
        Self {
            catalog_path: None,
            android_sdk: None,
            timeout: Duration::from_secs(global.resolve.load_timeout_secs),
            global,
        }
    }
}

/// Load everything a run needs, synchronously.
///
/// Inline platforms are used as declared; the rest go through `fetcher` in
/// declaration order, with `cancel` checked before each fetch.
pub fn load_project(
    path: &Path,
    opts: &LoadOptions,
    fetcher: &dyn PlatformFetcher,
    cancel: &CancellationToken,
) -> ResolveResult<ResolutionInput> {
    let descriptor = Descriptor::from_path(path)?;
    tracing::debug!("loaded descriptor {}", path.display());
    load_descriptor(path, descriptor, opts, fetcher, cancel)
}

/// [`load_project`] for a descriptor that was already read from `path`.
pub fn load_descriptor(
    path: &Path,
    descriptor: Descriptor,
    opts: &LoadOptions,
    fetcher: &dyn PlatformFetcher,
    cancel: &CancellationToken,
) -> ResolveResult<ResolutionInput> {
    let context = ResolutionContext::from_config(&opts.global, &descriptor);

    let base = path.parent().unwrap_or(Path::new("."));
    let catalog_path = opts.catalog_path.clone().or_else(|| {
        descriptor
            .project
            .catalog
            .as_ref()
            .map(|c| droidplan_util::fs::resolve_relative(base, Path::new(c)))
    });

    let mut catalog = match &catalog_path {
        Some(p) => {
            tracing::debug!("loading catalog {}", p.display());
            CatalogSnapshot::capture(&CatalogFile::from_path(p)?)
        }
        None => CatalogSnapshot::default(),
    };
    if let Some(sdk) = &opts.android_sdk {
        tracing::debug!(
            "layering {} installed SDK platforms from {}",
            sdk.installed_platforms.len(),
            sdk.home.display()
        );
        catalog.layer(sdk);
    }

    let mut platforms = Vec::with_capacity(descriptor.platforms.len());
    for import in &descriptor.platforms {
        if cancel.is_cancelled() {
            return Err(DroidplanError::Cancelled);
        }
        match import.inline()? {
            Some(platform) => platforms.push(platform),
            None => {
                let coordinate = import.to_coordinate()?;
                tracing::debug!("fetching platform {coordinate}");
                platforms.push(fetcher.fetch(&coordinate)?);
            }
        }
    }

    Ok(ResolutionInput {
        descriptor,
        catalog,
        platforms,
        context,
    })
}

/// [`load_project`] on the blocking pool, bounded by `opts.timeout` and
/// stopped early when `cancel` fires.
///
/// The descriptor is read once inside the bound, and `make_fetcher` builds
/// the platform fetcher from it.
pub async fn load_project_with_timeout<F>(
    path: PathBuf,
    opts: LoadOptions,
    make_fetcher: F,
    cancel: CancellationToken,
) -> ResolveResult<ResolutionInput>
where
    F: FnOnce(&Descriptor) -> Arc<dyn PlatformFetcher> + Send + 'static,
{
    let timeout = opts.timeout;
    let child = cancel.child_token();
    let task_token = child.clone();
    let handle = tokio::task::spawn_blocking(move || -> ResolveResult<ResolutionInput> {
        let descriptor = Descriptor::from_path(&path)?;
        tracing::debug!("loaded descriptor {}", path.display());
        let fetcher = make_fetcher(&descriptor);
        load_descriptor(&path, descriptor, &opts, fetcher.as_ref(), &task_token)
    });

    tokio::select! {
        _ = cancel.cancelled() => Err(DroidplanError::Cancelled),
        joined = tokio::time::timeout(timeout, handle) => match joined {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(DroidplanError::Generic {
                message: format!("loading task failed: {e}"),
            }),
            Err(_) => {
                child.cancel();
                Err(DroidplanError::Timeout {
                    what: "Loading the project".to_string(),
                    seconds: timeout.as_secs(),
                })
            }
        },
    }
}
