//! Locating and loading a project for the operations.

use std::path::{Path, PathBuf};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use droidplan_core::android_sdk::AndroidSdkCatalog;
use droidplan_core::config::GlobalConfig;
use droidplan_core::descriptor::{Descriptor, DESCRIPTOR_FILE};
use droidplan_resolver::engine::Engine;
use droidplan_resolver::load::{self, LoadOptions};
use droidplan_util::errors::DroidplanError;

/// Command-line overrides layered over the global config.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub global: GlobalConfig,
    /// Catalog file used instead of the descriptor's `project.catalog`.
    pub catalog: Option<PathBuf>,
    pub offline: bool,
    pub jobs: Option<usize>,
    pub android_sdk: Option<AndroidSdkCatalog>,
}

impl ProjectOptions {
    /// Options backed by `~/.droidplan/config.toml` and a discovered SDK.
    pub fn load() -> miette::Result<Self> {
        Ok(Self {
            global: GlobalConfig::load()?,
            android_sdk: AndroidSdkCatalog::discover(),
            ..Self::default()
        })
    }

    pub fn with_catalog(mut self, catalog: Option<PathBuf>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Use the SDK at `home` instead of the discovered one.
    pub fn with_android_sdk_home(mut self, home: Option<&Path>) -> Self {
        if let Some(home) = home {
            self.android_sdk = Some(AndroidSdkCatalog::from_home(home));
        }
        self
    }

    fn is_offline(&self) -> bool {
        self.offline || self.global.resolve.offline
    }
}

/// The `Droidplan.toml` governing `project_dir` or one of its parents.
pub fn descriptor_path(project_dir: &Path) -> miette::Result<PathBuf> {
    let root = droidplan_util::fs::find_ancestor_with(project_dir, DESCRIPTOR_FILE).ok_or_else(
        || DroidplanError::Generic {
            message: format!(
                "No {DESCRIPTOR_FILE} found in {} or any parent directory",
                project_dir.display()
            ),
        },
    )?;
    Ok(root.join(DESCRIPTOR_FILE))
}

/// Cancels its token on Ctrl-C for as long as it is alive.
///
/// One interrupt spans a whole operation, so a Ctrl-C during per-variant
/// resolution reaches the engine's checks between stages as well as the
/// loading stage.
pub struct Interrupt {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl Interrupt {
    /// Start listening for Ctrl-C. Must be called inside the runtime.
    pub fn listen() -> Self {
        let token = CancellationToken::new();
        let listener = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("interrupted, cancelling");
                    token.cancel();
                }
            })
        };
        Self { token, listener }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_listening(&self) -> bool {
        !self.listener.is_finished()
    }
}

impl Drop for Interrupt {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Load the project (bounded by the configured timeout, stopped by
/// `interrupt`) and run the structural checks.
pub async fn load_engine(
    project_dir: &Path,
    opts: &ProjectOptions,
    interrupt: &Interrupt,
) -> miette::Result<Engine> {
    let path = descriptor_path(project_dir)?;

    let mut load_opts = LoadOptions::new(opts.global.clone());
    load_opts.catalog_path = opts.catalog.clone();
    load_opts.android_sdk = opts.android_sdk.clone();

    let offline = opts.is_offline();
    let global = opts.global.clone();
    let make_fetcher = move |descriptor: &Descriptor| {
        crate::fetchers::platform_fetcher(descriptor, &global, offline)
    };

    droidplan_util::progress::status("Loading", &path.display().to_string());
    let pb = droidplan_util::progress::spinner("Reading catalog and platforms...");
    let loaded =
        load::load_project_with_timeout(path, load_opts, make_fetcher, interrupt.token()).await;
    pb.finish_and_clear();

    let mut input = loaded?;
    input.context.offline = offline;
    if let Some(jobs) = opts.jobs {
        input.context.jobs = jobs.max(1);
    }
    Ok(Engine::prepare(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_stops_listening_when_dropped() {
        let interrupt = Interrupt::listen();
        let token = interrupt.token();
        assert!(interrupt.is_listening());
        assert!(!token.is_cancelled());
        drop(interrupt);
        assert!(!token.is_cancelled());
    }
}
