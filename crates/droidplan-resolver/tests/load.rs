use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use droidplan_core::android_sdk::AndroidSdkCatalog;
use droidplan_core::catalog::VersionCatalogProvider;
use droidplan_core::config::GlobalConfig;
use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::descriptor::Descriptor;
use droidplan_core::platform::{FetcherChain, LocalPlatformStore, Platform, PlatformFetcher};
use droidplan_resolver::load::{load_project, load_project_with_timeout, LoadOptions};
use droidplan_util::errors::{DroidplanError, ResolveResult};

const DESCRIPTOR: &str = r#"
dependencies = ["org.example:core"]

[project]
name = "demo"
catalog = "versions/catalog.toml"

[[platforms]]
coordinate = "org.example:bom:1.0"

[variants.debug]
"#;

const CATALOG: &str = r#"
[components.compileSdk]
available = ["34"]
default = "34"
"#;

fn write_project(dir: &Path) -> std::path::PathBuf {
    let descriptor = dir.join("Droidplan.toml");
    std::fs::write(&descriptor, DESCRIPTOR).unwrap();
    std::fs::create_dir_all(dir.join("versions")).unwrap();
    std::fs::write(dir.join("versions/catalog.toml"), CATALOG).unwrap();
    descriptor
}

fn bom() -> Platform {
    let mut members = BTreeMap::new();
    members.insert("org.example:core".to_string(), "3.1.0".to_string());
    Platform::new(
        DependencyCoordinate::new("org.example", "bom", Some("1.0")),
        members,
    )
}

struct SlowFetcher;

impl PlatformFetcher for SlowFetcher {
    fn fetch(&self, coordinate: &DependencyCoordinate) -> ResolveResult<Platform> {
        std::thread::sleep(Duration::from_millis(400));
        Err(DroidplanError::PlatformNotFound {
            coordinate: coordinate.to_string(),
        })
    }
}

#[test]
fn loads_catalog_relative_to_descriptor_and_fetches_platforms() {
    let project = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let store = LocalPlatformStore::new(store_dir.path());
    store.store(&bom()).unwrap();

    let input = load_project(
        &write_project(project.path()),
        &LoadOptions::new(GlobalConfig::default()),
        &store,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(input.platforms, vec![bom()]);
    assert_eq!(input.catalog.list_available("compileSdk"), vec!["34"]);
    assert_eq!(input.catalog.default_version("compileSdk").as_deref(), Some("34"));
}

#[test]
fn missing_platform_is_reported() {
    let project = tempfile::tempdir().unwrap();
    let err = load_project(
        &write_project(project.path()),
        &LoadOptions::new(GlobalConfig::default()),
        &FetcherChain::new(),
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, DroidplanError::PlatformNotFound { .. }));
}

#[test]
fn catalog_override_and_sdk_layering() {
    let project = tempfile::tempdir().unwrap();
    let descriptor = write_project(project.path());
    let other = project.path().join("other.toml");
    std::fs::write(
        &other,
        "[components.compileSdk]\navailable = [\"33\"]\ndefault = \"33\"\n",
    )
    .unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let store = LocalPlatformStore::new(store_dir.path());
    store.store(&bom()).unwrap();

    let mut opts = LoadOptions::new(GlobalConfig::default());
    opts.catalog_path = Some(other);
    opts.android_sdk = Some(AndroidSdkCatalog {
        home: project.path().to_path_buf(),
        installed_platforms: vec![33, 35],
    });

    let input = load_project(&descriptor, &opts, &store, &CancellationToken::new()).unwrap();
    assert_eq!(input.catalog.list_available("compileSdk"), vec!["33", "35"]);
    assert_eq!(input.catalog.default_version("compileSdk").as_deref(), Some("33"));
}

#[test]
fn cancelled_before_fetch() {
    let project = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = load_project(
        &write_project(project.path()),
        &LoadOptions::new(GlobalConfig::default()),
        &SlowFetcher,
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, DroidplanError::Cancelled));
}

#[tokio::test]
async fn slow_loading_times_out() {
    let project = tempfile::tempdir().unwrap();
    let mut opts = LoadOptions::new(GlobalConfig::default());
    opts.timeout = Duration::from_millis(50);

    let err = load_project_with_timeout(
        write_project(project.path()),
        opts,
        |_: &Descriptor| Arc::new(SlowFetcher) as Arc<dyn PlatformFetcher>,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DroidplanError::Timeout { .. }));
}

#[tokio::test]
async fn loading_can_be_cancelled() {
    let project = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = load_project_with_timeout(
        write_project(project.path()),
        LoadOptions::new(GlobalConfig::default()),
        |_: &Descriptor| Arc::new(SlowFetcher) as Arc<dyn PlatformFetcher>,
        cancel,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DroidplanError::Cancelled));
}

#[tokio::test]
async fn fetcher_is_built_from_the_loaded_descriptor() {
    let project = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    LocalPlatformStore::new(store_dir.path()).store(&bom()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let store_path = store_dir.path().to_path_buf();
    let input = load_project_with_timeout(
        write_project(project.path()),
        LoadOptions::new(GlobalConfig::default()),
        move |descriptor: &Descriptor| {
            record.lock().unwrap().push(descriptor.project.name.clone());
            Arc::new(LocalPlatformStore::new(&store_path)) as Arc<dyn PlatformFetcher>
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["demo".to_string()]);
    assert_eq!(input.platforms, vec![bom()]);
}
