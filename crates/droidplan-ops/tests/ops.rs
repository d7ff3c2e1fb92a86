use std::fs;
use std::path::{Path, PathBuf};

use droidplan_core::config::GlobalConfig;
use droidplan_core::plan::PlanFormat;
use droidplan_ops::ops_resolve::ResolveRequest;
use droidplan_ops::project::ProjectOptions;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

/// A project directory holding the Firebase app fixture and its catalog.
fn firebase_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::copy(fixture("firebase-app.toml"), tmp.path().join("Droidplan.toml")).unwrap();
    fs::copy(fixture("catalog.toml"), tmp.path().join("catalog.toml")).unwrap();
    tmp
}

fn offline_options(cache: &Path) -> ProjectOptions {
    let mut global = GlobalConfig::default();
    global.cache.dir = cache.to_string_lossy().to_string();
    ProjectOptions {
        global,
        ..ProjectOptions::default()
    }
    .with_offline(true)
}

#[tokio::test]
async fn resolve_writes_json_plans() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let out = project.path().join("build/plans.json");

    let request = ResolveRequest {
        variants: vec![],
        format: PlanFormat::Json,
        out: Some(out.clone()),
    };
    let plans = droidplan_ops::ops_resolve::resolve(
        project.path(),
        &offline_options(cache.path()),
        &request,
    )
    .await
    .unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans["release"].versions["compileSdk"], "35");
    assert_eq!(
        plans["debug"].dependencies["com.google.firebase:firebase-auth"],
        "24.0.1"
    );

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"release\""));
    assert!(written.contains("\"com.google.firebase:firebase-analytics\": \"23.0.0\""));
}

#[tokio::test]
async fn resolve_only_selected_variant() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let request = ResolveRequest {
        variants: vec!["release".to_string()],
        format: PlanFormat::Toml,
        out: Some(project.path().join("plans.toml")),
    };
    let plans = droidplan_ops::ops_resolve::resolve(
        project.path(),
        &offline_options(cache.path()),
        &request,
    )
    .await
    .unwrap();
    assert_eq!(plans.keys().collect::<Vec<_>>(), vec!["release"]);
}

#[tokio::test]
async fn resolve_reports_failing_variant() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let descriptor = project.path().join("Droidplan.toml");
    let content = fs::read_to_string(&descriptor).unwrap();
    let content = content.replace(
        "[variants.release]\nparent = \"debug\"",
        "[variants.release]\nparent = \"debug\"\nversions = { minSdk = \"99\" }",
    );
    fs::write(&descriptor, content).unwrap();

    let request = ResolveRequest {
        out: Some(project.path().join("plans.txt")),
        ..ResolveRequest::default()
    };
    let err = droidplan_ops::ops_resolve::resolve(
        project.path(),
        &offline_options(cache.path()),
        &request,
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "1 of 2 variants failed to resolve");

    // The debug plan is still written.
    let written = fs::read_to_string(project.path().join("plans.txt")).unwrap();
    assert!(written.contains("[debug]"));
    assert!(!written.contains("[release]"));
}

#[tokio::test]
async fn resolve_uses_the_platform_store_offline() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let descriptor = project.path().join("Droidplan.toml");
    let content = fs::read_to_string(&descriptor).unwrap();
    let content = content.replace(
        "members = { \"com.google.firebase:firebase-analytics\" = \"23.0.0\", \"com.google.firebase:firebase-auth\" = \"24.0.1\" }\n",
        "",
    );
    fs::write(&descriptor, content).unwrap();

    let opts = offline_options(cache.path());
    let request = ResolveRequest {
        out: Some(project.path().join("plans.txt")),
        ..ResolveRequest::default()
    };
    let err = droidplan_ops::ops_resolve::resolve(project.path(), &opts, &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("firebase-bom"));

    let bom = droidplan_core::platform::Platform::parse(
        r#"
coordinate = "com.google.firebase:firebase-bom:34.5.0"

[members]
"com.google.firebase:firebase-analytics" = "23.0.0"
"com.google.firebase:firebase-auth" = "24.0.2"
"#,
    )
    .unwrap();
    droidplan_core::platform::LocalPlatformStore::new(cache.path())
        .store(&bom)
        .unwrap();

    let plans = droidplan_ops::ops_resolve::resolve(project.path(), &opts, &request)
        .await
        .unwrap();
    assert_eq!(
        plans["release"].dependencies["com.google.firebase:firebase-auth"],
        "24.0.2"
    );
}

#[tokio::test]
async fn check_flags_debug_signed_release() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let report = droidplan_ops::ops_check::check(project.path(), &offline_options(cache.path()))
        .await
        .unwrap();

    assert_eq!(report.plugins, 4);
    assert_eq!(report.variants, vec!["debug", "release"]);
    assert_eq!(report.advisories.len(), 1);
    assert!(report.advisories[0].contains("'release'"));
    assert!(report.advisories[0].contains("inherited from 'debug'"));
}

#[tokio::test]
async fn check_rejects_variant_cycle() {
    let tmp = TempDir::new().unwrap();
    fs::copy(fixture("variant-cycle.toml"), tmp.path().join("Droidplan.toml")).unwrap();
    let cache = TempDir::new().unwrap();

    let err = droidplan_ops::ops_check::check(tmp.path(), &offline_options(cache.path()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[tokio::test]
async fn plugins_in_application_order() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let order = droidplan_ops::ops_plugins::plugins(project.path(), &offline_options(cache.path()))
        .await
        .unwrap();
    assert_eq!(
        order,
        vec![
            "com.android.application",
            "org.jetbrains.kotlin.android",
            "com.google.gms.google-services",
            "dev.flutter.flutter-gradle-plugin",
        ]
    );
}

#[tokio::test]
async fn explain_single_attribute() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let opts = offline_options(cache.path());

    let text = droidplan_ops::ops_explain::explain(
        project.path(),
        &opts,
        "release",
        Some("signingConfig"),
    )
    .await
    .unwrap();
    assert!(text.contains("chain: release -> debug"));
    assert!(text.contains("signingConfig = debug (from debug)"));
    assert!(!text.contains("versions:"));

    let text = droidplan_ops::ops_explain::explain(project.path(), &opts, "release", None)
        .await
        .unwrap();
    assert!(text.contains("compileSdk = 35 (toolchain default)"));
    assert!(text.contains("isMinified = true (from release)"));

    let err = droidplan_ops::ops_explain::explain(project.path(), &opts, "release", Some("nope"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("'nope'"));
}

#[tokio::test]
async fn missing_descriptor() {
    let tmp = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let err = droidplan_ops::ops_plugins::plugins(tmp.path(), &offline_options(cache.path()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No Droidplan.toml found"));
}

#[tokio::test]
async fn interrupt_outlives_loading_and_cancels_resolution() {
    let project = firebase_project();
    let cache = TempDir::new().unwrap();
    let interrupt = droidplan_ops::project::Interrupt::listen();
    let engine = droidplan_ops::project::load_engine(
        project.path(),
        &offline_options(cache.path()),
        &interrupt,
    )
    .await
    .unwrap();
    assert!(interrupt.is_listening());

    interrupt.token().cancel();
    let err = std::sync::Arc::new(engine)
        .resolve_parallel(&[], interrupt.token())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        droidplan_util::errors::DroidplanError::Cancelled
    ));
}
