use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use droidplan_core::catalog::CatalogFile;
use droidplan_core::config::GlobalConfig;
use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::plan::{render_plans, PlanFormat};
use droidplan_core::platform::{FetcherChain, Platform};
use droidplan_core::plugin::PluginDeclaration;
use droidplan_core::requirement::VersionRequirement;
use droidplan_core::variant::{AttributeValue, BuildVariant};
use droidplan_resolver::bom::align;
use droidplan_resolver::constraint::resolve;
use droidplan_resolver::engine::{self, Engine, ResolutionInput};
use droidplan_resolver::load::{load_project, LoadOptions};
use droidplan_resolver::sequencer::order;
use droidplan_resolver::variant_graph::VariantGraph;
use droidplan_util::errors::DroidplanError;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures")
}

fn firebase_input() -> ResolutionInput {
    load_project(
        &fixtures_dir().join("firebase-app.toml"),
        &LoadOptions::new(GlobalConfig::default()),
        &FetcherChain::new(),
        &CancellationToken::new(),
    )
    .unwrap()
}

#[test]
fn codegen_before_package() {
    let plugins = [
        PluginDeclaration::new("codegen"),
        PluginDeclaration::new("package").depends_on(&["codegen"]),
    ];
    assert_eq!(order(&plugins).unwrap(), vec!["codegen", "package"]);
}

#[test]
fn first_platform_wins_and_warns() {
    let lib = |v: &str| {
        [("org.example:lib".to_string(), v.to_string())]
            .into_iter()
            .collect::<BTreeMap<_, _>>()
    };
    let platforms = [
        Platform::new(DependencyCoordinate::new("org.example", "p1", Some("1")), lib("1.0")),
        Platform::new(DependencyCoordinate::new("org.example", "p2", Some("1")), lib("2.0")),
    ];
    let alignment = align(
        &[DependencyCoordinate::new("org.example", "lib", None)],
        &platforms,
    )
    .unwrap();
    assert_eq!(alignment.resolved()["org.example:lib"], "1.0");
    assert_eq!(alignment.warnings.len(), 1);
    assert_eq!(alignment.warnings[0].used_platform, "org.example:p1:1");
}

#[test]
fn grandparent_attribute_is_inherited() {
    let graph = VariantGraph::load(vec![
        BuildVariant::new("a", Some("b")),
        BuildVariant::new("b", Some("c")),
        BuildVariant::new("c", None).with_attribute("k", "from-c"),
    ])
    .unwrap();
    assert_eq!(graph.attribute("a", "k").unwrap(), &AttributeValue::from("from-c"));
}

#[test]
fn variant_cycle_from_descriptor() {
    let descriptor = droidplan_core::descriptor::Descriptor::from_path(
        &fixtures_dir().join("variant-cycle.toml"),
    )
    .unwrap();
    let err = VariantGraph::load(descriptor.build_variants()).unwrap_err();
    match err {
        DroidplanError::InvalidVariantGraph { cycle } => {
            assert_eq!(cycle, vec!["alpha", "beta"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn jvm_target_against_small_catalog() {
    let catalog = CatalogFile::parse(
        r#"
[components.jvmTarget]
available = ["8", "11", "17"]
"#,
    )
    .unwrap();
    let eleven = VersionRequirement::new("jvmTarget", "11", "[versions]");
    assert_eq!(resolve(&eleven, &catalog).unwrap(), "11");

    let nine = VersionRequirement::new("jvmTarget", "9", "[versions]");
    assert!(matches!(
        resolve(&nine, &catalog),
        Err(DroidplanError::UnresolvableVersion { .. })
    ));
}

#[test]
fn firebase_app_plans() {
    let plans = engine::resolve(firebase_input()).unwrap();
    assert_eq!(plans.keys().collect::<Vec<_>>(), vec!["debug", "release"]);

    let release = &plans["release"];
    assert_eq!(
        release.plugins,
        vec![
            "com.android.application",
            "org.jetbrains.kotlin.android",
            "com.google.gms.google-services",
            "dev.flutter.flutter-gradle-plugin",
        ]
    );
    assert_eq!(release.versions["compileSdk"], "35");
    assert_eq!(release.versions["minSdk"], "21");
    assert_eq!(release.versions["targetSdk"], "35");
    assert_eq!(release.versions["jvmTarget"], "11");
    assert_eq!(release.versions["targetCompatibility"], "11");
    assert_eq!(
        release.dependencies["com.google.firebase:firebase-analytics"],
        "23.0.0"
    );
    assert_eq!(
        release.dependencies["com.google.firebase:firebase-auth"],
        "24.0.1"
    );
    assert_eq!(release.attributes["signingConfig"].as_str(), Some("debug"));
    assert_eq!(release.attributes["debuggable"].as_bool(), Some(false));
    assert_eq!(release.attributes["isMinified"].as_bool(), Some(true));

    let debug = &plans["debug"];
    assert_eq!(debug.attributes["isMinified"].as_bool(), Some(false));
    assert_eq!(debug.attributes["debuggable"].as_bool(), Some(true));
}

#[test]
fn resolving_twice_is_byte_identical() {
    let first = render_plans(&engine::resolve(firebase_input()).unwrap(), PlanFormat::Json).unwrap();
    let second = render_plans(&engine::resolve(firebase_input()).unwrap(), PlanFormat::Json).unwrap();
    assert_eq!(first, second);

    let first = render_plans(&engine::resolve(firebase_input()).unwrap(), PlanFormat::Toml).unwrap();
    let second = render_plans(&engine::resolve(firebase_input()).unwrap(), PlanFormat::Toml).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn parallel_run_matches_sequential_on_fixture() {
    let engine = Arc::new(Engine::prepare(firebase_input()).unwrap());
    let sequential = engine
        .resolve_sequential(&[], &CancellationToken::new())
        .unwrap()
        .into_plans()
        .unwrap();
    let parallel = Arc::clone(&engine)
        .resolve_parallel(&[], CancellationToken::new())
        .await
        .unwrap()
        .into_plans()
        .unwrap();
    assert_eq!(
        render_plans(&sequential, PlanFormat::Json).unwrap(),
        render_plans(&parallel, PlanFormat::Json).unwrap()
    );
}
