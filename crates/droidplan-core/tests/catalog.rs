use droidplan_core::catalog::{CatalogFile, CatalogSnapshot, VersionCatalogProvider};
use droidplan_util::errors::DroidplanError;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures/catalog.toml")
}

#[test]
fn load_catalog_fixture() {
    let catalog = CatalogFile::from_path(&fixture()).unwrap();
    assert_eq!(catalog.list_available("jvmTarget"), vec!["8", "11", "17"]);
    assert_eq!(catalog.default_version("compileSdk").as_deref(), Some("34"));
    assert!(catalog.list_available("ndkVersion").is_empty());
    assert!(catalog.default_version("ndkVersion").is_none());
}

#[test]
fn default_outside_available_is_rejected() {
    let err = CatalogFile::parse(
        r#"
[components.jvmTarget]
available = ["11", "17"]
default = "21"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, DroidplanError::Catalog { .. }));
}

#[test]
fn snapshot_layers_without_overriding() {
    let primary = CatalogFile::parse(
        r#"
[components.compileSdk]
available = ["34", "35"]
default = "35"
"#,
    )
    .unwrap();
    let secondary = CatalogFile::parse(
        r#"
[components.compileSdk]
available = ["33", "34"]
default = "33"

[components.jvmTarget]
available = ["17"]
default = "17"
"#,
    )
    .unwrap();

    let mut snapshot = CatalogSnapshot::capture(&primary);
    snapshot.layer(&secondary);

    assert_eq!(snapshot.list_available("compileSdk"), vec!["34", "35", "33"]);
    assert_eq!(snapshot.default_version("compileSdk").as_deref(), Some("35"));
    assert_eq!(snapshot.default_version("jvmTarget").as_deref(), Some("17"));
    assert_eq!(snapshot.components(), vec!["compileSdk", "jvmTarget"]);
}
