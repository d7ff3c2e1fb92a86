use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::requirement::{VersionRequirement, VersionValue};

/// A build plugin declared under `[[plugins]]`.
///
/// Plugins are named capabilities; droidplan only decides the order in which
/// the external toolchain applies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDeclaration {
    pub id: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Plugins that must be applied before this one.
    #[serde(default, rename = "depends-on")]
    pub depends_on: Vec<String>,

    /// Toolchain versions this plugin needs, e.g. `{ jvmTarget = ">=11" }`.
    #[serde(default)]
    pub requires: BTreeMap<String, VersionValue>,
}

impl PluginDeclaration {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            version: None,
            depends_on: Vec::new(),
            requires: BTreeMap::new(),
        }
    }

    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.depends_on = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Version requirements contributed by this plugin.
    pub fn requirements(&self) -> Vec<VersionRequirement> {
        self.requires
            .iter()
            .map(|(component, value)| {
                VersionRequirement::new(component, &value.as_expr(), format!("plugin {}", self.id))
            })
            .collect()
    }
}
