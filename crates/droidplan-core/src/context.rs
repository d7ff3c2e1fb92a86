use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::GlobalConfig;
use crate::descriptor::Descriptor;

/// Components that must agree by default: Java's source and target
/// compatibility, and Kotlin's `jvmTarget`, which refuses to compile against
/// a different `targetCompatibility`.
pub fn default_linked_components() -> Vec<Vec<String>> {
    vec![vec![
        "sourceCompatibility".to_string(),
        "targetCompatibility".to_string(),
        "jvmTarget".to_string(),
    ]]
}

/// Everything a resolution run needs beyond the descriptor and catalog,
/// passed explicitly instead of read from ambient state.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Toolchain defaults that take precedence over catalog defaults.
    pub defaults: BTreeMap<String, String>,
    /// Component groups resolved together to a single version.
    pub linked_components: Vec<Vec<String>>,
    /// Maximum number of variants resolved concurrently.
    pub jobs: usize,
    /// Upper bound for the loading stage.
    pub load_timeout: Duration,
    /// Only use locally available platforms.
    pub offline: bool,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self {
            defaults: BTreeMap::new(),
            linked_components: default_linked_components(),
            jobs: 4,
            load_timeout: Duration::from_secs(60),
            offline: false,
        }
    }
}

impl ResolutionContext {
    /// Layer the descriptor's `[toolchain]` section over the global config.
    pub fn from_config(global: &GlobalConfig, descriptor: &Descriptor) -> Self {
        let mut defaults = global.defaults.clone();
        for (component, value) in &descriptor.toolchain.defaults {
            defaults.insert(component.clone(), value.as_expr());
        }
        Self {
            defaults,
            linked_components: descriptor
                .toolchain
                .linked
                .clone()
                .unwrap_or_else(default_linked_components),
            jobs: global.resolve.jobs.max(1),
            load_timeout: Duration::from_secs(global.resolve.load_timeout_secs),
            offline: global.resolve.offline,
        }
    }

    /// The link group containing `component`, or just the component itself.
    pub fn link_group(&self, component: &str) -> Vec<String> {
        self.linked_components
            .iter()
            .find(|group| group.iter().any(|c| c == component))
            .cloned()
            .unwrap_or_else(|| vec![component.to_string()])
    }
}
