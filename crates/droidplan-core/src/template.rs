//! Embedded project template for `droidplan init`.
//!
//! The template mirrors a Flutter Android app using Firebase: four plugins,
//! Java 11 toolchain targets, the Firebase BOM, and a release variant that
//! inherits debug signing. `{{variable}}` placeholders are filled at render time.

use std::collections::BTreeMap;

const DESCRIPTOR_TEMPLATE: &str = include_str!("../templates/android-app/Droidplan.toml");
const CATALOG_TEMPLATE: &str = include_str!("../templates/android-app/catalog.toml");

/// Variables available for `{{variable}}` interpolation.
pub struct TemplateContext {
    vars: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Create a context with the standard project variables.
    pub fn new(project_name: &str) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("project_name".to_string(), project_name.to_string());
        vars.insert("namespace".to_string(), default_namespace(project_name));
        Self { vars }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

/// `com.example.<name>` with characters invalid in a package name replaced.
fn default_namespace(project_name: &str) -> String {
    let cleaned: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("com.example.{cleaned}")
}

/// Replace `{{key}}` placeholders; unknown keys are left intact.
pub fn interpolate(input: &str, ctx: &TemplateContext) -> String {
    ctx.vars.iter().fold(input.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// The files `droidplan init` writes, as `(file name, content)` pairs.
pub fn render_android_app(ctx: &TemplateContext) -> Vec<(&'static str, String)> {
    vec![
        (crate::descriptor::DESCRIPTOR_FILE, interpolate(DESCRIPTOR_TEMPLATE, ctx)),
        ("catalog.toml", interpolate(CATALOG_TEMPLATE, ctx)),
    ]
}
