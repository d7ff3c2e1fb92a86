//! Operation: validate a project without producing plans.
//!
//! Loads the project, runs the structural checks (plugin order, variant
//! graph, coordinates) and reports advisories that are legal but usually
//! unintended.

use std::path::Path;

use droidplan_core::variant::AttributeValue;
use droidplan_resolver::engine::Engine;
use droidplan_util::progress;

use crate::project::{self, Interrupt, ProjectOptions};

/// Summary of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub plugins: usize,
    pub variants: Vec<String>,
    pub advisories: Vec<String>,
}

/// Validate the project in `project_dir`.
pub async fn check(project_dir: &Path, opts: &ProjectOptions) -> miette::Result<CheckReport> {
    let engine = project::load_engine(project_dir, opts, &Interrupt::listen()).await?;
    progress::status("Checking", &engine.input().descriptor.project.name);

    let report = CheckReport {
        plugins: engine.plugin_order().len(),
        variants: engine.variants().names(),
        advisories: advisories(&engine)?,
    };

    for advisory in &report.advisories {
        tracing::warn!("{advisory}");
        progress::status_warn("Advisory", advisory);
    }
    progress::status(
        "Finished",
        &format!(
            "{} plugin(s), {} variant(s), {} advisory(ies)",
            report.plugins,
            report.variants.len(),
            report.advisories.len()
        ),
    );
    Ok(report)
}

/// Release-like variants that end up signed with the debug configuration.
///
/// A variant counts as release-like when its name contains `release` or its
/// merged `debuggable` attribute is `false`.
pub fn advisories(engine: &Engine) -> miette::Result<Vec<String>> {
    let policy = &engine.input().descriptor.attributes;
    let mut found = Vec::new();
    for name in engine.variants().names() {
        // Variants missing required attributes fail at resolve time, not here.
        let Ok(attributes) = engine.variants().merged_attributes(&name, policy) else {
            continue;
        };
        let release_like = name.to_ascii_lowercase().contains("release")
            || attributes.get("debuggable") == Some(&AttributeValue::Bool(false));
        let debug_signed = attributes
            .get("signingConfig")
            .and_then(AttributeValue::as_str)
            == Some("debug");
        if release_like && debug_signed {
            let source = engine
                .variants()
                .ancestors(&name)?
                .into_iter()
                .find(|v| v.attributes.contains_key("signingConfig"))
                .map(|v| {
                    if v.name == name {
                        "set on the variant".to_string()
                    } else {
                        format!("inherited from '{}'", v.name)
                    }
                })
                .unwrap_or_else(|| "from [attributes.defaults]".to_string());
            found.push(format!(
                "variant '{name}' is signed with the debug signing config ({source})"
            ));
        }
    }
    Ok(found)
}
