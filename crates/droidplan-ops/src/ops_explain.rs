//! Operation: explain where each value in a variant's plan came from.

use std::fmt::Write;
use std::path::Path;

use droidplan_resolver::engine::VariantResolution;
use droidplan_util::errors::DroidplanError;

use crate::project::{self, Interrupt, ProjectOptions};

/// Resolve `variant` and describe its provenance, optionally limited to one
/// component, `group:artifact` key, or attribute.
pub async fn explain(
    project_dir: &Path,
    opts: &ProjectOptions,
    variant: &str,
    key: Option<&str>,
) -> miette::Result<String> {
    let interrupt = Interrupt::listen();
    let engine = project::load_engine(project_dir, opts, &interrupt).await?;
    engine.targets(&[variant.to_string()])?;
    droidplan_util::progress::status_info("Explaining", variant);
    let resolution = engine.resolve_variant(variant, &interrupt.token())?;

    render_explanation(&resolution, key).ok_or_else(|| {
        DroidplanError::Generic {
            message: format!(
                "Variant '{variant}' has no version, dependency or attribute named '{}'",
                key.unwrap_or_default()
            ),
        }
        .into()
    })
}

/// Text form of a resolution's provenance; `None` when `key` matches nothing.
pub fn render_explanation(resolution: &VariantResolution, key: Option<&str>) -> Option<String> {
    let provenance = &resolution.provenance;
    let wanted = |k: &str| key.map_or(true, |key| key == k);
    let mut out = String::new();
    let mut matched = key.is_none();

    let _ = writeln!(out, "{}", resolution.plan.variant);
    let _ = writeln!(out, "  chain: {}", provenance.chain.join(" -> "));
    if key.is_none() {
        let _ = writeln!(out, "  plugins: {}", resolution.plan.plugins.join(" -> "));
    }

    let versions: Vec<_> = provenance
        .versions
        .iter()
        .filter(|(c, _)| wanted(c.as_str()))
        .collect();
    if !versions.is_empty() {
        matched = true;
        let _ = writeln!(out, "  versions:");
        for (component, resolved) in versions {
            let _ = writeln!(
                out,
                "    {component} = {} ({})",
                resolved.version, resolved.origin
            );
        }
    }

    let deps: Vec<_> = provenance
        .dependencies
        .iter()
        .filter(|(k, _)| wanted(k.as_str()))
        .collect();
    if !deps.is_empty() {
        matched = true;
        let _ = writeln!(out, "  dependencies:");
        for (coordinate, aligned) in deps {
            let _ = writeln!(
                out,
                "    {coordinate} = {} ({})",
                aligned.version, aligned.source
            );
        }
    }

    let attributes: Vec<_> = resolution
        .plan
        .attributes
        .iter()
        .filter(|(k, _)| wanted(k.as_str()))
        .collect();
    if !attributes.is_empty() {
        matched = true;
        let _ = writeln!(out, "  attributes:");
        for (name, value) in attributes {
            let source = provenance
                .attributes
                .get(name)
                .map(String::as_str)
                .unwrap_or("[attributes.defaults]");
            let _ = writeln!(out, "    {name} = {value} (from {source})");
        }
    }

    for warning in &resolution.warnings {
        if wanted(warning.coordinate.as_str()) {
            let _ = writeln!(out, "  warning: {warning}");
        }
    }

    matched.then_some(out)
}
