//! Operation: resolve build plans for the selected variants.
//!
//! Plans for the variants that resolved are always rendered; if any variant
//! failed the operation still returns the aggregate error afterwards so the
//! CLI exits non-zero.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use droidplan_core::plan::{render_plans, BuildPlan, PlanFormat};
use droidplan_util::progress;

use crate::project::{self, Interrupt, ProjectOptions};

/// Where and how to write the plans.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Variant names; empty means every variant.
    pub variants: Vec<String>,
    pub format: PlanFormat,
    /// File to write instead of stdout.
    pub out: Option<PathBuf>,
}

/// Load, resolve in parallel, and print or write the plans.
pub async fn resolve(
    project_dir: &Path,
    opts: &ProjectOptions,
    request: &ResolveRequest,
) -> miette::Result<BTreeMap<String, BuildPlan>> {
    let interrupt = Interrupt::listen();
    let engine = Arc::new(project::load_engine(project_dir, opts, &interrupt).await?);
    let targets = engine.targets(&request.variants)?;
    progress::status(
        "Resolving",
        &format!(
            "{} variant{} ({} jobs)",
            targets.len(),
            if targets.len() == 1 { "" } else { "s" },
            engine.input().context.jobs
        ),
    );

    let outcome = Arc::clone(&engine)
        .resolve_parallel(&targets, interrupt.token())
        .await?;

    for warning in outcome.warnings.iter() {
        progress::status_warn("Shadowed", &warning.to_string());
    }

    if !outcome.plans.is_empty() {
        let rendered = render_plans(&outcome.plans, request.format)?;
        match &request.out {
            Some(path) => {
                droidplan_util::fs::write_with_parents(path, &rendered)
                    .map_err(droidplan_util::errors::DroidplanError::Io)?;
                progress::status("Wrote", &path.display().to_string());
            }
            None => print!("{rendered}"),
        }
    }

    for (variant, error) in &outcome.failures {
        progress::status_error("Failed", &format!("{variant}: {error}"));
    }
    let plans = outcome.into_plans()?;
    progress::status("Finished", &format!("{} plan(s)", plans.len()));
    Ok(plans)
}
