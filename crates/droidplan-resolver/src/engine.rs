//! Resolution engine: turns a loaded project into one build plan per variant.
//!
//! Structural problems are found once in [`Engine::prepare`] and abort the
//! run. Everything after that is per variant: a version, dependency or
//! attribute error fails only its own variant.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use droidplan_core::catalog::CatalogSnapshot;
use droidplan_core::context::ResolutionContext;
use droidplan_core::descriptor::Descriptor;
use droidplan_core::plan::BuildPlan;
use droidplan_core::platform::Platform;
use droidplan_core::requirement::VersionRequirement;
use droidplan_util::errors::{DroidplanError, ResolveResult, VariantFailure};

use crate::bom::{self, AlignedVersion};
use crate::constraint::{self, ResolvedVersion};
use crate::sequencer;
use crate::variant_graph::VariantGraph;
use crate::warnings::{ShadowingWarning, WarningReport};

/// Everything a run resolves against, frozen at load time.
#[derive(Debug, Clone)]
pub struct ResolutionInput {
    pub descriptor: Descriptor,
    pub catalog: CatalogSnapshot,
    /// Loaded platforms, in descriptor order.
    pub platforms: Vec<Platform>,
    pub context: ResolutionContext,
}

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Loaded,
    PluginsOrdered,
    VersionsResolved,
    DependenciesAligned,
    PerVariantPlansBuilt,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::PluginsOrdered => "plugins-ordered",
            Self::VersionsResolved => "versions-resolved",
            Self::DependenciesAligned => "dependencies-aligned",
            Self::PerVariantPlansBuilt => "plans-built",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Where each value in a plan came from.
#[derive(Debug, Clone, Serialize)]
pub struct VariantProvenance {
    /// The variant and its parents up to the root.
    pub chain: Vec<String>,
    pub versions: BTreeMap<String, ResolvedVersion>,
    pub dependencies: BTreeMap<String, AlignedVersion>,
    /// Attribute key to the variant that defined it, or `[attributes.defaults]`.
    pub attributes: BTreeMap<String, String>,
}

/// A single variant's plan along with how it was reached.
#[derive(Debug, Clone)]
pub struct VariantResolution {
    pub plan: BuildPlan,
    pub provenance: VariantProvenance,
    pub warnings: Vec<ShadowingWarning>,
}

/// Result of resolving a set of variants. Failures do not stop the others.
#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    pub plans: BTreeMap<String, BuildPlan>,
    pub failures: BTreeMap<String, DroidplanError>,
    pub warnings: WarningReport,
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, variant: String, result: ResolveResult<VariantResolution>) {
        match result {
            Ok(resolution) => {
                self.warnings.extend(resolution.warnings);
                self.plans.insert(variant, resolution.plan);
            }
            Err(e) => {
                tracing::debug!("variant {variant} failed: {e}");
                self.failures.insert(variant, e);
            }
        }
    }

    /// The plans, or an aggregate error naming every failed variant.
    pub fn into_plans(self) -> ResolveResult<BTreeMap<String, BuildPlan>> {
        if self.failures.is_empty() {
            return Ok(self.plans);
        }
        Err(DroidplanError::AggregateResolution {
            failures: self
                .failures
                .into_iter()
                .map(|(variant, error)| VariantFailure {
                    variant,
                    error: Box::new(error),
                })
                .collect(),
            succeeded: self.plans.into_keys().collect(),
        })
    }
}

/// A validated project ready for per-variant resolution.
#[derive(Debug)]
pub struct Engine {
    input: ResolutionInput,
    plugin_order: Vec<String>,
    variants: VariantGraph,
}

impl Engine {
    /// Run the structural checks: descriptor validation, plugin ordering and
    /// the variant graph.
    pub fn prepare(input: ResolutionInput) -> ResolveResult<Self> {
        tracing::debug!("stage: {}", Stage::Loaded);
        input.descriptor.validate()?;

        let plugin_order = sequencer::order(&input.descriptor.plugins)?;
        tracing::debug!("stage: {}", Stage::PluginsOrdered);

        let variants = VariantGraph::load(input.descriptor.build_variants())?;
        Ok(Self {
            input,
            plugin_order,
            variants,
        })
    }

    pub fn input(&self) -> &ResolutionInput {
        &self.input
    }

    pub fn plugin_order(&self) -> &[String] {
        &self.plugin_order
    }

    pub fn variants(&self) -> &VariantGraph {
        &self.variants
    }

    /// The variants to resolve: all of them when `selection` is empty.
    pub fn targets(&self, selection: &[String]) -> ResolveResult<Vec<String>> {
        if selection.is_empty() {
            return Ok(self.variants.names());
        }
        let mut targets = Vec::new();
        for name in selection {
            if !self.variants.contains(name) {
                return Err(DroidplanError::Generic {
                    message: format!(
                        "Unknown variant '{name}'; declared variants: {}",
                        self.variants.names().join(", ")
                    ),
                });
            }
            if !targets.contains(name) {
                targets.push(name.clone());
            }
        }
        targets.sort();
        Ok(targets)
    }

    /// Requirements in effect for `variant`: `[versions]` overridden per
    /// component by the variant chain, plus every plugin requirement.
    pub fn requirements_for(&self, variant: &str) -> ResolveResult<Vec<VersionRequirement>> {
        let mut by_component: BTreeMap<String, VersionRequirement> = self
            .input
            .descriptor
            .project_requirements()
            .into_iter()
            .map(|r| (r.component.clone(), r))
            .collect();
        by_component.extend(self.variants.effective_versions(variant)?);

        let mut requirements: Vec<VersionRequirement> = by_component.into_values().collect();
        for plugin in &self.input.descriptor.plugins {
            requirements.extend(plugin.requirements());
        }
        Ok(requirements)
    }

    /// Resolve one variant, checking `cancel` between stages.
    pub fn resolve_variant(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> ResolveResult<VariantResolution> {
        let checkpoint = |stage: Stage| {
            if cancel.is_cancelled() {
                return Err(DroidplanError::Cancelled);
            }
            tracing::debug!("[{name}] stage: {stage}");
            Ok(())
        };
        let ctx = &self.input.context;

        let lineage = self.variants.ancestors(name)?;
        let chain: Vec<String> = lineage.iter().map(|v| v.name.clone()).collect();

        let requirements = self.requirements_for(name)?;
        let versions = constraint::resolve_all(&requirements, &self.input.catalog, ctx)?;
        checkpoint(Stage::VersionsResolved)?;

        let mut deps = self.input.descriptor.coordinates()?;
        deps.extend(self.variants.effective_dependencies(name)?);
        let alignment = bom::align(&deps, &self.input.platforms)?;
        checkpoint(Stage::DependenciesAligned)?;

        let attributes = self
            .variants
            .merged_attributes(name, &self.input.descriptor.attributes)?;
        let attribute_sources = attributes
            .keys()
            .map(|key| {
                let source = lineage
                    .iter()
                    .find(|v| v.attributes.contains_key(key))
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| "[attributes.defaults]".to_string());
                (key.clone(), source)
            })
            .collect();

        let plan = BuildPlan {
            variant: name.to_string(),
            plugins: self.plugin_order.clone(),
            versions: versions
                .iter()
                .map(|(component, resolved)| (component.clone(), resolved.version.clone()))
                .collect(),
            dependencies: alignment.resolved(),
            attributes,
        };
        checkpoint(Stage::PerVariantPlansBuilt)?;

        Ok(VariantResolution {
            plan,
            provenance: VariantProvenance {
                chain,
                versions,
                dependencies: alignment.versions,
                attributes: attribute_sources,
            },
            warnings: alignment.warnings,
        })
    }

    /// Resolve the selected variants one after another on the current thread.
    pub fn resolve_sequential(
        &self,
        selection: &[String],
        cancel: &CancellationToken,
    ) -> ResolveResult<ResolutionOutcome> {
        let mut outcome = ResolutionOutcome::default();
        for name in self.targets(selection)? {
            if cancel.is_cancelled() {
                return Err(DroidplanError::Cancelled);
            }
            match self.resolve_variant(&name, cancel) {
                Err(DroidplanError::Cancelled) => return Err(DroidplanError::Cancelled),
                result => outcome.record(name, result),
            }
        }
        tracing::debug!("stage: {}", Stage::Done);
        Ok(outcome)
    }

    /// Resolve the selected variants on the blocking pool, at most
    /// `context.jobs` at a time.
    pub async fn resolve_parallel(
        self: Arc<Self>,
        selection: &[String],
        cancel: CancellationToken,
    ) -> ResolveResult<ResolutionOutcome> {
        let targets = self.targets(selection)?;
        let semaphore = Arc::new(Semaphore::new(self.input.context.jobs.max(1)));

        let mut join_set = JoinSet::new();
        for name in targets {
            let engine = Arc::clone(&self);
            let sem = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await;
                let variant = name.clone();
                let result = tokio::task::spawn_blocking(move || {
                    engine.resolve_variant(&variant, &cancel)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(DroidplanError::Generic {
                        message: format!("variant task failed: {e}"),
                    })
                });
                (name, result)
            });
        }

        let mut outcome = ResolutionOutcome::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, result)) => outcome.record(name, result),
                Err(e) => {
                    return Err(DroidplanError::Generic {
                        message: format!("variant task failed: {e}"),
                    })
                }
            }
        }

        if cancel.is_cancelled()
            || outcome
                .failures
                .values()
                .any(|e| matches!(e, DroidplanError::Cancelled))
        {
            return Err(DroidplanError::Cancelled);
        }
        tracing::debug!("stage: {}", Stage::Done);
        Ok(outcome)
    }
}

/// Prepare and resolve every variant sequentially.
pub fn resolve(input: ResolutionInput) -> ResolveResult<BTreeMap<String, BuildPlan>> {
    let engine = Engine::prepare(input)?;
    engine
        .resolve_sequential(&[], &CancellationToken::new())?
        .into_plans()
}
