//! The output of resolution: one immutable build plan per variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::str::FromStr;

use droidplan_util::errors::DroidplanError;

use crate::variant::AttributeValue;

/// The fully resolved instruction set for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub variant: String,
    /// Plugin ids in application order.
    pub plugins: Vec<String>,
    /// Component to resolved version.
    pub versions: BTreeMap<String, String>,
    /// `group:artifact` to resolved version.
    pub dependencies: BTreeMap<String, String>,
    /// Merged attribute set (ancestor chain over policy defaults).
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Output formats understood by `droidplan resolve --format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
    Toml,
}

impl FromStr for PlanFormat {
    type Err = DroidplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(DroidplanError::Generic {
                message: format!("Unknown plan format '{other}', expected text, json or toml"),
            }),
        }
    }
}

/// Render plans keyed by variant name. Output is byte-stable for equal input.
pub fn render_plans(
    plans: &BTreeMap<String, BuildPlan>,
    format: PlanFormat,
) -> Result<String, DroidplanError> {
    match format {
        PlanFormat::Json => serde_json::to_string_pretty(plans)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| DroidplanError::Generic {
                message: format!("Failed to serialize plans: {e}"),
            }),
        PlanFormat::Toml => toml::to_string_pretty(plans).map_err(|e| DroidplanError::Generic {
            message: format!("Failed to serialize plans: {e}"),
        }),
        PlanFormat::Text => Ok(render_text(plans)),
    }
}

fn render_text(plans: &BTreeMap<String, BuildPlan>) -> String {
    let mut out = String::new();
    for plan in plans.values() {
        let _ = writeln!(out, "[{}]", plan.variant);
        let _ = writeln!(out, "  plugins: {}", plan.plugins.join(" -> "));
        if !plan.versions.is_empty() {
            let _ = writeln!(out, "  versions:");
            for (component, version) in &plan.versions {
                let _ = writeln!(out, "    {component} = {version}");
            }
        }
        if !plan.dependencies.is_empty() {
            let _ = writeln!(out, "  dependencies:");
            for (key, version) in &plan.dependencies {
                let _ = writeln!(out, "    {key}:{version}");
            }
        }
        if !plan.attributes.is_empty() {
            let _ = writeln!(out, "  attributes:");
            for (key, value) in &plan.attributes {
                let _ = writeln!(out, "    {key} = {value}");
            }
        }
    }
    out
}
