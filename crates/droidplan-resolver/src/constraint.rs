//! Version constraint model: requirements on toolchain components resolved
//! against a frozen catalog.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use droidplan_core::catalog::VersionCatalogProvider;
use droidplan_core::context::ResolutionContext;
use droidplan_core::requirement::VersionRequirement;
use droidplan_util::errors::{DroidplanError, ResolveResult};

use crate::version::{Version, VersionExpr, VersionRange};

/// Where a resolved component version came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VersionOrigin {
    /// `[toolchain.defaults]` or the global `[defaults]`.
    ToolchainDefault,
    /// The catalog's declared default.
    CatalogDefault,
    /// Chosen to satisfy one or more requirements.
    Constrained { requirements: Vec<String> },
}

impl fmt::Display for VersionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolchainDefault => f.write_str("toolchain default"),
            Self::CatalogDefault => f.write_str("catalog default"),
            Self::Constrained { requirements } => {
                write!(f, "constrained by {}", requirements.join("; "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub version: String,
    pub origin: VersionOrigin,
}

/// Resolve a single requirement with no explicit toolchain defaults.
pub fn resolve(
    requirement: &VersionRequirement,
    catalog: &dyn VersionCatalogProvider,
) -> ResolveResult<String> {
    let group = [requirement.component.clone()];
    resolve_group(&group, std::slice::from_ref(requirement), catalog, &BTreeMap::new())
        .map(|resolved| resolved.version)
}

/// Resolve every component in play: those named by a requirement, those the
/// catalog has a default for, and those with an explicit toolchain default.
///
/// Components in the same link group share one result.
pub fn resolve_all(
    requirements: &[VersionRequirement],
    catalog: &dyn VersionCatalogProvider,
    ctx: &ResolutionContext,
) -> ResolveResult<BTreeMap<String, ResolvedVersion>> {
    let mut in_play: BTreeSet<String> = requirements.iter().map(|r| r.component.clone()).collect();
    in_play.extend(
        catalog
            .components()
            .into_iter()
            .filter(|c| catalog.default_version(c).is_some()),
    );
    in_play.extend(ctx.defaults.keys().cloned());

    let mut resolved = BTreeMap::new();
    let mut done = BTreeSet::new();
    for component in &in_play {
        if done.contains(component) {
            continue;
        }
        let group = ctx.link_group(component);
        done.extend(group.iter().cloned());

        let pooled: Vec<VersionRequirement> = requirements
            .iter()
            .filter(|r| group.contains(&r.component))
            .cloned()
            .collect();
        let result = resolve_group(&group, &pooled, catalog, &ctx.defaults)?;
        tracing::debug!("{} = {} ({})", group.join("/"), result.version, result.origin);

        for member in group.iter().filter(|m| in_play.contains(*m)) {
            resolved.insert(member.clone(), result.clone());
        }
    }
    Ok(resolved)
}

/// Resolve the pooled requirements of one link group to a single version.
pub fn resolve_group(
    group: &[String],
    requirements: &[VersionRequirement],
    catalog: &dyn VersionCatalogProvider,
    defaults: &BTreeMap<String, String>,
) -> ResolveResult<ResolvedVersion> {
    let label = group.join("/");
    let rendered: Vec<String> = requirements.iter().map(render).collect();

    let mut constraints: Vec<(&VersionRequirement, VersionRange)> = Vec::new();
    for requirement in requirements {
        let expr = VersionExpr::parse(&requirement.requested).map_err(|reason| {
            DroidplanError::UnresolvableVersion {
                component: requirement.component.clone(),
                reason,
                requirements: vec![render(requirement)],
            }
        })?;
        if let VersionExpr::Range(range) = expr {
            constraints.push((requirement, range));
        }
    }

    for (i, (a, range_a)) in constraints.iter().enumerate() {
        for (b, range_b) in &constraints[i + 1..] {
            if range_a.intersect(range_b).is_none() {
                return Err(DroidplanError::UnresolvableVersion {
                    component: label,
                    reason: format!("{a} conflicts with {b}"),
                    requirements: vec![render(a), render(b)],
                });
            }
        }
    }

    let candidates = candidates(group, catalog).map_err(|reason| {
        DroidplanError::UnresolvableVersion {
            component: label.clone(),
            reason,
            requirements: rendered.clone(),
        }
    })?;
    let default = effective_default(group, catalog, defaults, &candidates);

    let Some(combined) = constraints
        .iter()
        .map(|(_, range)| Some(range.clone()))
        .reduce(|acc, next| acc.zip(next).and_then(|(a, b)| a.intersect(&b)))
    else {
        return default
            .map(|(version, origin)| ResolvedVersion { version, origin })
            .ok_or_else(|| DroidplanError::UnresolvableVersion {
                component: label,
                reason: "no requirement and no toolchain default".to_string(),
                requirements: rendered.clone(),
            });
    };
    let combined = combined.ok_or_else(|| DroidplanError::UnresolvableVersion {
        component: label.clone(),
        reason: "requirements have no common version".to_string(),
        requirements: rendered.clone(),
    })?;
    let origin = VersionOrigin::Constrained {
        requirements: rendered.clone(),
    };

    if candidates.is_empty() {
        return match combined.as_exact() {
            Some(pin) => Ok(ResolvedVersion {
                version: pin.original.clone(),
                origin,
            }),
            None => Err(DroidplanError::UnresolvableVersion {
                component: label,
                reason: format!(
                    "the catalog lists no versions, so only an exact pin can satisfy {combined}"
                ),
                requirements: rendered,
            }),
        };
    }

    if let Some((version, _)) = default {
        if combined.contains(&Version::parse(&version)) {
            return Ok(ResolvedVersion { version, origin });
        }
    }

    candidates
        .iter()
        .filter(|v| combined.contains(v))
        .max()
        .map(|v| ResolvedVersion {
            version: v.original.clone(),
            origin,
        })
        .ok_or_else(|| DroidplanError::UnresolvableVersion {
            component: label,
            reason: format!(
                "no available version satisfies {combined}; available: {}",
                candidates
                    .iter()
                    .map(|v| v.original.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            requirements: rendered,
        })
}

fn render(requirement: &VersionRequirement) -> String {
    format!("{}: {}", requirement.origin, requirement.requested)
}

/// Versions listed by every catalogued member of the group, ascending, in
/// the first catalogued member's spelling.
///
/// Empty only when no member is catalogued. Catalogued members whose lists
/// share nothing are an error naming each list.
fn candidates(
    group: &[String],
    catalog: &dyn VersionCatalogProvider,
) -> Result<Vec<Version>, String> {
    let lists: Vec<(&String, Vec<String>)> = group
        .iter()
        .map(|c| (c, catalog.list_available(c)))
        .filter(|(_, list)| !list.is_empty())
        .collect();
    let parsed: Vec<Vec<Version>> = lists
        .iter()
        .map(|(_, list)| list.iter().map(|v| Version::parse(v)).collect())
        .collect();

    let Some((first, rest)) = parsed.split_first() else {
        return Ok(Vec::new());
    };
    let mut shared: Vec<Version> = first
        .iter()
        .filter(|v| rest.iter().all(|list| list.contains(v)))
        .cloned()
        .collect();
    if shared.is_empty() {
        let listed: Vec<String> = lists
            .iter()
            .map(|(component, list)| format!("{component} [{}]", list.join(", ")))
            .collect();
        return Err(format!(
            "linked components list no common version: {}",
            listed.join("; ")
        ));
    }
    shared.sort();
    shared.dedup();
    Ok(shared)
}

/// The first usable default: explicit toolchain defaults, then catalog
/// defaults. A default the catalog does not list is skipped.
fn effective_default(
    group: &[String],
    catalog: &dyn VersionCatalogProvider,
    defaults: &BTreeMap<String, String>,
    candidates: &[Version],
) -> Option<(String, VersionOrigin)> {
    let usable = |raw: &str| -> Option<String> {
        if candidates.is_empty() {
            return Some(raw.to_string());
        }
        let wanted = Version::parse(raw);
        candidates
            .iter()
            .find(|v| **v == wanted)
            .map(|v| v.original.clone())
    };

    let explicit = group
        .iter()
        .filter_map(|c| defaults.get(c))
        .find_map(|raw| usable(raw))
        .map(|v| (v, VersionOrigin::ToolchainDefault));
    if explicit.is_some() {
        return explicit;
    }
    group
        .iter()
        .filter_map(|c| catalog.default_version(c))
        .find_map(|raw| usable(&raw))
        .map(|v| (v, VersionOrigin::CatalogDefault))
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidplan_core::catalog::CatalogFile;

    fn catalog() -> CatalogFile {
        CatalogFile::parse(
            r#"
[components.jvmTarget]
available = ["8", "11", "17"]
default = "11"

[components.targetCompatibility]
available = ["8", "11", "17", "21"]
default = "17"

[components.minSdk]
available = ["21", "24", "26"]
default = "21"

[components.compileSdk]
available = ["33", "34", "35"]
"#,
        )
        .unwrap()
    }

    fn req(component: &str, requested: &str, origin: &str) -> VersionRequirement {
        VersionRequirement::new(component, requested, origin)
    }

    fn single(component: &str, reqs: &[VersionRequirement]) -> ResolveResult<ResolvedVersion> {
        resolve_group(&[component.to_string()], reqs, &catalog(), &BTreeMap::new())
    }

    #[test]
    fn exact_pin_in_catalog() {
        let v = resolve(&req("jvmTarget", "11", "[versions]"), &catalog()).unwrap();
        assert_eq!(v, "11");
    }

    #[test]
    fn exact_pin_uses_catalog_spelling() {
        let v = resolve(&req("jvmTarget", "11.0", "[versions]"), &catalog()).unwrap();
        assert_eq!(v, "11");
    }

    #[test]
    fn pin_missing_from_catalog_is_unresolvable() {
        let err = resolve(&req("jvmTarget", "9", "[versions]"), &catalog()).unwrap_err();
        match err {
            DroidplanError::UnresolvableVersion {
                component,
                reason,
                requirements,
            } => {
                assert_eq!(component, "jvmTarget");
                assert!(reason.contains("available: 8, 11, 17"), "{reason}");
                assert_eq!(requirements, vec!["[versions]: 9".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_marker_uses_catalog_default() {
        let r = single("minSdk", &[req("minSdk", "default", "[versions]")]).unwrap();
        assert_eq!(r.version, "21");
        assert_eq!(r.origin, VersionOrigin::CatalogDefault);
    }

    #[test]
    fn default_marker_without_any_default_fails() {
        let err = single("compileSdk", &[req("compileSdk", "inherit", "[versions]")]).unwrap_err();
        assert!(matches!(err, DroidplanError::UnresolvableVersion { .. }));
    }

    #[test]
    fn toolchain_default_beats_catalog_default() {
        let mut defaults = BTreeMap::new();
        defaults.insert("minSdk".to_string(), "24".to_string());
        let r = resolve_group(&["minSdk".to_string()], &[], &catalog(), &defaults).unwrap();
        assert_eq!(r.version, "24");
        assert_eq!(r.origin, VersionOrigin::ToolchainDefault);
    }

    #[test]
    fn uncatalogued_toolchain_default_falls_back() {
        let mut defaults = BTreeMap::new();
        defaults.insert("minSdk".to_string(), "19".to_string());
        let r = resolve_group(&["minSdk".to_string()], &[], &catalog(), &defaults).unwrap();
        assert_eq!(r.version, "21");
        assert_eq!(r.origin, VersionOrigin::CatalogDefault);
    }

    #[test]
    fn minimum_prefers_satisfying_default() {
        let r = single("minSdk", &[req("minSdk", ">=21", "[versions]")]).unwrap();
        assert_eq!(r.version, "21");
    }

    #[test]
    fn minimum_above_default_takes_highest() {
        let r = single("jvmTarget", &[req("jvmTarget", "12+", "plugin kotlin")]).unwrap();
        assert_eq!(r.version, "17");
    }

    #[test]
    fn range_without_default_takes_highest() {
        let r = single("compileSdk", &[req("compileSdk", "[33,35)", "[versions]")]).unwrap();
        assert_eq!(r.version, "34");
    }

    #[test]
    fn compatible_requirements_intersect() {
        let r = single(
            "jvmTarget",
            &[
                req("jvmTarget", "11", "[versions]"),
                req("jvmTarget", ">=8", "plugin kotlin"),
            ],
        )
        .unwrap();
        assert_eq!(r.version, "11");
        assert_eq!(
            r.origin,
            VersionOrigin::Constrained {
                requirements: vec![
                    "[versions]: 11".to_string(),
                    "plugin kotlin: >=8".to_string()
                ]
            }
        );
    }

    #[test]
    fn contradictory_requirements_name_both_sides() {
        let err = single(
            "jvmTarget",
            &[
                req("jvmTarget", "11", "[versions]"),
                req("jvmTarget", ">=17", "plugin kotlin"),
            ],
        )
        .unwrap_err();
        match err {
            DroidplanError::UnresolvableVersion { requirements, .. } => {
                assert_eq!(requirements.len(), 2);
                assert!(requirements[0].starts_with("[versions]"));
                assert!(requirements[1].starts_with("plugin kotlin"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_expression_is_unresolvable() {
        let err = single("jvmTarget", &[req("jvmTarget", ">=", "[versions]")]).unwrap_err();
        assert!(matches!(err, DroidplanError::UnresolvableVersion { .. }));
    }

    #[test]
    fn uncatalogued_component_accepts_exact_pin() {
        let r = single(
            "ndkVersion",
            &[req("ndkVersion", "27.0.12077973", "[versions]")],
        )
        .unwrap();
        assert_eq!(r.version, "27.0.12077973");
    }

    #[test]
    fn uncatalogued_component_rejects_ranges() {
        let err = single("ndkVersion", &[req("ndkVersion", ">=27", "[versions]")]).unwrap_err();
        assert!(matches!(err, DroidplanError::UnresolvableVersion { .. }));
    }

    #[test]
    fn linked_components_resolve_together() {
        let ctx = ResolutionContext::default();
        let resolved = resolve_all(
            &[req("jvmTarget", ">=11", "plugin kotlin")],
            &catalog(),
            &ctx,
        )
        .unwrap();
        // targetCompatibility's list is wider, but only 8/11/17 are shared;
        // the first catalogued default (17) wins and satisfies the floor.
        assert_eq!(resolved["jvmTarget"].version, "17");
        assert_eq!(resolved["targetCompatibility"].version, "17");
    }

    #[test]
    fn linked_components_without_shared_versions_are_unresolvable() {
        let catalog = CatalogFile::parse(
            r#"
[components.targetCompatibility]
available = ["8", "11"]

[components.jvmTarget]
available = ["17", "21"]
"#,
        )
        .unwrap();
        let ctx = ResolutionContext::default();
        let err = resolve_all(&[req("jvmTarget", "99", "[versions]")], &catalog, &ctx).unwrap_err();
        match err {
            DroidplanError::UnresolvableVersion {
                component,
                reason,
                requirements,
            } => {
                assert_eq!(component, "sourceCompatibility/targetCompatibility/jvmTarget");
                assert!(reason.contains("targetCompatibility [8, 11]"), "{reason}");
                assert!(reason.contains("jvmTarget [17, 21]"), "{reason}");
                assert_eq!(requirements, vec!["[versions]: 99".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn source_and_target_compatibility_must_agree() {
        let ctx = ResolutionContext::default();
        let err = resolve_all(
            &[
                req("sourceCompatibility", "11", "[versions]"),
                req("targetCompatibility", "17", "[variants.release.versions]"),
            ],
            &catalog(),
            &ctx,
        )
        .unwrap_err();
        match err {
            DroidplanError::UnresolvableVersion { requirements, .. } => {
                assert_eq!(
                    requirements,
                    vec![
                        "[versions]: 11".to_string(),
                        "[variants.release.versions]: 17".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn linked_pins_that_disagree_conflict() {
        let ctx = ResolutionContext::default();
        let err = resolve_all(
            &[
                req("jvmTarget", "11", "[versions]"),
                req("targetCompatibility", "17", "[variants.release.versions]"),
            ],
            &catalog(),
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, DroidplanError::UnresolvableVersion { .. }));
    }

    #[test]
    fn components_in_play() {
        let ctx = ResolutionContext::default();
        let resolved = resolve_all(&[], &catalog(), &ctx).unwrap();
        assert!(resolved.contains_key("minSdk"));
        // compileSdk has neither a requirement nor a default
        assert!(!resolved.contains_key("compileSdk"));
    }
}
