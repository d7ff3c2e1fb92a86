//! Build variants as a forest linked by parent names.
//!
//! Edges point from child to parent, so each node has at most one outgoing
//! edge and every strongly connected component with more than one node (or a
//! self-loop) is exactly one cycle.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeMap;

use droidplan_core::dependency::DependencyCoordinate;
use droidplan_core::requirement::VersionRequirement;
use droidplan_core::variant::{AttributePolicy, AttributeValue, BuildVariant};
use droidplan_util::errors::{DroidplanError, ResolveResult};

/// Validated variant inheritance graph.
#[derive(Debug)]
pub struct VariantGraph {
    graph: DiGraph<String, ()>,
    indices: BTreeMap<String, NodeIndex>,
    variants: BTreeMap<String, BuildVariant>,
}

impl VariantGraph {
    /// Build the graph, rejecting duplicate names, unknown parents and cycles.
    pub fn load(variants: Vec<BuildVariant>) -> ResolveResult<Self> {
        let mut graph = DiGraph::new();
        let mut indices = BTreeMap::new();
        let mut by_name = BTreeMap::new();

        for variant in variants {
            if by_name.contains_key(&variant.name) {
                return Err(DroidplanError::Descriptor {
                    message: format!("Variant '{}' is declared more than once", variant.name),
                });
            }
            let idx = graph.add_node(variant.name.clone());
            indices.insert(variant.name.clone(), idx);
            by_name.insert(variant.name.clone(), variant);
        }

        for variant in by_name.values() {
            let Some(parent) = &variant.parent else {
                continue;
            };
            let Some(&to) = indices.get(parent) else {
                return Err(DroidplanError::UnknownVariant {
                    variant: variant.name.clone(),
                    parent: parent.clone(),
                });
            };
            graph.add_edge(indices[&variant.name], to, ());
        }

        let loaded = Self {
            graph,
            indices,
            variants: by_name,
        };
        if let Some(cycle) = loaded.find_cycle() {
            return Err(DroidplanError::InvalidVariantGraph { cycle });
        }
        Ok(loaded)
    }

    /// The cycle whose smallest member sorts first, walked from that member.
    fn find_cycle(&self) -> Option<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0])
            })
            .filter_map(|scc| {
                scc.iter().map(|&idx| self.graph[idx].clone()).min()
            })
            .min()
            .map(|start| {
                let mut cycle = vec![start.clone()];
                let mut current = self.variants[&start].parent.clone();
                while let Some(name) = current {
                    if name == start {
                        break;
                    }
                    current = self.variants[&name].parent.clone();
                    cycle.push(name);
                }
                cycle
            })
    }

    pub fn get(&self, name: &str) -> Option<&BuildVariant> {
        self.variants.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Variant names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.variants.keys().cloned().collect()
    }

    /// The variant followed by its parents up to the root.
    pub fn ancestors(&self, name: &str) -> ResolveResult<Vec<&BuildVariant>> {
        let mut chain = Vec::new();
        let mut current = Some(name);
        while let Some(n) = current {
            let variant = self.variants.get(n).ok_or_else(|| DroidplanError::Generic {
                message: format!("Unknown variant '{n}'"),
            })?;
            chain.push(variant);
            current = variant.parent.as_deref();
        }
        Ok(chain)
    }

    /// Nearest definition of `key` on the ancestor chain.
    pub fn attribute(&self, name: &str, key: &str) -> ResolveResult<&AttributeValue> {
        self.ancestors(name)?
            .into_iter()
            .find_map(|v| v.attributes.get(key))
            .ok_or_else(|| DroidplanError::MissingAttribute {
                variant: name.to_string(),
                key: key.to_string(),
            })
    }

    /// The ancestor chain merged over the policy defaults, nearest winning.
    ///
    /// Every `required` key must be defined somewhere on the chain; a policy
    /// default does not satisfy it.
    pub fn merged_attributes(
        &self,
        name: &str,
        policy: &AttributePolicy,
    ) -> ResolveResult<BTreeMap<String, AttributeValue>> {
        for key in &policy.required {
            self.attribute(name, key)?;
        }
        let mut merged = policy.defaults.clone();
        for variant in self.ancestors(name)?.into_iter().rev() {
            merged.extend(
                variant
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        Ok(merged)
    }

    /// Version requirements declared on the chain, nearest per component.
    pub fn effective_versions(&self, name: &str) -> ResolveResult<BTreeMap<String, VersionRequirement>> {
        let mut versions = BTreeMap::new();
        for variant in self.ancestors(name)?.into_iter().rev() {
            for (component, value) in &variant.versions {
                versions.insert(
                    component.clone(),
                    VersionRequirement::new(
                        component,
                        &value.as_expr(),
                        format!("[variants.{}.versions]", variant.name),
                    ),
                );
            }
        }
        Ok(versions)
    }

    /// Dependencies declared on the chain, root first. Callers that need one
    /// entry per `group:artifact` keep the last occurrence.
    pub fn effective_dependencies(&self, name: &str) -> ResolveResult<Vec<DependencyCoordinate>> {
        let mut deps = Vec::new();
        for variant in self.ancestors(name)?.into_iter().rev() {
            for spec in &variant.dependencies {
                deps.push(spec.to_coordinate()?);
            }
        }
        Ok(deps)
    }
}
