use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dependency::DependencySpec;
use crate::requirement::VersionValue;

/// An inheritable variant attribute such as `signingConfig` or `isMinified`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A `[variants.<name>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantTable {
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Per-variant version requirements, overriding `[versions]`.
    #[serde(default)]
    pub versions: BTreeMap<String, VersionValue>,

    /// Extra dependencies for this variant and the variants inheriting from it.
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// A named build configuration (e.g. `debug`, `release`).
#[derive(Debug, Clone)]
pub struct BuildVariant {
    pub name: String,
    pub parent: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub versions: BTreeMap<String, VersionValue>,
    pub dependencies: Vec<DependencySpec>,
}

impl BuildVariant {
    /// A bare variant with no attributes, mostly for programmatic use.
    pub fn new(name: &str, parent: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            attributes: BTreeMap::new(),
            versions: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn from_table(name: &str, table: &VariantTable) -> Self {
        Self {
            name: name.to_string(),
            parent: table.parent.clone(),
            attributes: table.attributes.clone(),
            versions: table.versions.clone(),
            dependencies: table.dependencies.clone(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// How missing attributes are treated, from the `[attributes]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributePolicy {
    /// Keys every variant must define somewhere on its ancestor chain.
    #[serde(default)]
    pub required: Vec<String>,

    /// Safe values used when no variant on the chain defines the key.
    #[serde(default)]
    pub defaults: BTreeMap<String, AttributeValue>,
}
