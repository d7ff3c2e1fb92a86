use serde::{Deserialize, Serialize};
use std::fmt;

/// A version expression as written in TOML: either a string (`"11"`,
/// `">=21"`, `"[21,35]"`) or a bare integer (`compileSdk = 35`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Number(i64),
    Text(String),
}

impl VersionValue {
    /// The expression text.
    pub fn as_expr(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_expr())
    }
}

/// A requested version for one toolchain component, tagged with where the
/// request came from so conflicts can name both sides.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionRequirement {
    pub component: String,
    pub requested: String,
    pub origin: String,
}

impl VersionRequirement {
    pub fn new(component: &str, requested: &str, origin: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            requested: requested.to_string(),
            origin: origin.into(),
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires {} {}", self.origin, self.component, self.requested)
    }
}
