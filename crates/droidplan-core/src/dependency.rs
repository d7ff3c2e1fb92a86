use serde::{Deserialize, Serialize};
use std::fmt;

use droidplan_util::errors::DroidplanError;

/// A dependency entry in `Droidplan.toml`.
///
/// Supports both shorthand (`"group:artifact[:version]"`) and table forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Short(String),
    Detailed(DetailedDependency),
}

/// A dependency with explicit group and artifact, and an optional version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDependency {
    pub group: String,
    pub artifact: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl DependencySpec {
    /// Convert the declaration into a coordinate, rejecting malformed shorthands.
    pub fn to_coordinate(&self) -> Result<DependencyCoordinate, DroidplanError> {
        match self {
            Self::Short(s) => DependencyCoordinate::parse(s),
            Self::Detailed(d) => Ok(DependencyCoordinate {
                group: d.group.clone(),
                artifact: d.artifact.clone(),
                version: d.version.clone().filter(|v| !v.trim().is_empty()),
            }),
        }
    }
}

/// Maven-style coordinates. A missing version means the dependency is
/// managed by an imported platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl DependencyCoordinate {
    pub fn new(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.map(str::to_string),
        }
    }

    /// Parse `"group:artifact"` or `"group:artifact:version"`.
    pub fn parse(s: &str) -> Result<Self, DroidplanError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let malformed = || DroidplanError::Descriptor {
            message: format!("Malformed dependency coordinate '{s}', expected group:artifact[:version]"),
        };
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(malformed());
        }
        match parts.as_slice() {
            [group, artifact] => Ok(Self::new(group, artifact, None)),
            [group, artifact, version] => Ok(Self::new(group, artifact, Some(version))),
            _ => Err(malformed()),
        }
    }

    /// `group:artifact` identifier, without version.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// Whether the version is left to a platform.
    pub fn is_managed(&self) -> bool {
        self.version.is_none()
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{v}", self.group, self.artifact),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}
