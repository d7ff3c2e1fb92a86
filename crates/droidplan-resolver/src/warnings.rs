//! Non-fatal platform shadowing warnings.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Two or more platforms pin different versions of the same coordinate; the
/// first platform in declaration order was used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ShadowingWarning {
    /// `group:artifact`
    pub coordinate: String,
    pub used_platform: String,
    pub used_version: String,
    /// `(platform, version)` pairs that lost.
    pub shadowed: Vec<(String, String)>,
}

impl fmt::Display for ShadowingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: using {} from {}",
            self.coordinate, self.used_version, self.used_platform
        )?;
        for (platform, version) in &self.shadowed {
            write!(f, ", shadowing {version} from {platform}")?;
        }
        Ok(())
    }
}

/// Warnings collected across every variant of a run, deduplicated and sorted.
#[derive(Debug, Default, Clone)]
pub struct WarningReport {
    warnings: BTreeSet<ShadowingWarning>,
}

impl WarningReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, warning: ShadowingWarning) {
        self.warnings.insert(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = ShadowingWarning>) {
        self.warnings.extend(warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShadowingWarning> {
        self.warnings.iter()
    }
}

impl fmt::Display for WarningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.warnings.is_empty() {
            return write!(f, "No platform shadowing.");
        }
        writeln!(f, "Platform shadowing ({}):", self.warnings.len())?;
        for w in &self.warnings {
            writeln!(f, "  {w}")?;
        }
        Ok(())
    }
}
