//! POM parsing for BOMs: properties, parent reference, and
//! `dependencyManagement` entries including nested BOM imports.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use droidplan_util::errors::{DroidplanError, ResolveResult};

const DEP_MGMT_ENTRY: &str = "project>dependencyManagement>dependencies>dependency";

/// The parts of a POM that matter for version management.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependency_management: Vec<ManagedDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone, Default)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// One `<dependencyManagement>` entry.
#[derive(Debug, Clone, Default)]
pub struct ManagedDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub type_: Option<String>,
}

impl ManagedDependency {
    /// `group:artifact`
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// A `<scope>import</scope>` entry of type `pom`, i.e. a nested BOM.
    pub fn is_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.type_.as_deref().unwrap_or("jar") == "pom"
    }
}

impl Pom {
    /// Effective group ID (falls back to parent).
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Effective version (falls back to parent).
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// Resolve `${property}` references using POM properties and the
    /// built-in project variables. Unknown references are left as written.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        for _ in 0..20 {
            if !result.contains("${") {
                break;
            }
            let mut next = String::with_capacity(result.len());
            let mut rest = result.as_str();
            while let Some(start) = rest.find("${") {
                let Some(end) = rest[start..].find('}') else {
                    break;
                };
                let key = &rest[start + 2..start + end];
                next.push_str(&rest[..start]);
                match self.resolve_property(key) {
                    Some(value) => next.push_str(&value),
                    None => next.push_str(&rest[start..start + end + 1]),
                }
                rest = &rest[start + end + 1..];
            }
            next.push_str(rest);
            if next == result {
                break;
            }
            result = next;
        }
        result
    }

    fn resolve_property(&self, key: &str) -> Option<String> {
        match key {
            "project.groupId" | "pom.groupId" => self.effective_group_id().map(str::to_string),
            "project.artifactId" | "pom.artifactId" => self.artifact_id.clone(),
            "project.version" | "pom.version" => self.effective_version().map(str::to_string),
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Interpolate every `dependencyManagement` entry in place.
    pub fn resolve_properties(&mut self) {
        let snapshot = self.clone();
        for dep in &mut self.dependency_management {
            dep.group_id = snapshot.interpolate(&dep.group_id);
            dep.artifact_id = snapshot.interpolate(&dep.artifact_id);
            if let Some(v) = &dep.version {
                dep.version = Some(snapshot.interpolate(v));
            }
        }
    }

    /// Inherit properties, coordinates and managed versions from a parent.
    /// Entries this POM declares itself take precedence.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(str::to_string);
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(str::to_string);
        }
        for dm in &parent.dependency_management {
            let overridden = self
                .dependency_management
                .iter()
                .any(|d| d.group_id == dm.group_id && d.artifact_id == dm.artifact_id);
            if !overridden {
                self.dependency_management.push(dm.clone());
            }
        }
    }

    /// Version managed for `group:artifact`, ignoring nested imports.
    pub fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        self.dependency_management
            .iter()
            .filter(|d| !d.is_import())
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
            .and_then(|d| d.version.as_deref())
    }

    /// Nested BOM imports, in declaration order.
    pub fn bom_imports(&self) -> Vec<&ManagedDependency> {
        self.dependency_management
            .iter()
            .filter(|d| d.is_import())
            .collect()
    }

    /// Versioned, non-import entries as `group:artifact -> version`.
    pub fn managed_versions(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for dep in self.dependency_management.iter().filter(|d| !d.is_import()) {
            if let Some(version) = &dep.version {
                out.entry(dep.key()).or_insert_with(|| version.clone());
            }
        }
        out
    }
}

/// Parse POM XML.
pub fn parse_pom(xml: &str) -> ResolveResult<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = Pom::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut current_dep: Option<ManagedDependency> = None;
    let mut current_parent: Option<ParentRef> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text.clear();
                match path.join(">").as_str() {
                    DEP_MGMT_ENTRY => current_dep = Some(ManagedDependency::default()),
                    "project>parent" => current_parent = Some(ParentRef::default()),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                text = e
                    .unescape()
                    .map_err(|err| DroidplanError::Generic {
                        message: format!("Failed to parse POM XML: {err}"),
                    })?
                    .to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path.join(">");
                let leaf = path.last().map(String::as_str);

                if path.len() == 3 && path.get(1).map(String::as_str) == Some("properties") {
                    if let Some(name) = leaf {
                        pom.properties.insert(name.to_string(), text.clone());
                    }
                }

                if let Some(dep) = current_dep.as_mut() {
                    if ctx.len() > DEP_MGMT_ENTRY.len() && ctx.starts_with(DEP_MGMT_ENTRY) {
                        match leaf {
                            Some("groupId") => dep.group_id = text.clone(),
                            Some("artifactId") => dep.artifact_id = text.clone(),
                            Some("version") => dep.version = Some(text.clone()),
                            Some("scope") => dep.scope = Some(text.clone()),
                            Some("type") => dep.type_ = Some(text.clone()),
                            _ => {}
                        }
                    }
                }
                if ctx == DEP_MGMT_ENTRY {
                    if let Some(dep) = current_dep.take() {
                        pom.dependency_management.push(dep);
                    }
                }

                if let Some(parent) = current_parent.as_mut() {
                    match ctx.as_str() {
                        "project>parent>groupId" => parent.group_id = text.clone(),
                        "project>parent>artifactId" => parent.artifact_id = text.clone(),
                        "project>parent>version" => parent.version = text.clone(),
                        _ => {}
                    }
                }
                if ctx == "project>parent" {
                    pom.parent = current_parent.take();
                }

                if path.len() == 2 {
                    match leaf {
                        Some("groupId") => pom.group_id = Some(text.clone()),
                        Some("artifactId") => pom.artifact_id = Some(text.clone()),
                        Some("version") => pom.version = Some(text.clone()),
                        Some("packaging") => pom.packaging = Some(text.clone()),
                        _ => {}
                    }
                }

                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DroidplanError::Generic {
                    message: format!("Failed to parse POM XML: {e}"),
                });
            }
            _ => {}
        }
    }

    Ok(pom)
}
