//! Maven repository configuration and URL layout.

use droidplan_core::descriptor::RepositoryEntry;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Google's Maven repository, home of the Firebase and AndroidX BOMs.
pub const GOOGLE_MAVEN_URL: &str = "https://maven.google.com";

/// A configured Maven repository with optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MavenRepository {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    /// Build a repository from a `[repositories]` entry in `Droidplan.toml`.
    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Self {
        match entry {
            RepositoryEntry::Url(url) => Self::new(name, url),
            RepositoryEntry::Detailed {
                url,
                username,
                password,
            } => Self {
                username: username.clone(),
                password: password.clone(),
                ..Self::new(name, url)
            },
        }
    }

    pub fn maven_central() -> Self {
        Self::new("maven-central", MAVEN_CENTRAL_URL)
    }

    pub fn google() -> Self {
        Self::new("google", GOOGLE_MAVEN_URL)
    }

    /// Standard Maven layout path for a coordinate.
    ///
    /// `com.google.firebase:firebase-bom:34.5.0` becomes
    /// `com/google/firebase/firebase-bom/34.5.0`
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
    }

    /// URL to the POM file for a coordinate.
    pub fn pom_url(&self, group: &str, artifact: &str, version: &str) -> String {
        format!(
            "{}/{}/{artifact}-{version}.pom",
            self.url,
            Self::coordinate_path(group, artifact, version)
        )
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}
