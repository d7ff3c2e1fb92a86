//! Maven repository access for platform (BOM) imports: POM parsing,
//! `dependencyManagement` extraction, downloads, and a local POM cache.

pub mod cache;
pub mod download;
pub mod fetcher;
pub mod pom;
pub mod repository;
