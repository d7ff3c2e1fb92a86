//! Core data types for droidplan.
//!
//! This crate defines what a project looks like before resolution: the
//! `Droidplan.toml` descriptor, plugin declarations, build variants and their
//! attributes, dependency coordinates, platform (BOM) imports, version
//! catalogs, the explicit resolution context, and the build plans produced
//! at the end.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod android_sdk;
pub mod catalog;
pub mod config;
pub mod context;
pub mod dependency;
pub mod descriptor;
pub mod plan;
pub mod platform;
pub mod plugin;
pub mod properties;
pub mod requirement;
pub mod template;
pub mod variant;
