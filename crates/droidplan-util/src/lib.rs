//! Shared utilities for droidplan.
//!
//! This crate provides cross-cutting concerns used by all other droidplan
//! crates: the unified error type, filesystem helpers, and terminal status
//! output.

pub mod errors;
pub mod fs;
pub mod progress;

use std::path::{Path, PathBuf};

/// Returns the path to the droidplan data directory (`~/.droidplan/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".droidplan")
}
