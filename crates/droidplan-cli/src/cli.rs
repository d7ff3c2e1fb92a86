//! CLI argument definitions for droidplan.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "droidplan",
    version,
    about = "Resolve Android build plans from a declarative project descriptor",
    long_about = "droidplan reads a Droidplan.toml descriptor, orders its plugins, resolves \
                  toolchain versions against a catalog, aligns dependencies with imported \
                  platforms (BOMs), and emits one build plan per variant."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve build plans for every variant (or the selected ones)
    Resolve {
        /// Variant to resolve; repeat for several
        #[arg(long = "variant", value_name = "NAME")]
        variants: Vec<String>,
        /// Output format: text, json, toml
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Write the plans to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Validate the descriptor and report advisories
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Show where each value in a variant's plan came from
    Explain {
        /// Variant name
        variant: String,
        /// Only explain this component, dependency (group:artifact) or attribute
        #[arg(long)]
        key: Option<String>,
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print the plugin application order
    Plugins {
        #[command(flatten)]
        load: LoadArgs,
    },

    /// Create Droidplan.toml and catalog.toml in the current directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by every command that loads a project.
#[derive(clap::Args, Debug, Clone)]
pub struct LoadArgs {
    /// Version catalog to use instead of the descriptor's `project.catalog`
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
    /// Only use platforms already in the local store
    #[arg(long, env = "DROIDPLAN_OFFLINE")]
    pub offline: bool,
    /// Maximum number of variants resolved at once
    #[arg(short, long)]
    pub jobs: Option<usize>,
    /// Android SDK whose installed platforms extend the catalog
    #[arg(long, value_name = "DIR")]
    pub android_sdk: Option<PathBuf>,
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
