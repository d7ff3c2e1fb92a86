//! Command dispatch and handler modules.

mod check;
mod explain;
mod init;
mod plugins;
mod resolve;

use std::path::PathBuf;

use miette::Result;

use droidplan_ops::project::ProjectOptions;
use droidplan_util::errors::DroidplanError;

use crate::cli::{Cli, Command, LoadArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            variants,
            format,
            out,
            load,
        } => resolve::exec(&load, variants, &format, out).await,
        Command::Check { load } => check::exec(&load).await,
        Command::Explain { variant, key, load } => {
            explain::exec(&load, &variant, key.as_deref()).await
        }
        Command::Plugins { load } => plugins::exec(&load).await,
        Command::Init { force } => init::exec(force),
    }
}

fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir().map_err(DroidplanError::Io)?)
}

/// Global config and SDK discovery, overridden by the command-line flags.
fn project_options(load: &LoadArgs) -> Result<ProjectOptions> {
    Ok(ProjectOptions::load()?
        .with_catalog(load.catalog.clone())
        .with_offline(load.offline)
        .with_jobs(load.jobs)
        .with_android_sdk_home(load.android_sdk.as_deref()))
}
