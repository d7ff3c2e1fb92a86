//! Resolve command implementation.

use std::path::PathBuf;

use miette::Result;

use droidplan_core::plan::PlanFormat;
use droidplan_ops::ops_resolve::ResolveRequest;

use crate::cli::LoadArgs;

pub async fn exec(
    load: &LoadArgs,
    variants: Vec<String>,
    format: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let format: PlanFormat = format.parse()?;
    let cwd = super::current_dir()?;
    let opts = super::project_options(load)?;
    let request = ResolveRequest {
        variants,
        format,
        out,
    };
    droidplan_ops::ops_resolve::resolve(&cwd, &opts, &request).await?;
    Ok(())
}
