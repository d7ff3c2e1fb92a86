//! Check command implementation.

use miette::Result;

use crate::cli::LoadArgs;

pub async fn exec(load: &LoadArgs) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = super::project_options(load)?;
    let report = droidplan_ops::ops_check::check(&cwd, &opts).await?;
    if report.advisories.is_empty() {
        println!("No problems found");
    }
    Ok(())
}
