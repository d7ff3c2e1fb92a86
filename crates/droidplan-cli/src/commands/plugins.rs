use miette::Result;

use crate::cli::LoadArgs;

pub async fn exec(load: &LoadArgs) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = super::project_options(load)?;
    droidplan_ops::ops_plugins::plugins(&cwd, &opts).await?;
    Ok(())
}
