use miette::Result;

use crate::cli::LoadArgs;

pub async fn exec(load: &LoadArgs, variant: &str, key: Option<&str>) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = super::project_options(load)?;
    let text = droidplan_ops::ops_explain::explain(&cwd, &opts, variant, key).await?;
    print!("{text}");
    Ok(())
}
