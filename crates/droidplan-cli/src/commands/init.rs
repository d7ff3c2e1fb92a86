use miette::Result;

pub fn exec(force: bool) -> Result<()> {
    let cwd = super::current_dir()?;
    let written = droidplan_ops::ops_init::init(&cwd, force)?;
    for path in &written {
        println!("Created {}", path.display());
    }
    Ok(())
}
