//! Operation: print the plugin application order.

use std::path::Path;

use crate::project::{self, Interrupt, ProjectOptions};

/// The plugin ids in the order they are applied.
pub async fn plugins(project_dir: &Path, opts: &ProjectOptions) -> miette::Result<Vec<String>> {
    let engine = project::load_engine(project_dir, opts, &Interrupt::listen()).await?;
    let order = engine.plugin_order().to_vec();
    for (i, id) in order.iter().enumerate() {
        let plugin = engine
            .input()
            .descriptor
            .plugins
            .iter()
            .find(|p| &p.id == id);
        match plugin.and_then(|p| p.version.as_deref()) {
            Some(version) => println!("{:>3}. {id} {version}", i + 1),
            None => println!("{:>3}. {id}", i + 1),
        }
    }
    Ok(order)
}
