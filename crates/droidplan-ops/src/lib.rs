//! Operations behind each `droidplan` command.
//!
//! Every operation takes the project directory, loads what it needs through
//! [`project::load_engine`], and reports back through `miette::Result`.

pub mod fetchers;
pub mod ops_check;
pub mod ops_explain;
pub mod ops_init;
pub mod ops_plugins;
pub mod ops_resolve;
pub mod project;
