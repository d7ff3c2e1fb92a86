//! Resolution engine: turns a loaded project descriptor into one
//! conflict-free build plan per variant.
//!
//! The leaves ([`version`], [`constraint`], [`bom`], [`variant_graph`],
//! [`sequencer`]) are pure functions over immutable input; [`engine`]
//! orchestrates them per variant and [`load`] performs the one-time,
//! cancelable loading stage.

pub mod bom;
pub mod constraint;
pub mod engine;
pub mod load;
pub mod sequencer;
pub mod variant_graph;
pub mod version;
pub mod warnings;
