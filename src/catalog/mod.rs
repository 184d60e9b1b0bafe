//! Creature catalog: record types, the relationship graph and snapshot loading

pub mod graph;
pub mod loader;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use graph::MonsterGraph;
pub use loader::load_snapshot;
pub use types::*;
