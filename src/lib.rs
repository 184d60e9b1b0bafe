//! find-monster: fuzzy monster lookup over a card-game catalog
//!
//! A query such as `awoken r sonia` or `3-sb equip` is tokenized, split into
//! name and modifier tokens, matched against a token index built from the
//! catalog, and ranked by a fixed tiebreaker tuple.
//!
//! - [`snapshot`]: load a catalog, build its index and publish it
//! - [`search::MonsterFinder`]: `find`, `find_all` and `find_debug`
//! - [`stdio`]: JSON-lines request loop used by the binary

pub mod catalog;
pub mod config;
pub mod error;
pub mod index;
pub mod search;
pub mod snapshot;
pub mod stdio;
pub mod text;

#[cfg(test)]
mod tests_regression;
#[cfg(test)]
mod tests_scenarios;

pub use config::FinderConfig;
pub use error::FindError;
pub use search::{Extras, MonsterFinder, MonsterInfo};
pub use snapshot::{Snapshot, SnapshotPublisher, SnapshotReader};
