//! Monster lookup: fuzzy query evaluation over a catalog snapshot
//!
//! The pipeline runs parser → token classification → interpretation →
//! name matching with evo expansion → modifier matching → priority ranking.
//! See [`engine::MonsterFinder`] for the entry point.

pub mod classify;
pub mod engine;
pub mod matches;
pub mod merge;
pub mod modifier_match;
pub mod name_match;
pub mod parser;
pub mod ranking;
pub mod similarity;
pub mod special;
pub mod subquery;
pub mod token;
pub mod typos;


pub use engine::{MonsterFinder, MonsterInfo};
pub use matches::{Extras, MatchEntry, MatchKind, ScoringMap, TokenMatch};
pub use parser::{ParsedQuery, QueryParser};
pub use typos::{typo_log, TypoLog, TypoLogWriter};
