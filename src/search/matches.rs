//! Per-entity match bookkeeping shared by the matchers and the ranker

use crate::catalog::MonsterId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Which entity-side set a token hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Name,
    Manual,
    Fluff,
    Modifier,
    Special,
    Subquery,
}

/// Evidence that one query token matched one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenMatch {
    /// Query-side value, without sign or quotes
    pub token: String,
    /// Entity-side string that satisfied it
    pub matched: String,
    pub kind: MatchKind,
    /// Similarity that produced the hit (1.0 for exact and predicate hits)
    pub ratio: f64,
    /// False for hits a negated token must not count (sub-attribute matches)
    pub can_negate: bool,
    /// Winning branch of an OR token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub or_index: Option<usize>,
}

impl TokenMatch {
    pub fn new(token: &str, matched: &str, kind: MatchKind, ratio: f64) -> Self {
        Self {
            token: token.to_string(),
            matched: matched.to_string(),
            kind,
            ratio,
            can_negate: true,
            or_index: None,
        }
    }

    pub fn non_negatable(mut self) -> Self {
        self.can_negate = false;
        self
    }

    pub fn with_or_index(mut self, index: usize) -> Self {
        self.or_index = Some(index);
        self
    }
}

/// Accumulated score and evidence for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchEntry {
    pub score: f64,
    pub name_matches: Vec<TokenMatch>,
    pub modifier_matches: Vec<TokenMatch>,
    /// Set when the entity only entered through evo-tree expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_evo: Option<MonsterId>,
}

impl MatchEntry {
    /// Sum of the winning OR-branch indices
    pub fn or_priority(&self) -> usize {
        self.modifier_matches
            .iter()
            .filter_map(|m| m.or_index)
            .sum()
    }

    /// Whether every name-token hit was exact
    pub fn is_exact_name_match(&self) -> bool {
        self.from_evo.is_none() && self.name_matches.iter().all(|m| m.ratio >= 1.0)
    }
}

pub type ScoringMap = BTreeMap<MonsterId, MatchEntry>;

/// Side information returned with every result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extras {
    /// Subquery token value → result entities it matched
    pub subquery_matches: BTreeMap<String, BTreeSet<MonsterId>>,
    /// Subquery token value → entities the nested query returned
    pub subquery_results: BTreeMap<String, BTreeSet<MonsterId>>,
    /// Reserved; always 0 today
    pub return_code: i32,
}
