//! Name Matching
//!
//! Scores candidates from name tokens, then widens the candidate set to whole
//! evolution trees.

use super::matches::{MatchEntry, MatchKind, ScoringMap, TokenMatch};
use super::similarity::{name_ratio, EPSILON};
use super::token::Token;
use crate::catalog::{MonsterGraph, MonsterId};
use crate::index::MonsterIndex;
use crate::text::is_all_digits;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Score multiplier for negated name tokens
const NEGATIVE_MULT: f64 = -10.0;

/// Evo-derived entries trail their source by this much
const EVO_PENALTY: f64 = 3.0 * EPSILON;

/// Candidates and scores produced from the name tokens
#[derive(Debug, Clone, Default)]
pub struct NameMatch {
    pub scores: ScoringMap,
    pub valid: BTreeSet<MonsterId>,
}

/// Match name tokens against `universe`, expand along evolution trees and
/// drop anything a negated name token hit.
pub fn match_names(
    name_tokens: &[Token],
    index: &MonsterIndex,
    graph: &MonsterGraph,
    universe: &BTreeSet<MonsterId>,
    threshold: f64,
) -> NameMatch {
    let mut scores = ScoringMap::new();
    let mut valid: Option<BTreeSet<MonsterId>> = None;

    for token in name_tokens.iter().filter(|t| !t.negated) {
        let hits = token_hits(token, index, universe, threshold);
        debug!("Name token '{}' hit {} monsters", token.value, hits.len());
        let ids: BTreeSet<MonsterId> = hits.keys().copied().collect();
        for (id, (weight, evidence)) in hits {
            let entry = scores.entry(id).or_default();
            entry.score += weight;
            entry.name_matches.push(evidence);
        }
        valid = Some(match valid {
            Some(prev) => prev.intersection(&ids).copied().collect(),
            None => ids,
        });
    }
    let mut valid = valid.unwrap_or_else(|| universe.clone());

    let mut invalid = BTreeSet::new();
    for token in name_tokens.iter().filter(|t| t.negated) {
        for (id, (weight, _)) in token_hits(token, index, universe, threshold) {
            if let Some(entry) = scores.get_mut(&id) {
                entry.score += weight * NEGATIVE_MULT;
            }
            invalid.insert(id);
        }
    }

    if name_tokens.iter().any(|t| !t.negated) {
        expand_evos(&mut scores, &mut valid, graph, universe);
    }
    valid.retain(|id| !invalid.contains(id));

    NameMatch { scores, valid }
}

/// Best weighted hit per entity for one name token.
///
/// Manual hits weigh `ratio + ε`, name hits `ratio` and fluff hits half.
fn token_hits(
    token: &Token,
    index: &MonsterIndex,
    universe: &BTreeSet<MonsterId>,
    threshold: f64,
) -> BTreeMap<MonsterId, (f64, TokenMatch)> {
    let value = token.value.as_str();
    let mut hits: BTreeMap<MonsterId, (f64, TokenMatch)> = BTreeMap::new();

    for word in index.all_name_tokens() {
        let ratio = name_ratio(value, word, token.exact, index);
        let digits = is_all_digits(value) && is_all_digits(word);
        let prefix_hit = !token.exact && !digits && word.starts_with(value);
        if ratio <= threshold && !prefix_hit {
            continue;
        }

        let sets = [
            (index.manual_token_monsters(word), MatchKind::Manual, ratio + EPSILON),
            (index.name_token_monsters(word), MatchKind::Name, ratio),
            (index.fluff_token_monsters(word), MatchKind::Fluff, ratio / 2.0),
        ];
        for (ids, kind, weight) in sets {
            for &id in ids.intersection(universe) {
                let better = hits.get(&id).map_or(true, |(w, _)| weight > *w);
                if better {
                    hits.insert(id, (weight, TokenMatch::new(value, word, kind, ratio)));
                }
            }
        }
    }
    hits
}

/// Pull every alt-evo of a candidate into the candidate set.
///
/// A derived entry scores its best source minus `3ε`; an entity keeps its
/// own score when that is at least as high.
fn expand_evos(
    scores: &mut ScoringMap,
    valid: &mut BTreeSet<MonsterId>,
    graph: &MonsterGraph,
    universe: &BTreeSet<MonsterId>,
) {
    let mut derived: BTreeMap<MonsterId, MatchEntry> = BTreeMap::new();
    for &source in valid.iter() {
        let Some(source_entry) = scores.get(&source) else {
            continue;
        };
        let score = source_entry.score - EVO_PENALTY;
        for &alt in graph.get_alt_ids(source) {
            if alt == source || !universe.contains(&alt) {
                continue;
            }
            let better = derived.get(&alt).map_or(true, |e| score > e.score);
            if better {
                derived.insert(
                    alt,
                    MatchEntry {
                        score,
                        name_matches: source_entry.name_matches.clone(),
                        modifier_matches: Vec::new(),
                        from_evo: Some(source),
                    },
                );
            }
        }
    }

    for (alt, entry) in derived {
        let keeps_own = valid.contains(&alt)
            && scores.get(&alt).is_some_and(|own| own.score >= entry.score);
        if !keeps_own {
            scores.insert(alt, entry);
        }
        valid.insert(alt);
    }
}
