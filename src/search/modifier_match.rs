//! Modifier Matching
//!
//! Filters the name candidates through each modifier token in turn, positive
//! tokens first.

use super::matches::ScoringMap;
use super::token::{MatchContext, Token};
use crate::catalog::MonsterId;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ModifierMatch {
    pub valid: BTreeSet<MonsterId>,
    /// Subquery token value → candidates it accepted
    pub subquery_matches: BTreeMap<String, BTreeSet<MonsterId>>,
}

/// Apply modifier tokens to `candidates`, accumulating into `scores`.
///
/// A positive token keeps entities it scores above zero. A negated token
/// drops entities it scores above zero, except through hits that cannot be
/// negated (sub and third attribute matches).
pub fn match_modifiers(
    modifiers: &[Token],
    candidates: BTreeSet<MonsterId>,
    scores: &mut ScoringMap,
    ctx: &MatchContext<'_>,
) -> ModifierMatch {
    let mut valid = candidates;
    let mut subquery_matches: BTreeMap<String, BTreeSet<MonsterId>> = BTreeMap::new();

    let ordered = modifiers
        .iter()
        .filter(|t| !t.negated)
        .chain(modifiers.iter().filter(|t| t.negated));

    for token in ordered {
        let before = valid.len();
        let mut kept = BTreeSet::new();
        for id in valid {
            let Some(monster) = ctx.graph.get_monster(id) else {
                continue;
            };
            let (score, evidence) = token.matches(monster, ctx);
            let hit = score > 0.0;

            if token.negated {
                let negatable = evidence.as_ref().map_or(true, |m| m.can_negate);
                if !(hit && negatable) {
                    kept.insert(id);
                }
                continue;
            }

            if !hit {
                continue;
            }
            let entry = scores.entry(id).or_default();
            entry.score += score;
            if let Some(evidence) = evidence {
                entry.modifier_matches.push(evidence);
            }
            if token.is_subquery() {
                subquery_matches
                    .entry(token.value.clone())
                    .or_default()
                    .insert(id);
            }
            kept.insert(id);
        }
        debug!(
            "Modifier {}'{}' kept {}/{} candidates",
            if token.negated { "-" } else { "" },
            token.value,
            kept.len(),
            before
        );
        valid = kept;
    }

    for &id in &valid {
        scores.entry(id).or_default();
    }
    ModifierMatch {
        valid,
        subquery_matches,
    }
}
