//! Priority Ranking
//!
//! Every candidate gets a [`PriorityKey`]; the best result is the greatest
//! key and `find_all` lists candidates by descending key. The score comes
//! first and the fields after it only break ties, in declaration order.

use super::matches::{MatchEntry, ScoringMap};
use crate::catalog::{Monster, MonsterGraph, MonsterId, SeriesType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Ids above this are regional re-releases
const REGIONAL_ID_FLOOR: MonsterId = 50_000;

static FOUR_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}").expect("Failed to compile digit regex"));

/// Query-wide inputs to the tiebreakers
#[derive(Debug, Clone, Copy)]
pub struct RankContext<'a> {
    pub graph: &'a MonsterGraph,
    pub ormod_prio: bool,
    pub na_prio: bool,
    /// A positive `base`/`new` modifier was given
    pub prefer_equip: bool,
    /// The raw query contains a four-digit run
    pub mentions_id: bool,
}

impl<'a> RankContext<'a> {
    pub fn new(graph: &'a MonsterGraph, raw_query: &str, ormod_prio: bool, na_prio: bool, prefer_equip: bool) -> Self {
        Self {
            graph,
            ormod_prio,
            na_prio,
            prefer_equip,
            mentions_id: FOUR_DIGITS.is_match(raw_query),
        }
    }
}

/// Tiebreakers after the score, most significant first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tiebreakers {
    pub or_branch: i64,
    pub not_evo_gem: bool,
    pub equip_preference: bool,
    pub regional_id: bool,
    pub series_priority: u8,
    pub collab_on_na: bool,
    pub reincarnated: bool,
    pub not_all_material: bool,
    pub not_any_material: bool,
    pub base_id: i64,
    pub server_preference: bool,
    pub not_equip: bool,
    pub adjusted_rarity: u32,
    pub or_fallback: i64,
    pub id: MonsterId,
}

#[derive(Debug, Clone, Copy)]
pub struct PriorityKey {
    pub score: f64,
    pub tiebreakers: Tiebreakers,
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.tiebreakers.cmp(&other.tiebreakers))
    }
}

pub fn priority_key(monster: &Monster, entry: &MatchEntry, ctx: &RankContext<'_>) -> PriorityKey {
    let graph = ctx.graph;
    let or_priority = entry.or_priority() as i64;
    let series_type = graph.series_type_of(monster);
    let collab = matches!(series_type, Some(SeriesType::Collab) | Some(SeriesType::Ghcollab));
    let all_material = !monster.types.is_empty() && monster.types.iter().all(|t| t.is_material());
    let any_material = monster.types.iter().any(|t| t.is_material());

    PriorityKey {
        score: entry.score,
        tiebreakers: Tiebreakers {
            or_branch: if ctx.ormod_prio { -or_priority } else { 0 },
            not_evo_gem: !graph.is_evo_gem(monster.id),
            equip_preference: if ctx.prefer_equip {
                monster.is_equip
            } else {
                !monster.is_equip
            },
            regional_id: monster.id > REGIONAL_ID_FLOOR && ctx.mentions_id,
            series_priority: SeriesType::priority(series_type),
            collab_on_na: !collab || monster.on_na,
            reincarnated: graph.is_reincarnated(monster.id),
            not_all_material: !all_material,
            not_any_material: !any_material,
            base_id: -(graph.get_base_id(monster.id) as i64),
            server_preference: !ctx.na_prio || monster.on_na,
            not_equip: !monster.is_equip,
            adjusted_rarity: graph.adjusted_rarity(monster),
            or_fallback: -or_priority,
            id: monster.id,
        },
    }
}

/// Candidates with their keys, best first
pub fn rank<'g>(
    valid: &BTreeSet<MonsterId>,
    scores: &ScoringMap,
    ctx: &RankContext<'g>,
) -> Vec<(&'g Monster, PriorityKey)> {
    let default_entry = MatchEntry::default();
    let mut ranked: Vec<(&'g Monster, PriorityKey)> = valid
        .iter()
        .filter_map(|id| ctx.graph.get_monster(*id))
        .map(|m| {
            let entry = scores.get(&m.id).unwrap_or(&default_entry);
            (m, priority_key(m, entry, ctx))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The single best candidate
pub fn best<'g>(
    valid: &BTreeSet<MonsterId>,
    scores: &ScoringMap,
    ctx: &RankContext<'g>,
) -> Option<(&'g Monster, PriorityKey)> {
    let default_entry = MatchEntry::default();
    valid
        .iter()
        .filter_map(|id| ctx.graph.get_monster(*id))
        .map(|m| {
            let entry = scores.get(&m.id).unwrap_or(&default_entry);
            (m, priority_key(m, entry, ctx))
        })
        .max_by(|a, b| a.1.cmp(&b.1))
}
