//! Subquery tokens: `seriesof:`, `hasmat:`, `selfhasmat:`, `sametree:` and `[...]`
//!
//! The nested query runs once while the token is prepared; matching only
//! looks up relations against the stored result.

use super::matches::{MatchKind, ScoringMap, TokenMatch};
use crate::catalog::{Monster, MonsterGraph, MonsterId, SeriesId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

static RELATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<kind>seriesof|hasmat|selfhasmat|sametree):(?:\((?P<paren>.*)\)|(?P<bare>\S+))$")
        .expect("Failed to compile subquery regex")
});

static OR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<body>.*)\]$").expect("Failed to compile or-token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Same series as a nested result
    SeriesOf,
    /// Some evolution on the chain consumes a nested result
    HasMat,
    /// The entity's own evolution consumes a nested result
    SelfHasMat,
    /// Same evolution tree as a nested result
    SameTree,
}

impl Relation {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "seriesof" => Some(Relation::SeriesOf),
            "hasmat" => Some(Relation::HasMat),
            "selfhasmat" => Some(Relation::SelfHasMat),
            "sametree" => Some(Relation::SameTree),
            _ => None,
        }
    }
}

/// Split `kind:(query)` or `kind:word` into its relation and nested query
pub fn recognize_relation(value: &str) -> Option<(Relation, String)> {
    let caps = RELATION_PATTERN.captures(value)?;
    let relation = Relation::from_keyword(&caps["kind"])?;
    let query = caps
        .name("paren")
        .or_else(|| caps.name("bare"))
        .map(|m| m.as_str().trim().to_string())?;
    if query.is_empty() {
        return None;
    }
    Some((relation, query))
}

/// Split `[q1 (q2 words) q3]` into its branch queries
pub fn recognize_or(value: &str) -> Option<Vec<String>> {
    let caps = OR_PATTERN.captures(value)?;
    let body = caps.name("body")?.as_str();

    let mut branches = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    for c in body.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c.is_whitespace() && depth == 0 && !in_quotes {
            if !current.is_empty() {
                branches.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        branches.push(current);
    }

    let branches: Vec<String> = branches
        .into_iter()
        .map(|b| match b.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            Some(inner) => inner.trim().to_string(),
            None => b,
        })
        .filter(|b| !b.is_empty())
        .collect();
    if branches.is_empty() {
        None
    } else {
        Some(branches)
    }
}

/// What a nested query produced
#[derive(Debug, Clone, Default)]
pub struct NestedResult {
    pub query: String,
    pub scores: ScoringMap,
    pub valid: BTreeSet<MonsterId>,
    pub max_score: f64,
}

impl NestedResult {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    /// Score relative to the nested best; 1.0 when the best scored zero
    pub fn normalized(&self, id: MonsterId) -> f64 {
        if self.max_score == 0.0 {
            return 1.0;
        }
        self.scores.get(&id).map_or(0.0, |e| e.score) / self.max_score
    }
}

#[derive(Debug, Clone)]
pub struct SubqueryToken {
    pub relation: Relation,
    pub nested: NestedResult,
    /// Relation key (series, base id or monster id) → best nested hit
    targets: HashMap<u32, (f64, MonsterId)>,
    /// Series the nested query names through a series nickname
    named_series: BTreeSet<SeriesId>,
}

impl SubqueryToken {
    pub fn new(relation: Relation, nested: NestedResult, graph: &MonsterGraph) -> Self {
        let mut targets: HashMap<u32, (f64, MonsterId)> = HashMap::new();
        for &id in &nested.valid {
            let key = match relation {
                Relation::SeriesOf => graph.get_monster(id).and_then(|m| m.series_id),
                Relation::SameTree => Some(graph.get_base_id(id)),
                Relation::HasMat | Relation::SelfHasMat => Some(id),
            };
            let Some(key) = key else { continue };
            let score = nested.normalized(id);
            let slot = targets.entry(key).or_insert((score, id));
            if score > slot.0 {
                *slot = (score, id);
            }
        }
        Self {
            relation,
            nested,
            targets,
            named_series: BTreeSet::new(),
        }
    }

    /// Accept every member of these series outright (`seriesof:` only)
    pub fn with_named_series(mut self, series: impl IntoIterator<Item = SeriesId>) -> Self {
        if self.relation == Relation::SeriesOf {
            self.named_series.extend(series);
        }
        self
    }

    pub fn matches(
        &self,
        token: &str,
        monster: &Monster,
        graph: &MonsterGraph,
    ) -> (f64, Option<TokenMatch>) {
        if let Some(series) = monster.series_id.filter(|s| self.named_series.contains(s)) {
            let matched = format!("series {}", series);
            return (1.0, Some(TokenMatch::new(token, &matched, MatchKind::Subquery, 1.0)));
        }
        let best = match self.relation {
            Relation::SeriesOf => monster.series_id.and_then(|s| self.targets.get(&s).copied()),
            Relation::SameTree => self.targets.get(&graph.get_base_id(monster.id)).copied(),
            Relation::SelfHasMat => self.best_material(monster, graph),
            Relation::HasMat => graph
                .evo_chain(monster.id)
                .into_iter()
                .filter_map(|id| graph.get_monster(id))
                .filter_map(|ancestor| self.best_material(ancestor, graph))
                .max_by(|a, b| a.0.total_cmp(&b.0)),
        };
        match best {
            Some((score, id)) => (
                score,
                Some(TokenMatch::new(token, &id.to_string(), MatchKind::Subquery, score)),
            ),
            None => (0.0, None),
        }
    }

    /// Materials of the monster's own evolution and of its evo gem
    fn best_material(&self, monster: &Monster, graph: &MonsterGraph) -> Option<(f64, MonsterId)> {
        let gem_materials = graph
            .get_evo_gem(monster)
            .map(|gem| graph.get_evo_materials(gem.id))
            .unwrap_or(&[]);
        graph
            .get_evo_materials(monster.id)
            .iter()
            .chain(gem_materials)
            .filter_map(|mat| self.targets.get(mat).copied())
            .max_by(|a, b| a.0.total_cmp(&b.0))
    }
}

/// `[q1 q2 ...]`: accept anything some branch accepts
#[derive(Debug, Clone)]
pub struct OrToken {
    pub branches: Vec<NestedResult>,
}

impl OrToken {
    /// Best normalized score over the accepting branches; ties go to the lower index
    pub fn matches(&self, token: &str, monster: &Monster) -> (f64, Option<TokenMatch>) {
        let mut best: Option<(f64, usize)> = None;
        for (i, branch) in self.branches.iter().enumerate() {
            if !branch.valid.contains(&monster.id) {
                continue;
            }
            let score = branch.normalized(monster.id);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, i));
            }
        }
        match best {
            Some((score, i)) => (
                score,
                Some(
                    TokenMatch::new(token, &self.branches[i].query, MatchKind::Subquery, score)
                        .with_or_index(i),
                ),
            ),
            None => (0.0, None),
        }
    }

    /// Union of every branch's results
    pub fn valid(&self) -> BTreeSet<MonsterId> {
        self.branches
            .iter()
            .flat_map(|b| b.valid.iter().copied())
            .collect()
    }
}
