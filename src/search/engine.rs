//! Search Engine Integration
//!
//! Ties the pipeline together: parse, classify, interpret, match names,
//! match modifiers, rank. [`MonsterFinder`] is the public entry point;
//! [`run_query`] is the recursive core that subquery tokens call back into.

use super::classify::{classify_token, interpret};
use super::matches::{Extras, ScoringMap};
use super::merge::merge_multi_word;
use super::modifier_match::match_modifiers;
use super::name_match::match_names;
use super::parser::{ParsedQuery, QueryParser};
use super::ranking::{self, RankContext};
use super::token::{MatchContext, TokenKind};
use super::typos::TypoLog;
use crate::catalog::{Monster, MonsterGraph, MonsterId};
use crate::config::FinderConfig;
use crate::error::FindError;
use crate::index::vocabulary;
use crate::snapshot::{Snapshot, SnapshotReader};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Everything one (possibly nested) query evaluation needs
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub snapshot: &'a Snapshot,
    /// Effective configuration, query flags included
    pub config: &'a FinderConfig,
    pub typos: Option<&'a TypoLog>,
    /// 0 for the top-level query
    pub depth: usize,
}

impl<'a> SearchContext<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a FinderConfig, typos: Option<&'a TypoLog>) -> Self {
        Self {
            snapshot,
            config,
            typos,
            depth: 0,
        }
    }

    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    pub fn match_context(&self) -> MatchContext<'a> {
        MatchContext {
            graph: &self.snapshot.graph,
            index: &self.snapshot.index,
            modifier_threshold: self.config.modifier_jw_threshold,
            token_threshold: self.config.token_jw_threshold,
        }
    }
}

/// Result of evaluating one token vector
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub best: Option<MonsterId>,
    pub scores: ScoringMap,
    pub valid: BTreeSet<MonsterId>,
    pub had_name_tokens: bool,
    pub extras: Extras,
    query: String,
    ormod_prio: bool,
    na_prio: bool,
    prefer_equip: bool,
}

impl SearchOutcome {
    /// Score of the best candidate; no candidate sorts below any score
    pub fn best_score(&self) -> f64 {
        self.best
            .and_then(|id| self.scores.get(&id))
            .map_or(f64::NEG_INFINITY, |e| e.score)
    }

    fn rank_context<'g>(&self, graph: &'g MonsterGraph) -> RankContext<'g> {
        RankContext::new(graph, &self.query, self.ormod_prio, self.na_prio, self.prefer_equip)
    }

    /// Valid candidates, best first
    pub fn ranked<'g>(&self, graph: &'g MonsterGraph) -> Vec<&'g Monster> {
        ranking::rank(&self.valid, &self.scores, &self.rank_context(graph))
            .into_iter()
            .map(|(m, _)| m)
            .collect()
    }
}

/// Parse and evaluate a query. Subquery tokens recurse through here, so the
/// future is boxed.
pub fn run_query<'a>(query: &'a str, ctx: SearchContext<'a>) -> BoxFuture<'a, SearchOutcome> {
    async move {
        let parsed = QueryParser::parse(query);
        let config = parsed.settings.apply(ctx.config);
        let ctx = SearchContext {
            config: &config,
            ..ctx
        };
        run_parsed(&parsed, ctx).await
    }
    .boxed()
}

/// Try the raw tokens and the multi-word-merged tokens; keep the run whose
/// best candidate scored higher, preferring the merged run on ties.
async fn run_parsed(parsed: &ParsedQuery, ctx: SearchContext<'_>) -> SearchOutcome {
    let unmerged = search_tokens(&parsed.tokens, &parsed.original, ctx).await;

    let merged_tokens = merge_multi_word(
        &parsed.tokens,
        &ctx.snapshot.index,
        ctx.config.token_jw_threshold,
    );
    if merged_tokens == parsed.tokens {
        return unmerged;
    }

    debug!("Merged tokens: {:?}", merged_tokens);
    let merged = search_tokens(&merged_tokens, &parsed.original, ctx).await;
    if merged.best_score() >= unmerged.best_score() {
        merged
    } else {
        unmerged
    }
}

async fn search_tokens(raw: &[String], original: &str, ctx: SearchContext<'_>) -> SearchOutcome {
    let snapshot = ctx.snapshot;
    let config = ctx.config;

    let mut tokens = Vec::with_capacity(raw.len());
    for value in raw {
        if let Some(token) = classify_token(value, ctx).await {
            tokens.push(token);
        }
    }

    let interpretation = interpret(
        tokens,
        &snapshot.index,
        config.modifier_jw_threshold,
        ctx.typos,
    );
    debug!(
        "Query {:?} at depth {}: names {:?}, modifiers {:?}",
        original,
        ctx.depth,
        interpretation
            .name_tokens
            .iter()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>(),
        interpretation
            .modifiers
            .iter()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
    );

    let universe: BTreeSet<MonsterId> = snapshot
        .graph
        .get_all_monsters()
        .filter(|m| m.on_server(config.server))
        .map(|m| m.id)
        .collect();

    let names = match_names(
        &interpretation.name_tokens,
        &snapshot.index,
        &snapshot.graph,
        &universe,
        config.token_jw_threshold,
    );
    let mut scores = names.scores;
    let modifiers = match_modifiers(
        &interpretation.modifiers,
        names.valid,
        &mut scores,
        &ctx.match_context(),
    );

    let mut extras = Extras {
        subquery_matches: modifiers.subquery_matches,
        ..Default::default()
    };
    for token in &interpretation.modifiers {
        let results = match &token.kind {
            TokenKind::Subquery(sub) => sub.nested.valid.clone(),
            TokenKind::Or(or) => or.valid(),
            _ => continue,
        };
        extras.subquery_results.insert(token.value.clone(), results);
    }

    let prefer_equip = interpretation
        .has_positive_modifier(&[vocabulary::BASE, vocabulary::NEWEST].concat());
    let mut outcome = SearchOutcome {
        best: None,
        scores,
        valid: modifiers.valid,
        had_name_tokens: interpretation.has_name_tokens(),
        extras,
        query: original.to_string(),
        ormod_prio: config.ormod_prio,
        na_prio: config.na_prio,
        prefer_equip,
    };
    outcome.best = ranking::best(
        &outcome.valid,
        &outcome.scores,
        &outcome.rank_context(&snapshot.graph),
    )
    .map(|(m, _)| m.id);

    debug!(
        "Query {:?} at depth {}: {} candidates, best {:?}",
        original,
        ctx.depth,
        outcome.valid.len(),
        outcome.best
    );
    outcome
}

/// Full debug view of a query
#[derive(Debug, Clone, Serialize)]
pub struct MonsterInfo {
    pub best: Option<Monster>,
    pub scores: ScoringMap,
    pub valid: BTreeSet<MonsterId>,
}

/// Query front end over the current catalog snapshot
#[derive(Clone)]
pub struct MonsterFinder {
    reader: SnapshotReader,
    config: FinderConfig,
    typos: Option<TypoLog>,
}

impl MonsterFinder {
    pub fn new(reader: SnapshotReader, config: FinderConfig) -> Self {
        Self {
            reader,
            config,
            typos: None,
        }
    }

    /// Record unknown modifier-looking tokens into `typos`
    pub fn with_typo_log(mut self, typos: TypoLog) -> Self {
        self.typos = Some(typos);
        self
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// The snapshot queries run against right now, once one is loaded
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, FindError> {
        self.reader.ready().await
    }

    /// Pin the current snapshot and evaluate `query` against it
    async fn search(&self, query: &str) -> Result<(Arc<Snapshot>, SearchOutcome), FindError> {
        let snapshot = self.snapshot().await?;
        let ctx = SearchContext::new(&snapshot, &self.config, self.typos.as_ref());
        let outcome = run_query(query, ctx).await;
        Ok((snapshot, outcome))
    }

    /// The best match, if any
    pub async fn find(&self, query: &str) -> Result<(Option<Monster>, Extras), FindError> {
        let (snapshot, outcome) = self.search(query).await?;
        let best = outcome
            .best
            .and_then(|id| snapshot.graph.get_monster(id))
            .cloned();
        Ok((best, outcome.extras))
    }

    /// Every match, best first
    pub async fn find_all(&self, query: &str) -> Result<(Vec<Monster>, Extras), FindError> {
        let (snapshot, outcome) = self.search(query).await?;
        let monsters = outcome
            .ranked(&snapshot.graph)
            .into_iter()
            .cloned()
            .collect();
        Ok((monsters, outcome.extras))
    }

    /// The best match together with the scoring map and candidate set
    pub async fn find_debug(&self, query: &str) -> Result<(MonsterInfo, Extras), FindError> {
        let (snapshot, outcome) = self.search(query).await?;
        let best = outcome
            .best
            .and_then(|id| snapshot.graph.get_monster(id))
            .cloned();
        let info = MonsterInfo {
            best,
            scores: outcome.scores,
            valid: outcome.valid,
        };
        Ok((info, outcome.extras))
    }
}
