//! Token classification and interpretation
//!
//! Classification turns each raw string into a [`Token`], running nested
//! queries for subquery tokens. Interpretation then splits the tokens into
//! name tokens and modifier tokens.

use super::engine::{run_query, SearchContext};
use super::similarity::modifier_ratio;
use super::special::{
    recognize_bool, recognize_id_range, recognize_multi_attribute, recognize_multi_awakening,
    recognize_numeric, recognize_single_attribute, recognize_string,
};
use super::subquery::{recognize_or, recognize_relation, NestedResult, OrToken, SubqueryToken};
use super::token::{Token, TokenKind};
use super::typos::TypoLog;
use crate::index::MonsterIndex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Classify one raw token. Returns `None` for tokens with no content (a bare `-` or `""`).
pub async fn classify_token(raw: &str, ctx: SearchContext<'_>) -> Option<Token> {
    let (negated, rest) = match raw.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, raw),
    };
    let quoted = rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"');
    let (exact, value) = if quoted {
        (true, &rest[1..rest.len() - 1])
    } else {
        (false, rest)
    };
    if value.is_empty() {
        return None;
    }
    if exact {
        return Some(Token::regular(value, negated, true));
    }

    let kind = recognize(value, ctx).await;
    Some(Token {
        value: value.to_string(),
        negated,
        exact: false,
        kind,
    })
}

/// Special variants in dispatch order; the first recognizer that accepts wins
async fn recognize(value: &str, ctx: SearchContext<'_>) -> TokenKind {
    let index = &ctx.snapshot.index;
    let attribute_like = recognize_numeric(value)
        .or_else(|| recognize_string(value))
        .or_else(|| recognize_bool(value))
        .or_else(|| recognize_multi_awakening(value, index));
    if let Some(special) = attribute_like {
        return TokenKind::Special(special);
    }

    if let Some((relation, query)) = recognize_relation(value) {
        let nested = nested_result(&query, ctx).await;
        let named = index.series_for_nickname(&query).into_iter().flatten().copied();
        let token = SubqueryToken::new(relation, nested, &ctx.snapshot.graph).with_named_series(named);
        return TokenKind::Subquery(token);
    }

    if let Some(special) = recognize_single_attribute(value).or_else(|| recognize_multi_attribute(value)) {
        return TokenKind::Special(special);
    }

    if let Some(queries) = recognize_or(value) {
        let mut branches = Vec::with_capacity(queries.len());
        for query in &queries {
            branches.push(nested_result(query, ctx).await);
        }
        return TokenKind::Or(OrToken { branches });
    }

    match recognize_id_range(value) {
        Some(special) => TokenKind::Special(special),
        None => TokenKind::Regular,
    }
}

/// Run a nested query one level deeper and keep its pruned result.
///
/// When the nested query had name tokens, the result narrows to entities
/// whose every name hit was exact, if there are any.
async fn nested_result(query: &str, ctx: SearchContext<'_>) -> NestedResult {
    if ctx.depth >= ctx.config.max_subquery_depth {
        warn!(
            "Subquery '{}' exceeds depth {}; treating as empty",
            query, ctx.config.max_subquery_depth
        );
        return NestedResult::empty(query);
    }

    let outcome = run_query(query, ctx.nested()).await;

    let mut valid = outcome.valid;
    if outcome.had_name_tokens {
        let exact: BTreeSet<_> = valid
            .iter()
            .copied()
            .filter(|id| {
                outcome
                    .scores
                    .get(id)
                    .is_some_and(|entry| entry.is_exact_name_match())
            })
            .collect();
        if !exact.is_empty() {
            valid = exact;
        }
    }

    let max_score = valid
        .iter()
        .filter_map(|id| outcome.scores.get(id))
        .map(|entry| entry.score)
        .fold(0.0, f64::max);

    debug!(
        "Subquery '{}' at depth {} kept {} results (max score {:.3})",
        query,
        ctx.depth + 1,
        valid.len(),
        max_score
    );
    NestedResult {
        query: query.to_string(),
        scores: outcome.scores,
        valid,
        max_score,
    }
}

/// Tokens split by role
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    pub name_tokens: Vec<Token>,
    /// Prefix modifiers followed by suffix modifiers, in query order within each group
    pub modifiers: Vec<Token>,
}

impl Interpretation {
    pub fn has_name_tokens(&self) -> bool {
        !self.name_tokens.is_empty()
    }

    /// Whether a positive modifier token is one of `words`
    pub fn has_positive_modifier(&self, words: &[&str]) -> bool {
        self.modifiers
            .iter()
            .any(|t| !t.negated && !t.is_special() && words.contains(&t.value.as_str()))
    }
}

/// Split tokens into name tokens and modifier tokens.
///
/// Suffix modifiers are peeled from the right, prefix modifiers from the
/// left, and whatever is left in the middle names the monster. A query that
/// ends up with no name tokens gets its last prefix modifier back as a name
/// when curators gave it as a nickname.
pub fn interpret(
    tokens: Vec<Token>,
    index: &MonsterIndex,
    modifier_threshold: f64,
    typos: Option<&TypoLog>,
) -> Interpretation {
    let mut rest = tokens;

    let mut suffix = Vec::new();
    while let Some(last) = rest.last() {
        let is_suffix = last.is_special()
            || index
                .suffixes()
                .iter()
                .any(|s| modifier_ratio(&last.value, s, last.exact) > modifier_threshold);
        if !is_suffix {
            break;
        }
        if let Some(token) = rest.pop() {
            note_unknown(&token, index, typos);
            suffix.push(token);
        }
    }
    suffix.reverse();

    let mut prefix = Vec::new();
    let mut remaining = rest.into_iter().peekable();
    while let Some(token) = remaining.peek() {
        if !is_prefix_modifier(token, index, modifier_threshold) {
            break;
        }
        if let Some(token) = remaining.next() {
            note_unknown(&token, index, typos);
            prefix.push(token);
        }
    }
    let mut name_tokens: Vec<Token> = remaining.collect();

    if name_tokens.is_empty() {
        let promote = prefix
            .last()
            .is_some_and(|t| !t.is_special() && index.has_manual_entry(&t.value));
        if promote {
            if let Some(token) = prefix.pop() {
                debug!("Promoting nickname '{}' to a name token", token.value);
                name_tokens.push(token);
            }
        }
    }

    let mut modifiers = prefix;
    modifiers.extend(suffix);
    Interpretation {
        name_tokens,
        modifiers,
    }
}

fn is_prefix_modifier(token: &Token, index: &MonsterIndex, threshold: f64) -> bool {
    if token.is_special() || index.is_modifier(&token.value) {
        return true;
    }
    !token.exact
        && !index.is_name_token(&token.value)
        && index
            .long_modifiers()
            .iter()
            .any(|m| modifier_ratio(&token.value, m, false) > threshold)
}

/// Regular modifier tokens that are not literally a known modifier go to the typo log
fn note_unknown(token: &Token, index: &MonsterIndex, typos: Option<&TypoLog>) {
    if token.is_special() || index.is_modifier(&token.value) {
        return;
    }
    if let Some(log) = typos {
        log.record(&token.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sonia_catalog;
    use crate::config::FinderConfig;
    use crate::search::typos::typo_log;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    async fn classify_all(raw: &[&str], ctx: SearchContext<'_>) -> Vec<Token> {
        let mut tokens = Vec::new();
        for r in raw {
            if let Some(t) = classify_token(r, ctx).await {
                tokens.push(t);
            }
        }
        tokens
    }

    #[tokio::test]
    async fn test_classify_signs_and_quotes() {
        let snapshot = sonia_catalog().snapshot();
        let config = FinderConfig::default();
        let ctx = SearchContext::new(&snapshot, &config, None);

        let token = classify_token("-\"awoken\"", ctx).await.unwrap();
        assert!(token.negated && token.exact);
        assert_eq!(token.value, "awoken");
        assert!(!token.is_special());

        assert!(classify_token("-", ctx).await.unwrap().value == "-");
        assert!(classify_token("\"\"", ctx).await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_order() {
        let snapshot = sonia_catalog().snapshot();
        let config = FinderConfig::default();
        let ctx = SearchContext::new(&snapshot, &config, None);

        let kinds = classify_all(&["3-sb", "3-5", "r", "r/b", "rarity:>5", "hasmat:sonia", "[r b]", "sonia"], ctx).await;
        assert!(matches!(kinds[0].kind, TokenKind::Special(super::super::special::Special::MultiAwakening(_))));
        assert!(matches!(kinds[1].kind, TokenKind::Special(super::super::special::Special::IdRange { lo: 3, hi: 5 })));
        assert!(kinds[2].is_special());
        assert!(kinds[3].is_special());
        assert!(kinds[4].is_special());
        assert!(matches!(kinds[5].kind, TokenKind::Subquery(_)));
        assert!(matches!(kinds[6].kind, TokenKind::Or(_)));
        assert!(!kinds[7].is_special());
    }

    #[tokio::test]
    async fn test_interpretation_splits_roles() {
        let snapshot = sonia_catalog().snapshot();
        let config = FinderConfig::default();
        let ctx = SearchContext::new(&snapshot, &config, None);

        let tokens = classify_all(&["awoken", "r", "sonia", "equip"], ctx).await;
        let interp = interpret(tokens, &snapshot.index, 0.95, None);
        assert_eq!(values(&interp.name_tokens), vec!["sonia"]);
        assert_eq!(values(&interp.modifiers), vec!["awoken", "r", "equip"]);
    }

    #[tokio::test]
    async fn test_nickname_promotion() {
        let snapshot = sonia_catalog()
            .nickname(1234, "awoken")
            .snapshot();
        let config = FinderConfig::default();
        let ctx = SearchContext::new(&snapshot, &config, None);

        let tokens = classify_all(&["r", "awoken"], ctx).await;
        let interp = interpret(tokens, &snapshot.index, 0.95, None);
        assert_eq!(values(&interp.name_tokens), vec!["awoken"]);
        assert_eq!(values(&interp.modifiers), vec!["r"]);
    }

    #[tokio::test]
    async fn test_fuzzy_long_modifier_logged_as_typo() {
        let snapshot = sonia_catalog().snapshot();
        let config = FinderConfig::default();
        let ctx = SearchContext::new(&snapshot, &config, None);
        let (log, writer) = typo_log(None);
        let handle = tokio::spawn(writer.run());

        let tokens = classify_all(&["inheritabel", "sonia"], ctx).await;
        let interp = interpret(tokens, &snapshot.index, 0.95, Some(&log));
        assert_eq!(values(&interp.modifiers), vec!["inheritabel"]);
        drop(log);
        let seen = handle.await.unwrap();
        assert!(seen.contains("inheritabel"));
    }

    #[tokio::test]
    async fn test_depth_cap_yields_empty_subquery() {
        let snapshot = sonia_catalog().snapshot();
        let config = FinderConfig {
            max_subquery_depth: 0,
            ..Default::default()
        };
        let ctx = SearchContext::new(&snapshot, &config, None);
        let token = classify_token("sametree:sonia", ctx).await.unwrap();
        match token.kind {
            TokenKind::Subquery(sub) => assert!(sub.nested.valid.is_empty()),
            _ => panic!("expected subquery token"),
        }
    }
}
