//! Query Tokens
//!
//! A token is either regular (matched against an entity's modifier set) or
//! one of the special variants. Every variant answers `matches` with a score
//! and optional evidence; negation is applied by the caller.

use super::matches::{MatchKind, TokenMatch};
use super::similarity::modifier_ratio;
use super::special::Special;
use super::subquery::{OrToken, SubqueryToken};
use crate::catalog::{Monster, MonsterGraph};
use crate::index::MonsterIndex;

/// Regular tokens shorter than this only match modifiers exactly
const MIN_FUZZY_MODIFIER_LEN: usize = 6;

#[derive(Debug, Clone)]
pub enum TokenKind {
    Regular,
    Special(Special),
    Subquery(SubqueryToken),
    Or(OrToken),
}

#[derive(Debug, Clone)]
pub struct Token {
    /// Value without sign or quotes
    pub value: String,
    pub negated: bool,
    /// Quoted in the query; disables fuzzy matching
    pub exact: bool,
    pub kind: TokenKind,
}

/// What a token needs to evaluate itself against an entity
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub graph: &'a MonsterGraph,
    pub index: &'a MonsterIndex,
    pub modifier_threshold: f64,
    pub token_threshold: f64,
}

impl Token {
    pub fn regular(value: &str, negated: bool, exact: bool) -> Self {
        Self {
            value: value.to_string(),
            negated,
            exact,
            kind: TokenKind::Regular,
        }
    }

    pub fn is_special(&self) -> bool {
        !matches!(self.kind, TokenKind::Regular)
    }

    pub fn is_subquery(&self) -> bool {
        matches!(self.kind, TokenKind::Subquery(_) | TokenKind::Or(_))
    }

    pub fn matches(&self, monster: &Monster, ctx: &MatchContext<'_>) -> (f64, Option<TokenMatch>) {
        match &self.kind {
            TokenKind::Regular => self.match_modifier(monster, ctx),
            TokenKind::Special(special) => {
                special.matches(&self.value, monster, ctx.graph, ctx.token_threshold)
            }
            TokenKind::Subquery(sub) => sub.matches(&self.value, monster, ctx.graph),
            TokenKind::Or(or) => or.matches(&self.value, monster),
        }
    }

    /// Closest modifier by Jaro–Winkler; short or quoted values need an exact hit.
    ///
    /// An exact hit on a value that is also one of the entity's name tokens is
    /// recorded as a name match.
    fn match_modifier(&self, monster: &Monster, ctx: &MatchContext<'_>) -> (f64, Option<TokenMatch>) {
        let Some(modifiers) = ctx.index.modifiers_of(monster.id) else {
            return (0.0, None);
        };

        if modifiers.contains(&self.value) {
            let is_name = ctx
                .index
                .tokens_for(monster.id)
                .is_some_and(|t| t.name.contains(&self.value));
            let kind = if is_name {
                MatchKind::Name
            } else {
                MatchKind::Modifier
            };
            return (1.0, Some(TokenMatch::new(&self.value, &self.value, kind, 1.0)));
        }

        if self.exact || self.value.chars().count() < MIN_FUZZY_MODIFIER_LEN {
            return (0.0, None);
        }

        let best = modifiers
            .iter()
            .map(|m| (modifier_ratio(&self.value, m, false), m))
            .max_by(|a, b| a.0.total_cmp(&b.0));
        match best {
            Some((score, m)) if score > ctx.modifier_threshold => (
                score,
                Some(TokenMatch::new(&self.value, m, MatchKind::Modifier, score)),
            ),
            _ => (0.0, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sonia_catalog;

    #[test]
    fn test_regular_token_exact_and_fuzzy() {
        let snapshot = sonia_catalog().snapshot();
        let ctx = MatchContext {
            graph: &snapshot.graph,
            index: &snapshot.index,
            modifier_threshold: 0.95,
            token_threshold: 0.8,
        };
        let awoken = snapshot.graph.get_monster(1234).unwrap();
        let base = snapshot.graph.get_monster(1230).unwrap();

        assert_eq!(Token::regular("awoken", false, false).matches(awoken, &ctx).0, 1.0);
        assert_eq!(Token::regular("awoken", false, false).matches(base, &ctx).0, 0.0);
        // short values never match fuzzily
        assert_eq!(Token::regular("awokn", false, false).matches(awoken, &ctx).0, 0.0);

        let (score, m) = Token::regular("inheritabel", false, false).matches(awoken, &ctx);
        assert!(score > 0.95);
        assert_eq!(m.unwrap().matched, "inheritable");
        assert_eq!(
            Token::regular("inheritabel", false, true).matches(awoken, &ctx).0,
            0.0
        );
    }
}
