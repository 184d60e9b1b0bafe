//! String Similarity
//!
//! Jaro–Winkler with a configurable prefix weight, plus the name-matching
//! variant used for name tokens: digit strictness, exact mode, a prefix
//! boost and multi-word scaling.

use crate::index::MonsterIndex;
use crate::text::is_all_digits;

/// The unit of tie-breaking nudges applied to scores
pub const EPSILON: f64 = 0.001;

/// Prefix weight used when comparing modifiers
pub const MODIFIER_PREFIX_WEIGHT: f64 = 0.05;

/// Prefix weight used when comparing name tokens
pub const NAME_PREFIX_WEIGHT: f64 = 0.10;

/// Score given when an entity token starts with the query token
pub const PREFIX_MATCH_SCORE: f64 = 0.995;

const MAX_PREFIX: usize = 4;
const BOOST_THRESHOLD: f64 = 0.7;

/// Jaro–Winkler similarity with an explicit prefix weight.
///
/// The Winkler boost only applies once plain Jaro exceeds 0.7, and counts
/// at most four common leading characters.
pub fn jaro_winkler(a: &str, b: &str, prefix_weight: f64) -> f64 {
    let jaro = strsim::jaro(a, b);
    if jaro <= BOOST_THRESHOLD {
        return jaro;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .take(MAX_PREFIX)
        .count();
    jaro + prefix as f64 * prefix_weight * (1.0 - jaro)
}

/// Similarity between a query value and a modifier
pub fn modifier_ratio(value: &str, modifier: &str, exact: bool) -> f64 {
    if exact {
        return if value == modifier { 1.0 } else { 0.0 };
    }
    jaro_winkler(value, modifier, MODIFIER_PREFIX_WEIGHT)
}

/// Similarity between a query token and an entity-side name token
pub fn name_ratio(token: &str, full_word: &str, exact: bool, index: &MonsterIndex) -> f64 {
    let digits = is_all_digits(token) && is_all_digits(full_word);
    if digits && token != full_word {
        return 0.0;
    }
    if exact && token != full_word {
        return 0.0;
    }

    let mut score = if token == full_word {
        1.0
    } else if full_word.starts_with(token) && token.chars().count() >= 3 {
        jaro_winkler(token, full_word, NAME_PREFIX_WEIGHT).max(PREFIX_MATCH_SCORE)
    } else {
        jaro_winkler(token, full_word, NAME_PREFIX_WEIGHT)
    };

    // Multi-word tokens: exact hits are worth one point per word, sloppy ones next to nothing
    if let Some(words) = index.mwt_len(full_word) {
        score = score.powi(10) * words as f64;
    }
    score
}
