//! Multi-word merge: collapse runs of tokens that spell a registered phrase

use super::similarity::modifier_ratio;
use crate::index::MonsterIndex;

/// Tokens shorter than this must equal their phrase word exactly
const SHORT_WORD_LEN: usize = 5;

/// Greedily replace token runs matching a registered multi-word phrase with
/// their concatenation. Phrases are tried longest first.
pub fn merge_multi_word(tokens: &[String], index: &MonsterIndex, threshold: f64) -> Vec<String> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let hit = index.multi_word_tokens().iter().find(|phrase| {
            let end = i + phrase.len();
            end <= tokens.len()
                && tokens[i..end]
                    .iter()
                    .zip(phrase.iter())
                    .all(|(token, word)| word_matches(token, word, threshold))
        });
        match hit {
            Some(phrase) => {
                let end = i + phrase.len();
                merged.push(tokens[i..end].concat());
                i = end;
            }
            None => {
                merged.push(tokens[i].clone());
                i += 1;
            }
        }
    }
    merged
}

fn word_matches(token: &str, word: &str, threshold: f64) -> bool {
    if !token.chars().all(char::is_alphanumeric) {
        return false;
    }
    if token.chars().count() < SHORT_WORD_LEN || word.chars().count() < SHORT_WORD_LEN {
        return token == word;
    }
    modifier_ratio(token, word, false) > threshold
}
