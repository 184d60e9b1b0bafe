//! Text folding shared by the index builder and the query parser

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercase and strip diacritics (NFKD, then drop combining marks).
pub fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Split a display name into folded word tokens with punctuation removed.
///
/// `"Awoken Scarlet, Red Sonia"` becomes `["awoken", "scarlet", "red", "sonia"]`.
pub fn name_words(name: &str) -> Vec<String> {
    fold(name)
        .unicode_words()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Split a display name on commas and tokenize each part separately.
pub fn name_parts(name: &str) -> Vec<Vec<String>> {
    name.split(',')
        .map(name_words)
        .filter(|part| !part.is_empty())
        .collect()
}

pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
