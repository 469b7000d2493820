//! Text tokenization shared by the content and name indices.
//!
//! A token is a maximal run of ASCII letters or digits, lower-cased. Every
//! other character (punctuation, whitespace, underscore, non-ASCII) is a
//! separator. The result only depends on the input text.

use std::collections::HashSet;

/// Split `text` into lower-cased ASCII alphanumeric tokens, in order of appearance.
///
/// The iterator borrows `text` and can be recreated cheaply, so callers that
/// need two passes simply call `tokenize` again.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(|run| run.to_ascii_lowercase())
}

/// Tokens of `text` with duplicates removed, keeping first-seen order
pub fn tokenize_distinct(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
