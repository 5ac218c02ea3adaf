//! Search keyword derivation
//!
//! A cheap token bag, not a search engine: no stemming, no stop words, no
//! language-aware segmentation. Output is deterministic and order-stable.

use std::collections::HashSet;

/// Split a mixed-case identifier into lowercase words
///
/// A boundary occurs before every uppercase letter except the first
/// character, so `MovePlayer` gives `["move", "player"]` and `GetHTTP` gives
/// `["get", "h", "t", "t", "p"]`.
pub fn split_camel_case(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() && !current.is_empty() {
            words.push(current.to_lowercase());
            current.clear();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

/// Derive ordered, deduplicated lowercase keywords for a function
///
/// Name segments come first, then comment tokens longer than one character.
/// Length is counted in characters, not bytes, so a lone CJK ideograph is
/// dropped like any other single-character token.
pub fn derive_keywords(function_name: &str, comments: &[String]) -> Vec<String> {
    let joined = comments.join(" ");
    let comment_tokens = joined
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_lowercase);

    let mut seen = HashSet::new();
    split_camel_case(function_name)
        .into_iter()
        .chain(comment_tokens)
        .filter(|kw| !kw.is_empty())
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .collect()
}
