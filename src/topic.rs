//! Topic-shift heuristic.
//!
//! Decides whether a new question continues the current conversation or
//! starts a new one. Three ordered rules, deliberately crude — a keyword
//! list plus a word-count threshold, not an NLP classifier. The imprecision
//! is a known limitation; tests pin this exact behavior.

use crate::models::Turn;

/// Anaphoric markers that tie a question to earlier turns. Matched by
/// substring containment on the lowercased query.
const REFERENCE_MARKERS: [&str; 12] = [
    "this",
    "that",
    "those",
    "these",
    "they",
    "them",
    "their",
    "previous",
    "before",
    "earlier",
    "you said",
    "mentioned",
];

/// Questions longer than this (in words) without a reference marker are
/// assumed to start a new topic.
const MAX_UNRELATED_WORDS: usize = 10;

/// Whether `query` relates to the retained conversation history.
///
/// Rule order matters:
/// 1. empty history → `false` (nothing to relate to);
/// 2. query contains a reference marker → `true`;
/// 3. more than ten words → `false` (long independent questions);
/// 4. otherwise → `true` (short queries bias toward retaining context).
pub fn is_related(query: &str, history: &[Turn]) -> bool {
    if history.is_empty() {
        return false;
    }

    let query_lower = query.to_lowercase();
    if REFERENCE_MARKERS
        .iter()
        .any(|marker| query_lower.contains(marker))
    {
        return true;
    }

    if query.split_whitespace().count() > MAX_UNRELATED_WORDS {
        return false;
    }

    true
}
