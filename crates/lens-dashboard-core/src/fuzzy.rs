//! Fuzzy ranking for search boxes, backed by `nucleo-matcher`.
//!
//! Queries are taken literally: whitespace separates words that must each
//! match, case is ignored. Results are ordered by score descending; equal
//! scores keep input order.

use std::cmp::Reverse;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Higher is better.
    pub score: u32,
}

fn pattern(query: &str) -> Pattern {
    Pattern::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy)
}

/// Score one candidate. `None` when it does not match.
#[must_use]
pub fn score(query: &str, candidate: &str) -> Option<u32> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut buf = Vec::new();
    pattern(query).score(Utf32Str::new(candidate, &mut buf), &mut matcher)
}

/// Match every candidate, best first.
pub fn find<I, S>(query: &str, candidates: I) -> Vec<FuzzyMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pattern = pattern(query);
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut buf = Vec::new();
    let mut out: Vec<FuzzyMatch> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, c)| {
            pattern
                .score(Utf32Str::new(c.as_ref(), &mut buf), &mut matcher)
                .map(|score| FuzzyMatch { index, score })
        })
        .collect();
    out.sort_by_key(|m| Reverse(m.score));
    out
}
