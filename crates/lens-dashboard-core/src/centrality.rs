//! Optional per-issue centrality scores supplied by the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Scores for one issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Centrality {
    #[serde(default)]
    pub pagerank: f64,
    #[serde(default)]
    pub betweenness: f64,
}

/// 1-based rank positions of one issue among every scored issue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentralityRank {
    pub pagerank_rank: usize,
    pub pagerank: f64,
    pub betweenness_rank: usize,
    pub betweenness: f64,
    pub total: usize,
}

/// Id → scores. Deserializes from a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CentralityTable {
    scores: HashMap<String, Centrality>,
}

impl CentralityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, scores: Centrality) {
        self.scores.insert(id.into(), scores);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Centrality> {
        self.scores.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Rank = 1 + number of other issues scoring strictly higher. Ties share
    /// a rank. `None` for an unscored id.
    #[must_use]
    pub fn rank(&self, id: &str) -> Option<CentralityRank> {
        let own = self.scores.get(id)?;
        let higher = |pick: fn(&Centrality) -> f64| {
            let mine = pick(own);
            1 + self
                .scores
                .iter()
                .filter(|(other, c)| other.as_str() != id && pick(c) > mine)
                .count()
        };
        Some(CentralityRank {
            pagerank_rank: higher(|c| c.pagerank),
            pagerank: own.pagerank,
            betweenness_rank: higher(|c| c.betweenness),
            betweenness: own.betweenness,
            total: self.scores.len(),
        })
    }
}

impl<S: Into<String>> FromIterator<(S, Centrality)> for CentralityTable {
    fn from_iter<T: IntoIterator<Item = (S, Centrality)>>(iter: T) -> Self {
        Self {
            scores: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(pagerank: f64, betweenness: f64) -> Centrality {
        Centrality { pagerank, betweenness }
    }

    #[test]
    fn ranks_count_strictly_higher_scores() {
        let table: CentralityTable =
            [("a", c(0.5, 1.0)), ("b", c(0.3, 4.0)), ("c", c(0.5, 2.0))].into_iter().collect();
        let a = table.rank("a").unwrap_or_else(|| panic!("a is scored"));
        assert_eq!(a.pagerank_rank, 1);
        assert_eq!(a.betweenness_rank, 3);
        assert_eq!(a.total, 3);
        let b = table.rank("b").unwrap_or_else(|| panic!("b is scored"));
        assert_eq!(b.pagerank_rank, 3);
        assert_eq!(b.betweenness_rank, 1);
        assert!(table.rank("zzz").is_none());
    }

    #[test]
    fn deserializes_from_object() {
        let table: CentralityTable =
            serde_json::from_str(r#"{"x": {"pagerank": 0.2}, "y": {"pagerank": 0.1, "betweenness": 3}}"#)
                .unwrap_or_default();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("x").map(|s| s.betweenness), Some(0.0));
    }
}
