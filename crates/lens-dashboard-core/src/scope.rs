//! Scope filter: an ordered label list combined by union or intersection.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, IssueIdx, IssueSet};
use crate::error::Error;
use crate::models::Issue;
use crate::sorting::{LabelCount, sort_label_counts};

/// How multiple scope labels combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Issue matches if it carries ANY scope label.
    #[default]
    Union,
    /// Issue matches only if it carries ALL scope labels.
    Intersection,
}

impl ScopeMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Union => Self::Intersection,
            Self::Intersection => Self::Union,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Union => "Union (ANY)",
            Self::Intersection => "Intersection (ALL)",
        }
    }

    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Union => "∪ ANY",
            Self::Intersection => "∩ ALL",
        }
    }

    /// "ANY" or "ALL", as used in status messages.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Union => "ANY",
            Self::Intersection => "ALL",
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ScopeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "union" | "any" | "or" => Ok(Self::Union),
            "intersection" | "all" | "and" => Ok(Self::Intersection),
            other => Err(Error::InvalidScopeMode(other.to_string())),
        }
    }
}

/// Ordered, de-duplicated scope labels plus the combination mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scope {
    labels: Vec<String>,
    mode: ScopeMode,
}

impl Scope {
    #[must_use]
    pub const fn new(mode: ScopeMode) -> Self {
        Self {
            labels: Vec::new(),
            mode,
        }
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            self.add(label.into());
        }
        self
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub const fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub const fn set_mode(&mut self, mode: ScopeMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Add a label. Returns `false` if it was already present.
    pub fn add(&mut self, label: String) -> bool {
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    /// Remove a label. Returns `false` if it was absent.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    pub fn remove_last(&mut self) -> Option<String> {
        self.labels.pop()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// An empty scope matches everything.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.labels.is_empty() {
            return true;
        }
        match self.mode {
            ScopeMode::Union => self.labels.iter().any(|l| issue.has_label(l)),
            ScopeMode::Intersection => self.labels.iter().all(|l| issue.has_label(l)),
        }
    }

    /// Every catalog position that matches.
    #[must_use]
    pub fn matching_set(&self, catalog: &Catalog) -> IssueSet {
        catalog
            .issues()
            .iter()
            .enumerate()
            .filter(|(_, issue)| self.matches(issue))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Keep the members of `set` that match, always retaining `keep`.
    #[must_use]
    pub fn filter_set(&self, catalog: &Catalog, set: &IssueSet, keep: Option<IssueIdx>) -> IssueSet {
        if self.labels.is_empty() {
            return set.clone();
        }
        set.iter()
            .copied()
            .filter(|&idx| Some(idx) == keep || self.matches(catalog.issue(idx)))
            .collect()
    }

    /// Labels offered for extending the scope.
    ///
    /// With no scope, every label sorted by name. Otherwise labels that
    /// co-occur on matching issues, minus those already in scope, by count
    /// descending then name.
    #[must_use]
    pub fn available_labels(&self, catalog: &Catalog) -> Vec<LabelCount> {
        if self.labels.is_empty() {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for issue in catalog.issues() {
                for label in &issue.labels {
                    *counts.entry(label.as_str()).or_default() += 1;
                }
            }
            let mut out: Vec<LabelCount> = counts
                .into_iter()
                .map(|(label, count)| LabelCount {
                    label: label.to_string(),
                    count,
                })
                .collect();
            out.sort_by(|a, b| a.label.cmp(&b.label));
            return out;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for issue in catalog.issues().iter().filter(|i| self.matches(i)) {
            for label in &issue.labels {
                if !self.contains(label) {
                    *counts.entry(label.as_str()).or_default() += 1;
                }
            }
        }
        let mut out: Vec<LabelCount> = counts
            .into_iter()
            .map(|(label, count)| LabelCount {
                label: label.to_string(),
                count,
            })
            .collect();
        sort_label_counts(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("x1", "X1").with_labels(["alpha", "beta"]),
            Issue::new("x2", "X2").with_labels(["alpha"]),
            Issue::new("x3", "X3").with_labels(["beta", "gamma"]),
            Issue::new("x4", "X4"),
        ])
    }

    #[test]
    fn union_and_intersection_matching() {
        let catalog = catalog();
        let union = Scope::new(ScopeMode::Union).with_labels(["alpha", "beta"]);
        let inter = Scope::new(ScopeMode::Intersection).with_labels(["alpha", "beta"]);
        assert_eq!(union.matching_set(&catalog), IssueSet::from([0, 1, 2]));
        assert_eq!(inter.matching_set(&catalog), IssueSet::from([0]));
        assert_eq!(Scope::default().matching_set(&catalog).len(), 4);
    }

    #[test]
    fn add_dedupes_and_remove_reports() {
        let mut scope = Scope::default();
        assert!(scope.add("a".into()));
        assert!(!scope.add("a".into()));
        assert!(scope.add("b".into()));
        assert_eq!(scope.remove_last().as_deref(), Some("b"));
        assert!(scope.remove("a"));
        assert!(!scope.remove("a"));
        assert!(scope.is_empty());
        assert!(scope.remove_last().is_none());
    }

    #[test]
    fn filter_set_keeps_anchor() {
        let catalog = catalog();
        let scope = Scope::new(ScopeMode::Union).with_labels(["gamma"]);
        let filtered = scope.filter_set(&catalog, &IssueSet::from([0, 1, 2]), Some(1));
        assert_eq!(filtered, IssueSet::from([1, 2]));
    }

    #[test]
    fn available_labels_without_scope_is_alphabetical() {
        let labels: Vec<String> = Scope::default()
            .available_labels(&catalog())
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn available_labels_with_scope_counts_cooccurrence() {
        let scope = Scope::new(ScopeMode::Union).with_labels(["beta"]);
        let labels: Vec<(String, usize)> = scope
            .available_labels(&catalog())
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();
        assert_eq!(labels, vec![("alpha".to_string(), 1), ("gamma".to_string(), 1)]);
    }

    #[test]
    fn mode_names_and_parsing() {
        assert_eq!(ScopeMode::Union.display_name(), "Union (ANY)");
        assert_eq!(ScopeMode::Intersection.short_name(), "∩ ALL");
        assert_eq!(ScopeMode::Union.toggled(), ScopeMode::Intersection);
        assert_eq!("ALL".parse::<ScopeMode>().unwrap(), ScopeMode::Intersection);
        assert!("xor".parse::<ScopeMode>().is_err());
    }
}
