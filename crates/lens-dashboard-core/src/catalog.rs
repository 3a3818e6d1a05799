//! Issue catalog and its precomputed graph index.
//!
//! The [`Catalog`] owns the issues in input order; every other structure
//! refers to an issue by its position ([`IssueIdx`]). Because positions follow
//! catalog order, ordered sets of indices iterate in catalog order too.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::models::{DependencyKind, EffectiveStatus, Issue, Status};

/// Position of an issue in its [`Catalog`].
pub type IssueIdx = usize;

/// Ordered set of catalog positions. Iterates in catalog order.
pub type IssueSet = BTreeSet<IssueIdx>;

// =============================================================================
// Catalog
// =============================================================================

/// Read-only issue list with id lookup.
///
/// # Constraints
/// - Issue order is preserved exactly as supplied.
/// - When two records share an id, lookups resolve to the first one;
///   [`Catalog::validate`] reports the duplicate.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    issues: Vec<Issue>,
    by_id: IndexMap<String, IssueIdx>,
}

impl Catalog {
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        let mut by_id = IndexMap::with_capacity(issues.len());
        for (idx, issue) in issues.iter().enumerate() {
            by_id.entry(issue.id.clone()).or_insert(idx);
        }
        Self { issues, by_id }
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue at `idx`. Indices handed out by this crate are always in range.
    #[must_use]
    pub fn issue(&self, idx: IssueIdx) -> &Issue {
        &self.issues[idx]
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<IssueIdx> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.index_of(id).map(|idx| &self.issues[idx])
    }

    /// Look up an issue, failing with [`Error::IssueNotFound`].
    pub fn require(&self, id: &str) -> Result<&Issue> {
        self.get(id)
            .ok_or_else(|| Error::IssueNotFound(id.to_string()))
    }

    /// Every distinct label in the catalog, sorted.
    #[must_use]
    pub fn labels_sorted(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .issues
            .iter()
            .flat_map(|issue| issue.labels.iter().map(String::as_str))
            .collect();
        labels.into_iter().map(str::to_string).collect()
    }

    /// Validate every record and reject duplicate ids.
    pub fn validate(&self) -> Result<()> {
        for issue in &self.issues {
            issue.validate()?;
        }
        if self.by_id.len() != self.issues.len() {
            let mut seen = BTreeSet::new();
            for issue in &self.issues {
                if !seen.insert(issue.id.as_str()) {
                    return Err(Error::DuplicateIssueId(issue.id.clone()));
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Issue> for Catalog {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Catalog index
// =============================================================================

/// Graph maps derived from one pass over the catalog.
///
/// Edges are read from the dependent's record: `A depends on B` means `B`
/// is upstream of `A`. Only `blocks` and `parent-child` edges are indexed;
/// targets missing from the catalog are dropped.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    /// Children and blocked issues, in discovery order.
    downstream: Vec<Vec<IssueIdx>>,
    /// Parents and blockers, in the dependent's dependency order.
    upstream: Vec<Vec<IssueIdx>>,
    children: Vec<Vec<IssueIdx>>,
    parents: Vec<Vec<IssueIdx>>,
    /// Issues this one blocks.
    blocks: Vec<Vec<IssueIdx>>,
    /// Issues blocking this one.
    blockers: Vec<Vec<IssueIdx>>,
    /// First open blocker, first seen wins.
    blocked_by: Vec<Option<IssueIdx>>,
    status: Vec<Status>,
    dangling: usize,
}

impl CatalogIndex {
    #[must_use]
    pub fn build(catalog: &Catalog) -> Self {
        let n = catalog.len();
        let mut index = Self {
            downstream: vec![Vec::new(); n],
            upstream: vec![Vec::new(); n],
            children: vec![Vec::new(); n],
            parents: vec![Vec::new(); n],
            blocks: vec![Vec::new(); n],
            blockers: vec![Vec::new(); n],
            blocked_by: vec![None; n],
            status: catalog.issues().iter().map(|i| i.status).collect(),
            dangling: 0,
        };

        for (idx, issue) in catalog.issues().iter().enumerate() {
            for dep in &issue.dependencies {
                if !dep.kind.is_structural() {
                    continue;
                }
                let Some(target) = catalog.index_of(&dep.depends_on_id) else {
                    index.dangling += 1;
                    continue;
                };
                index.downstream[target].push(idx);
                index.upstream[idx].push(target);
                match dep.kind {
                    DependencyKind::Blocks => {
                        index.blocks[target].push(idx);
                        index.blockers[idx].push(target);
                        if index.blocked_by[idx].is_none() && !index.status[target].is_closed() {
                            index.blocked_by[idx] = Some(target);
                        }
                    }
                    DependencyKind::ParentChild => {
                        index.children[target].push(idx);
                        index.parents[idx].push(target);
                    }
                    _ => {}
                }
            }
        }

        if index.dangling > 0 {
            tracing::debug!(
                dangling = index.dangling,
                "skipped dependencies pointing outside the catalog"
            );
        }
        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.status.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    #[must_use]
    pub fn downstream(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.downstream[idx]
    }

    #[must_use]
    pub fn upstream(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.upstream[idx]
    }

    #[must_use]
    pub fn children(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.children[idx]
    }

    #[must_use]
    pub fn parents(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.parents[idx]
    }

    #[must_use]
    pub fn blocks(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.blocks[idx]
    }

    #[must_use]
    pub fn blockers(&self, idx: IssueIdx) -> &[IssueIdx] {
        &self.blockers[idx]
    }

    #[must_use]
    pub fn blocked_by(&self, idx: IssueIdx) -> Option<IssueIdx> {
        self.blocked_by[idx]
    }

    #[must_use]
    pub fn is_open(&self, idx: IssueIdx) -> bool {
        !self.status[idx].is_closed()
    }

    #[must_use]
    pub fn status(&self, idx: IssueIdx) -> Status {
        self.status[idx]
    }

    /// Number of dependency records whose target was missing.
    #[must_use]
    pub const fn dangling_count(&self) -> usize {
        self.dangling
    }

    /// Displayed status: explicit `blocked` and "has an open blocker" both
    /// read as blocked.
    #[must_use]
    pub fn effective_status(&self, idx: IssueIdx) -> EffectiveStatus {
        match self.status[idx] {
            Status::Closed => EffectiveStatus::Closed,
            Status::InProgress => EffectiveStatus::InProgress,
            Status::Blocked => EffectiveStatus::Blocked,
            Status::Open if self.blocked_by[idx].is_some() => EffectiveStatus::Blocked,
            Status::Open => EffectiveStatus::Ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Issue;

    fn sample() -> Catalog {
        Catalog::new(vec![
            Issue::new("a", "A"),
            Issue::new("b", "B").with_status(Status::Closed),
            Issue::new("c", "C").blocked_by("b").blocked_by("a").child_of("a"),
            Issue::new("d", "D").blocked_by("ghost"),
        ])
    }

    #[test]
    fn index_maps_both_edge_kinds() {
        let catalog = sample();
        let index = CatalogIndex::build(&catalog);
        let (a, b, c) = (0, 1, 2);
        assert_eq!(index.downstream(a), &[c, c]);
        assert_eq!(index.downstream(b), &[c]);
        assert_eq!(index.upstream(c), &[b, a, a]);
        assert_eq!(index.children(a), &[c]);
        assert_eq!(index.parents(c), &[a]);
        assert_eq!(index.blockers(c), &[b, a]);
        assert_eq!(index.blocks(a), &[c]);
    }

    #[test]
    fn blocked_by_is_first_open_blocker() {
        let catalog = sample();
        let index = CatalogIndex::build(&catalog);
        // b is closed so the first open blocker is a
        assert_eq!(index.blocked_by(2), Some(0));
        assert_eq!(index.blocked_by(0), None);
        assert_eq!(index.effective_status(2), EffectiveStatus::Blocked);
        assert_eq!(index.effective_status(1), EffectiveStatus::Closed);
        assert_eq!(index.effective_status(0), EffectiveStatus::Ready);
    }

    #[test]
    fn dangling_targets_are_skipped() {
        let catalog = sample();
        let index = CatalogIndex::build(&catalog);
        assert_eq!(index.dangling_count(), 1);
        assert!(index.upstream(3).is_empty());
        assert_eq!(index.effective_status(3), EffectiveStatus::Ready);
    }

    #[test]
    fn parent_child_never_sets_blocked_by() {
        let catalog = Catalog::new(vec![Issue::new("p", "P"), Issue::new("c", "C").child_of("p")]);
        let index = CatalogIndex::build(&catalog);
        assert_eq!(index.blocked_by(1), None);
        assert_eq!(index.effective_status(1), EffectiveStatus::Ready);
    }

    #[test]
    fn explicit_blocked_status_counts_as_blocked() {
        let catalog = Catalog::new(vec![Issue::new("x", "X").with_status(Status::Blocked)]);
        let index = CatalogIndex::build(&catalog);
        assert_eq!(index.effective_status(0), EffectiveStatus::Blocked);
    }

    #[test]
    fn catalog_lookup_and_validation() {
        let catalog = Catalog::new(vec![Issue::new("a", "A"), Issue::new("a", "again")]);
        assert_eq!(catalog.index_of("a"), Some(0));
        assert_eq!(catalog.get("a").map(|i| i.title.as_str()), Some("A"));
        assert!(matches!(catalog.validate(), Err(Error::DuplicateIssueId(id)) if id == "a"));
        assert!(matches!(catalog.require("zz"), Err(Error::IssueNotFound(_))));
    }

    #[test]
    fn labels_sorted_dedupes() {
        let catalog = Catalog::new(vec![
            Issue::new("a", "A").with_labels(["ui", "api"]),
            Issue::new("b", "B").with_labels(["api"]),
        ]);
        assert_eq!(catalog.labels_sorted(), vec!["api".to_string(), "ui".to_string()]);
    }
}
