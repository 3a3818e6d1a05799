//! Orderings shared by every builder.
//!
//! All sorts here are stable: equal keys keep their incoming order, which is
//! catalog order wherever the caller collected ids from the catalog.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{Catalog, CatalogIndex, IssueIdx};

/// Sort key: (effective status rank, priority).
#[must_use]
pub fn status_priority_key(catalog: &Catalog, index: &CatalogIndex, idx: IssueIdx) -> (u8, i32) {
    (
        index.effective_status(idx).rank(),
        catalog.issue(idx).priority,
    )
}

/// Stable sort by effective status then priority.
pub fn sort_by_status_priority(ids: &mut [IssueIdx], catalog: &Catalog, index: &CatalogIndex) {
    ids.sort_by_key(|&idx| status_priority_key(catalog, index, idx));
}

/// Stable sort with `anchor` pinned first, then status and priority.
pub fn sort_with_anchor_first(
    ids: &mut [IssueIdx],
    anchor: Option<IssueIdx>,
    catalog: &Catalog,
    index: &CatalogIndex,
) {
    ids.sort_by_key(|&idx| {
        let (rank, priority) = status_priority_key(catalog, index, idx);
        (Some(idx) != anchor, rank, priority)
    });
}

/// Compare issue ids so numeric segments order numerically:
/// `bd-2` < `bd-10`, `bd-1.2` < `bd-1.10`.
#[must_use]
pub fn compare_hierarchical_ids(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();
    loop {
        match (left.first(), right.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_len = left.iter().take_while(|c| c.is_ascii_digit()).count();
                let r_len = right.iter().take_while(|c| c.is_ascii_digit()).count();
                let ord = compare_digit_runs(&left[..l_len], &right[..r_len]);
                if ord != Ordering::Equal {
                    return ord;
                }
                left = &left[l_len..];
                right = &right[r_len..];
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(r);
                }
                left = &left[1..];
                right = &right[1..];
            }
        }
    }
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&c| c == b'0').count() };
    let a_sig = &a[trim(a)..];
    let b_sig = &b[trim(b)..];
    a_sig
        .len()
        .cmp(&b_sig.len())
        .then_with(|| a_sig.cmp(b_sig))
        .then_with(|| a.len().cmp(&b.len()))
}

// =============================================================================
// Label counts
// =============================================================================

/// A label with an occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Sort by count descending, then label ascending.
pub fn sort_label_counts(counts: &mut [LabelCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
}

/// Count labels over `issues`, skipping any in `exclude`, sorted by
/// [`sort_label_counts`].
#[must_use]
pub fn count_labels<'a, I>(issues: I, exclude: &[&str]) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'a crate::models::Issue>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for issue in issues {
        for label in &issue.labels {
            if !exclude.contains(&label.as_str()) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, Status};

    #[test]
    fn status_then_priority_is_stable() {
        let catalog = Catalog::new(vec![
            Issue::new("closed", "c").with_status(Status::Closed).with_priority(0),
            Issue::new("ready-p2-first", "r").with_priority(2),
            Issue::new("wip", "w").with_status(Status::InProgress).with_priority(0),
            Issue::new("ready-p1", "r").with_priority(1),
            Issue::new("ready-p2-second", "r").with_priority(2),
            Issue::new("blocked", "b").with_status(Status::Blocked).with_priority(0),
        ]);
        let index = CatalogIndex::build(&catalog);
        let mut ids: Vec<IssueIdx> = (0..catalog.len()).collect();
        sort_by_status_priority(&mut ids, &catalog, &index);
        let order: Vec<&str> = ids.iter().map(|&i| catalog.issue(i).id.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "ready-p1",
                "ready-p2-first",
                "ready-p2-second",
                "wip",
                "blocked",
                "closed"
            ]
        );
    }

    #[test]
    fn anchor_sorts_first_unconditionally() {
        let catalog = Catalog::new(vec![
            Issue::new("a", "A").with_priority(0),
            Issue::new("anchor", "E").with_status(Status::Closed).with_priority(4),
        ]);
        let index = CatalogIndex::build(&catalog);
        let mut ids = vec![0, 1];
        sort_with_anchor_first(&mut ids, Some(1), &catalog, &index);
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn hierarchical_ids_compare_numerically() {
        assert_eq!(compare_hierarchical_ids("bd-2", "bd-10"), Ordering::Less);
        assert_eq!(compare_hierarchical_ids("bd-1.10", "bd-1.2"), Ordering::Greater);
        assert_eq!(compare_hierarchical_ids("bd-1", "bd-1.1"), Ordering::Less);
        assert_eq!(compare_hierarchical_ids("abc", "abd"), Ordering::Less);
        assert_eq!(compare_hierarchical_ids("x-01", "x-1"), Ordering::Greater);
        assert_eq!(compare_hierarchical_ids("same", "same"), Ordering::Equal);
    }

    #[test]
    fn label_counts_sort_by_count_then_name() {
        let issues = [
            Issue::new("1", "").with_labels(["b", "a", "skip"]),
            Issue::new("2", "").with_labels(["b", "c"]),
            Issue::new("3", "").with_labels(["a"]),
        ];
        let counts = count_labels(issues.iter(), &["skip"]);
        let flat: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("a", 2), ("b", 2), ("c", 1)]);
    }
}
