//! Ego-centered layout for epic and bead lenses: open upstream blockers
//! above, the anchor in the middle, the downstream tree below.
//!
//! Cursor positions address `[upstream | ego | downstream]` as one
//! contiguous range; see [`EgoLayout::row`].

use serde::Serialize;

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::flatten::{FlatNode, flat_node, flatten};
use crate::sorting::sort_by_status_priority;
use crate::tree::{Forest, TreeNode, TreeStats};

/// The three sections of a centered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EgoLayout {
    pub upstream: Vec<FlatNode>,
    pub ego: FlatNode,
    pub downstream: Vec<FlatNode>,
    pub stats: TreeStats,
}

/// One row of a centered view by cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgoRow<'a> {
    Upstream(&'a FlatNode),
    Ego(&'a FlatNode),
    Downstream(&'a FlatNode),
}

impl<'a> EgoRow<'a> {
    #[must_use]
    pub const fn node(self) -> &'a FlatNode {
        match self {
            Self::Upstream(n) | Self::Ego(n) | Self::Downstream(n) => n,
        }
    }
}

impl EgoLayout {
    /// Rows in the combined cursor space.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upstream.len() + 1 + self.downstream.len()
    }

    /// Never empty: the ego row always exists.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Cursor position of the ego row.
    #[must_use]
    pub fn ego_position(&self) -> usize {
        self.upstream.len()
    }

    #[must_use]
    pub fn row(&self, cursor: usize) -> Option<EgoRow<'_>> {
        let up = self.upstream.len();
        if cursor < up {
            Some(EgoRow::Upstream(&self.upstream[cursor]))
        } else if cursor == up {
            Some(EgoRow::Ego(&self.ego))
        } else {
            self.downstream.get(cursor - up - 1).map(EgoRow::Downstream)
        }
    }

    /// Cursor position of `id`, if visible.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        if let Some(pos) = self.upstream.iter().position(|n| n.id == id) {
            return Some(pos);
        }
        if self.ego.id == id {
            return Some(self.upstream.len());
        }
        self.downstream
            .iter()
            .position(|n| n.id == id)
            .map(|pos| self.upstream.len() + 1 + pos)
    }

    /// All rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &FlatNode> {
        self.upstream
            .iter()
            .chain(std::iter::once(&self.ego))
            .chain(self.downstream.iter())
    }
}

/// Build the centered layout around `anchor`.
///
/// Upstream is one hop of open blockers and parents. Downstream recursion
/// stops once the relative depth reaches `max_depth`.
#[must_use]
pub fn build_ego_layout(
    catalog: &Catalog,
    index: &CatalogIndex,
    primaries: &IssueSet,
    anchor: IssueIdx,
    max_depth: usize,
) -> EgoLayout {
    let mut seen = vec![false; catalog.len()];
    seen[anchor] = true;
    let mut stats = TreeStats::default();

    let mut upstream_ids: Vec<IssueIdx> = Vec::new();
    for &u in index.upstream(anchor) {
        if index.is_open(u) && !seen[u] {
            seen[u] = true;
            upstream_ids.push(u);
        }
    }
    sort_by_status_priority(&mut upstream_ids, catalog, index);

    let upstream: Vec<FlatNode> = upstream_ids
        .iter()
        .map(|&u| {
            let mut node = TreeNode::new(u, primaries.contains(&u), 0);
            node.is_upstream = true;
            node.relative_depth = -1;
            node.is_last_child = true;
            stats.record(node.is_primary, index.effective_status(u));
            flat_node(node, catalog, index, false)
        })
        .collect();

    let mut ego_node = TreeNode::new(anchor, true, 0);
    ego_node.is_entry = true;
    ego_node.is_last_child = true;
    stats.record(true, index.effective_status(anchor));
    let ego_blocker_visible = index
        .blocked_by(anchor)
        .is_some_and(|b| upstream_ids.contains(&b));
    let ego = flat_node(ego_node, catalog, index, ego_blocker_visible);

    let mut forest = Forest::default();
    let mut roots: Vec<IssueIdx> = Vec::new();
    for &d in index.downstream(anchor) {
        if !seen[d] && !roots.contains(&d) {
            roots.push(d);
        }
    }
    sort_by_status_priority(&mut roots, catalog, index);
    let mut walker = DownstreamWalker {
        catalog,
        index,
        primaries,
        max_depth,
        forest: &mut forest,
        seen: &mut seen,
    };
    for root in roots {
        if walker.seen[root] {
            continue;
        }
        let id = walker.build(root, 1);
        walker.forest.push_root(id);
    }
    // Downstream roots hang off the ego, which is always a last child.
    forest.fix_structure(&[true]);
    for id in forest.preorder() {
        let node = forest.node(id);
        stats.record(node.is_primary, index.effective_status(node.issue));
    }

    let mut ancestors = upstream_ids;
    ancestors.push(anchor);
    let downstream = flatten(&forest, catalog, index, &ancestors);

    EgoLayout {
        upstream,
        ego,
        downstream,
        stats,
    }
}

struct DownstreamWalker<'a, 'b> {
    catalog: &'a Catalog,
    index: &'a CatalogIndex,
    primaries: &'a IssueSet,
    max_depth: usize,
    forest: &'b mut Forest,
    seen: &'b mut [bool],
}

impl DownstreamWalker<'_, '_> {
    fn build(&mut self, issue: IssueIdx, rel_depth: usize) -> usize {
        self.seen[issue] = true;
        let mut node = TreeNode::new(issue, self.primaries.contains(&issue), rel_depth);
        node.relative_depth = i32::try_from(rel_depth).unwrap_or(i32::MAX);
        let id = self.forest.push(node);

        if rel_depth < self.max_depth {
            let mut children: Vec<IssueIdx> = Vec::new();
            for &next in self.index.downstream(issue) {
                if !self.seen[next] && !children.contains(&next) {
                    children.push(next);
                }
            }
            sort_by_status_priority(&mut children, self.catalog, self.index);
            for child in children {
                if self.seen[child] {
                    continue;
                }
                let child_id = self.build(child, rel_depth + 1);
                self.forest.add_child(id, child_id);
            }
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, Status};

    fn scenario() -> Catalog {
        Catalog::new(vec![
            Issue::new("u1", "U1").with_priority(1),
            Issue::new("u2", "U2").with_priority(2),
            Issue::new("a", "A").blocked_by("u1").blocked_by("u2"),
            Issue::new("d1", "D1").blocked_by("a"),
            Issue::new("d2", "D2").child_of("a"),
            Issue::new("gc", "GC").child_of("d2"),
        ])
    }

    #[test]
    fn sections_are_split_around_the_ego() {
        let catalog = scenario();
        let index = CatalogIndex::build(&catalog);
        let primaries = IssueSet::from([2, 3, 4]);
        let layout = build_ego_layout(&catalog, &index, &primaries, 2, 2);
        let up: Vec<&str> = layout.upstream.iter().map(|n| n.id.as_str()).collect();
        let down: Vec<&str> = layout.downstream.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(up, vec!["u1", "u2"]);
        assert_eq!(layout.ego.id, "a");
        assert!(layout.ego.node.is_entry);
        assert!(layout.ego.blocker_in_tree);
        // d1 is blocked by the open ego, so ready d2 sorts first
        assert_eq!(down, vec!["d2", "gc", "d1"]);
        assert_eq!(layout.row(2).map(|r| r.node().id.as_str()), Some("a"));
        assert_eq!(layout.position_of("gc"), Some(4));
        assert_eq!(layout.len(), 6);
    }

    #[test]
    fn relative_depths_and_prefixes() {
        let catalog = scenario();
        let index = CatalogIndex::build(&catalog);
        let layout = build_ego_layout(&catalog, &index, &IssueSet::from([2]), 2, 2);
        assert!(layout.upstream.iter().all(|n| n.node.relative_depth == -1));
        assert_eq!(layout.ego.node.relative_depth, 0);
        let gc = &layout.downstream[1];
        assert_eq!(gc.node.relative_depth, 2);
        assert_eq!(gc.node.parent_path.len(), gc.node.depth);
        assert_eq!(layout.downstream[0].prefix, "  ├─");
        assert_eq!(gc.prefix, "  │ └─");
        assert_eq!(layout.downstream[2].prefix, "  └─");
        // d1 is blocked by the ego, which sits above the tree
        assert!(layout.downstream[2].blocker_in_tree);
    }

    #[test]
    fn depth_one_keeps_only_direct_downstream() {
        let catalog = scenario();
        let index = CatalogIndex::build(&catalog);
        let layout = build_ego_layout(&catalog, &index, &IssueSet::from([2]), 2, 1);
        assert_eq!(layout.downstream.len(), 2);
    }

    #[test]
    fn closed_upstream_is_hidden() {
        let mut issues = scenario().issues().to_vec();
        issues[0].status = Status::Closed;
        let catalog = Catalog::new(issues);
        let index = CatalogIndex::build(&catalog);
        let layout = build_ego_layout(&catalog, &index, &IssueSet::from([2]), 2, 2);
        assert_eq!(layout.upstream.len(), 1);
        assert_eq!(layout.stats.total, 5);
    }
}
