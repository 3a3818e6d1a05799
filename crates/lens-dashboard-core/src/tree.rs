//! Dependency tree construction for the label lens and non-centered
//! epic/bead lenses.
//!
//! Nodes live in a [`Forest`] arena and refer to children by [`NodeId`].
//! A shared *seen* set guarantees each issue appears at most once, which also
//! breaks cycles at the first-discovered position.

use serde::Serialize;

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::depth::DepthOption;
use crate::models::EffectiveStatus;
use crate::sorting::{sort_by_status_priority, sort_with_anchor_first};

/// Position of a node in its [`Forest`].
pub type NodeId = usize;

// =============================================================================
// Nodes
// =============================================================================

/// One issue placed in a tree.
///
/// # Constraints
/// - `parent_path[k]` is true iff the k-th ancestor was its siblings' last
///   child; it is rewritten by [`Forest::fix_structure`].
/// - `relative_depth` is only meaningful in ego-centered layouts:
///   negative upstream, 0 for the ego, positive downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub issue: IssueIdx,
    pub is_primary: bool,
    pub is_entry: bool,
    pub is_upstream: bool,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    pub depth: usize,
    pub relative_depth: i32,
    pub is_last_child: bool,
    pub parent_path: Vec<bool>,
}

impl TreeNode {
    #[must_use]
    pub const fn new(issue: IssueIdx, is_primary: bool, depth: usize) -> Self {
        Self {
            issue,
            is_primary,
            is_entry: false,
            is_upstream: false,
            children: Vec::new(),
            depth,
            relative_depth: 0,
            is_last_child: false,
            parent_path: Vec::new(),
        }
    }
}

/// Arena of tree nodes plus the ordered root list.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl Forest {
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
    }

    /// Node ids in pre-order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    /// Recompute `is_last_child` and `parent_path` top-down.
    ///
    /// Roots get `root_path` as their parent path; descendants extend their
    /// parent's path with the parent's last-child flag.
    pub fn fix_structure(&mut self, root_path: &[bool]) {
        let count = self.roots.len();
        let mut stack: Vec<NodeId> = Vec::with_capacity(count);
        for (pos, &root) in self.roots.iter().enumerate() {
            let node = &mut self.nodes[root];
            node.is_last_child = pos + 1 == count;
            node.parent_path = root_path.to_vec();
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            let mut path = self.nodes[id].parent_path.clone();
            path.push(self.nodes[id].is_last_child);
            let children = self.nodes[id].children.clone();
            let last = children.len();
            for (pos, child) in children.into_iter().enumerate() {
                let node = &mut self.nodes[child];
                node.is_last_child = pos + 1 == last;
                node.parent_path.clone_from(&path);
                stack.push(child);
            }
        }
    }

    /// Issues in the forest, pre-order.
    #[must_use]
    pub fn issues(&self) -> Vec<IssueIdx> {
        self.preorder().into_iter().map(|id| self.nodes[id].issue).collect()
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Aggregate counts over every node of a built view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub total: usize,
    pub primary: usize,
    pub context: usize,
    pub ready: usize,
    pub blocked: usize,
    pub in_progress: usize,
    pub closed: usize,
}

impl TreeStats {
    pub const fn record(&mut self, is_primary: bool, status: EffectiveStatus) {
        self.total += 1;
        if is_primary {
            self.primary += 1;
        } else {
            self.context += 1;
        }
        match status {
            EffectiveStatus::Ready => self.ready += 1,
            EffectiveStatus::Blocked => self.blocked += 1,
            EffectiveStatus::InProgress => self.in_progress += 1,
            EffectiveStatus::Closed => self.closed += 1,
        }
    }

    /// Closed fraction of the total, 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.closed as f64 / self.total as f64
        }
    }

    #[must_use]
    pub fn from_forest(forest: &Forest, index: &CatalogIndex) -> Self {
        let mut stats = Self::default();
        for node in &forest.nodes {
            stats.record(node.is_primary, index.effective_status(node.issue));
        }
        stats
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds the non-centered forest for a primary set.
pub struct TreeBuilder<'a> {
    catalog: &'a Catalog,
    index: &'a CatalogIndex,
    primaries: &'a IssueSet,
    anchor: Option<IssueIdx>,
    depth: DepthOption,
    max_depth: usize,
}

struct BuildState {
    forest: Forest,
    seen: Vec<bool>,
}

impl<'a> TreeBuilder<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, index: &'a CatalogIndex, primaries: &'a IssueSet) -> Self {
        Self {
            catalog,
            index,
            primaries,
            anchor: None,
            depth: DepthOption::default(),
            max_depth: DepthOption::default().max_depth(crate::config::DEFAULT_UNBOUNDED_DEPTH),
        }
    }

    /// Pin the ego anchor first among roots.
    #[must_use]
    pub const fn with_anchor(mut self, anchor: Option<IssueIdx>) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub const fn with_depth(mut self, depth: DepthOption, unbounded: usize) -> Self {
        self.depth = depth;
        self.max_depth = depth.max_depth(unbounded);
        self
    }

    #[must_use]
    pub fn build(&self) -> Forest {
        let mut state = BuildState {
            forest: Forest::default(),
            seen: vec![false; self.catalog.len()],
        };

        let mut roots = self.select_roots();
        sort_with_anchor_first(&mut roots, self.anchor, self.catalog, self.index);
        for root in roots {
            if state.seen[root] {
                continue;
            }
            let id = self.build_node(&mut state, root, 0, None);
            state.forest.push_root(id);
        }

        if self.depth != DepthOption::One {
            self.add_upstream_context(&mut state);
        }

        state.forest.fix_structure(&[]);
        state.forest
    }

    fn select_roots(&self) -> Vec<IssueIdx> {
        let all: Vec<IssueIdx> = self.primaries.iter().copied().collect();
        if self.depth == DepthOption::One {
            return all;
        }
        let roots: Vec<IssueIdx> = all
            .iter()
            .copied()
            .filter(|&p| {
                Some(p) == self.anchor
                    || !self.index.upstream(p).iter().any(|&u| {
                        u != p && self.primaries.contains(&u) && self.index.is_open(u)
                    })
            })
            .collect();
        if roots.is_empty() { all } else { roots }
    }

    /// Recurse downstream. `confine` restricts children to a member set.
    fn build_node(
        &self,
        state: &mut BuildState,
        issue: IssueIdx,
        depth: usize,
        confine: Option<&IssueSet>,
    ) -> NodeId {
        state.seen[issue] = true;
        let id = state
            .forest
            .push(TreeNode::new(issue, self.primaries.contains(&issue), depth));

        if depth + 1 < self.max_depth {
            let mut children: Vec<IssueIdx> = Vec::new();
            for &next in self.index.downstream(issue) {
                if state.seen[next] || children.contains(&next) {
                    continue;
                }
                if confine.is_some_and(|set| !set.contains(&next)) {
                    continue;
                }
                children.push(next);
            }
            sort_by_status_priority(&mut children, self.catalog, self.index);
            for child in children {
                if state.seen[child] {
                    continue;
                }
                let child_id = self.build_node(state, child, depth + 1, confine);
                state.forest.add_child(id, child_id);
            }
        }
        id
    }

    /// Append trees for the non-primary upstream chain of the primaries.
    fn add_upstream_context(&self, state: &mut BuildState) {
        let mut context = IssueSet::new();
        for &p in self.primaries {
            for &u in self.index.upstream(p) {
                if !self.primaries.contains(&u) && !state.seen[u] {
                    context.insert(u);
                }
            }
        }
        if context.is_empty() {
            return;
        }

        let mut queue: Vec<IssueIdx> = context.iter().copied().collect();
        while let Some(current) = queue.pop() {
            for &u in self.index.upstream(current) {
                if !self.primaries.contains(&u) && !state.seen[u] && context.insert(u) {
                    queue.push(u);
                }
            }
        }

        let mut members: Vec<IssueIdx> = context.iter().copied().collect();
        sort_by_status_priority(&mut members, self.catalog, self.index);

        let mut roots: Vec<IssueIdx> = members
            .iter()
            .copied()
            .filter(|&c| {
                !self
                    .index
                    .upstream(c)
                    .iter()
                    .any(|&u| u != c && context.contains(&u))
            })
            .collect();
        if roots.is_empty() {
            roots = members;
        }

        tracing::trace!(
            context = context.len(),
            roots = roots.len(),
            "attaching upstream context blockers"
        );
        for root in roots {
            if state.seen[root] {
                continue;
            }
            let id = self.build_node(state, root, 0, Some(&context));
            state.forest.push_root(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Issue;

    fn build(catalog: &Catalog, primaries: &IssueSet, depth: DepthOption) -> Forest {
        let index = CatalogIndex::build(catalog);
        TreeBuilder::new(catalog, &index, primaries)
            .with_depth(depth, 100)
            .build()
    }

    fn order(catalog: &Catalog, forest: &Forest) -> Vec<String> {
        forest
            .issues()
            .into_iter()
            .map(|i| catalog.issue(i).id.clone())
            .collect()
    }

    #[test]
    fn depth_one_is_flat() {
        let catalog = Catalog::new(vec![Issue::new("a", "A"), Issue::new("b", "B").child_of("a")]);
        let forest = build(&catalog, &IssueSet::from([0, 1]), DepthOption::One);
        assert_eq!(forest.roots().len(), 2);
        assert!(forest.node(0).children.is_empty());
    }

    #[test]
    fn blocked_primaries_are_not_roots() {
        let catalog = Catalog::new(vec![
            Issue::new("a", "A"),
            Issue::new("b", "B").blocked_by("a"),
            Issue::new("c", "C").child_of("b"),
        ]);
        let forest = build(&catalog, &IssueSet::from([0, 1, 2]), DepthOption::All);
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(order(&catalog, &forest), vec!["a", "b", "c"]);
        assert_eq!(forest.node(2).depth, 2);
    }

    #[test]
    fn cycle_falls_back_to_all_roots_and_dedupes() {
        let catalog = Catalog::new(vec![
            Issue::new("a", "A").blocked_by("b"),
            Issue::new("b", "B").blocked_by("a"),
        ]);
        let forest = build(&catalog, &IssueSet::from([0, 1]), DepthOption::Two);
        assert_eq!(order(&catalog, &forest), vec!["a", "b"]);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn fixup_sets_last_child_and_paths() {
        let catalog = Catalog::new(vec![
            Issue::new("r", "R"),
            Issue::new("c1", "C1").child_of("r"),
            Issue::new("c2", "C2").child_of("r"),
            Issue::new("g", "G").child_of("c1"),
        ]);
        let forest = build(&catalog, &IssueSet::from([0, 1, 2, 3]), DepthOption::All);
        let root = forest.node(forest.roots()[0]);
        assert!(root.is_last_child);
        assert!(root.parent_path.is_empty());
        let c1 = forest.node(root.children[0]);
        let c2 = forest.node(root.children[1]);
        assert!(!c1.is_last_child);
        assert!(c2.is_last_child);
        assert_eq!(c1.parent_path, vec![true]);
        let g = forest.node(c1.children[0]);
        assert_eq!(g.parent_path, vec![true, false]);
    }

    #[test]
    fn context_closure_confined_to_chain() {
        // tb blocks b blocks p blocks d; unrelated x blocked by tb
        let catalog = Catalog::new(vec![
            Issue::new("tb", "TB"),
            Issue::new("b", "B").blocked_by("tb"),
            Issue::new("p", "P").blocked_by("b"),
            Issue::new("d", "D").blocked_by("p"),
            Issue::new("x", "X").blocked_by("tb"),
        ]);
        let forest = build(&catalog, &IssueSet::from([2]), DepthOption::Two);
        assert_eq!(order(&catalog, &forest), vec!["p", "d", "tb", "b"]);
        let stats = TreeStats::from_forest(&forest, &CatalogIndex::build(&catalog));
        assert_eq!((stats.total, stats.primary, stats.context), (4, 1, 3));
    }

    #[test]
    fn stats_progress() {
        let mut stats = TreeStats::default();
        stats.record(true, EffectiveStatus::Closed);
        stats.record(false, EffectiveStatus::Ready);
        assert!((stats.progress() - 0.5).abs() < f64::EPSILON);
        assert!(TreeStats::default().progress().abs() < f64::EPSILON);
    }
}
