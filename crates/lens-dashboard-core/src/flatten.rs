//! Linearize a forest into display rows with tree-drawing metadata.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{Catalog, CatalogIndex, IssueIdx};
use crate::models::EffectiveStatus;
use crate::tree::{Forest, TreeNode};

/// A tree node ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatNode {
    pub id: String,
    #[serde(flatten)]
    pub node: TreeNode,
    pub prefix: String,
    pub status: EffectiveStatus,
    pub blocked_by: Option<String>,
    /// The blocker is already visible above this row on its path.
    pub blocker_in_tree: bool,
}

impl FlatNode {
    #[must_use]
    pub const fn issue(&self) -> IssueIdx {
        self.node.issue
    }
}

/// Tree prefix for a node: one two-column cell per ancestor, then the
/// connector. Depth 0 renders nothing.
#[must_use]
pub fn tree_prefix(depth: usize, parent_path: &[bool], is_last_child: bool) -> String {
    if depth == 0 {
        return String::new();
    }
    let mut prefix = String::with_capacity(parent_path.len() * 2 + 2);
    for &ancestor_was_last in parent_path {
        prefix.push_str(if ancestor_was_last { "  " } else { "│ " });
    }
    prefix.push_str(if is_last_child { "└─" } else { "├─" });
    prefix
}

/// Build one display row for `node`.
#[must_use]
pub fn flat_node(
    node: TreeNode,
    catalog: &Catalog,
    index: &CatalogIndex,
    blocker_in_tree: bool,
) -> FlatNode {
    let issue = node.issue;
    FlatNode {
        id: catalog.issue(issue).id.clone(),
        prefix: tree_prefix(node.depth, &node.parent_path, node.is_last_child),
        status: index.effective_status(issue),
        blocked_by: index.blocked_by(issue).map(|b| catalog.issue(b).id.clone()),
        blocker_in_tree,
        node,
    }
}

/// Pre-order flatten. `ancestors` seeds the visible-above set, e.g. the ego
/// and upstream rows of a centered layout.
#[must_use]
pub fn flatten(
    forest: &Forest,
    catalog: &Catalog,
    index: &CatalogIndex,
    ancestors: &[IssueIdx],
) -> Vec<FlatNode> {
    let mut on_path: HashMap<IssueIdx, usize> = HashMap::new();
    for &a in ancestors {
        *on_path.entry(a).or_default() += 1;
    }

    let mut out = Vec::with_capacity(forest.len());
    // (node, leaving): leaving entries pop the node off the ancestor path
    let mut stack: Vec<(usize, bool)> = forest.roots().iter().rev().map(|&r| (r, false)).collect();
    while let Some((id, leaving)) = stack.pop() {
        let node = forest.node(id);
        if leaving {
            if let Some(count) = on_path.get_mut(&node.issue) {
                *count -= 1;
                if *count == 0 {
                    on_path.remove(&node.issue);
                }
            }
            continue;
        }
        let in_tree = index
            .blocked_by(node.issue)
            .is_some_and(|b| on_path.contains_key(&b));
        out.push(flat_node(node.clone(), catalog, index, in_tree));

        *on_path.entry(node.issue).or_default() += 1;
        stack.push((id, true));
        stack.extend(node.children.iter().rev().map(|&c| (c, false)));
    }
    out
}
