//! Workstream partition: clusters of visible issues with aggregate stats.
//!
//! The partitioner is pluggable through [`Partitioner`]. The default,
//! [`ComponentPartitioner`], splits the visible set into weakly connected
//! components over parent-child and blocks edges restricted to that set.
//! [`subdivide_all`] optionally refines each workstream by secondary label.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::depth::DepthOption;
use crate::flatten::{FlatNode, flatten};
use crate::models::EffectiveStatus;
use crate::sorting::{LabelCount, count_labels};
use crate::tree::{Forest, TreeNode};

/// Id of the pooled singleton workstream.
pub const STANDALONE_ID: &str = "standalone";
/// Name of the pooled singleton workstream.
pub const STANDALONE_NAME: &str = "Standalone";
/// Name of the remainder bucket produced by subdivision.
pub const CORE_NAME: &str = "Core";

// =============================================================================
// Workstream
// =============================================================================

/// A blocking edge that crosses two workstreams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossBlocker {
    pub blocker_id: String,
    pub blocker_workstream: String,
    pub blocked_id: String,
    pub blocked_workstream: String,
}

/// A named partition of issues.
///
/// # Constraints
/// - `issues` keeps the order in which the partitioner received them.
/// - `progress` = closed / total, 0 for an empty workstream.
/// - `is_blocked`: nothing ready or in progress while something is unfinished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workstream {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub issues: Vec<IssueIdx>,
    pub issue_ids: Vec<String>,
    pub primary_count: usize,
    pub context_count: usize,
    pub ready_count: usize,
    pub blocked_count: usize,
    pub in_progress_count: usize,
    pub closed_count: usize,
    pub progress: f64,
    pub is_blocked: bool,
    pub related_labels: Vec<String>,
    pub cross_blocked_by: Vec<CrossBlocker>,
    pub cross_blocks: Vec<CrossBlocker>,
    pub sub_workstreams: Vec<Workstream>,
    pub depth: usize,
    pub grouped_by: Option<String>,
}

impl Workstream {
    /// Build a workstream over `issues` and compute its stats.
    #[must_use]
    pub fn from_issues(
        id: impl Into<String>,
        name: impl Into<String>,
        issues: Vec<IssueIdx>,
        catalog: &Catalog,
        index: &CatalogIndex,
        primaries: &IssueSet,
    ) -> Self {
        let mut ws = Self {
            id: id.into(),
            name: name.into(),
            issue_ids: issues.iter().map(|&i| catalog.issue(i).id.clone()).collect(),
            issues,
            primary_count: 0,
            context_count: 0,
            ready_count: 0,
            blocked_count: 0,
            in_progress_count: 0,
            closed_count: 0,
            progress: 0.0,
            is_blocked: false,
            related_labels: Vec::new(),
            cross_blocked_by: Vec::new(),
            cross_blocks: Vec::new(),
            sub_workstreams: Vec::new(),
            depth: 0,
            grouped_by: None,
        };
        ws.compute_stats(catalog, index, primaries);
        ws
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn contains(&self, idx: IssueIdx) -> bool {
        self.issues.contains(&idx)
    }

    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.id == STANDALONE_ID
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute_stats(&mut self, catalog: &Catalog, index: &CatalogIndex, primaries: &IssueSet) {
        self.primary_count = 0;
        self.context_count = 0;
        self.ready_count = 0;
        self.blocked_count = 0;
        self.in_progress_count = 0;
        self.closed_count = 0;
        for &idx in &self.issues {
            if primaries.contains(&idx) {
                self.primary_count += 1;
            } else {
                self.context_count += 1;
            }
            match index.effective_status(idx) {
                EffectiveStatus::Ready => self.ready_count += 1,
                EffectiveStatus::Blocked => self.blocked_count += 1,
                EffectiveStatus::InProgress => self.in_progress_count += 1,
                EffectiveStatus::Closed => self.closed_count += 1,
            }
        }
        let total = self.issues.len();
        self.progress = if total == 0 {
            0.0
        } else {
            self.closed_count as f64 / total as f64
        };
        self.is_blocked =
            self.ready_count == 0 && self.in_progress_count == 0 && self.closed_count < total;
        self.related_labels = count_labels(self.issues.iter().map(|&i| catalog.issue(i)), &[])
            .into_iter()
            .take(3)
            .map(|c| c.label)
            .collect();
    }
}

/// Strip a `prefix:` and capitalise the first letter.
#[must_use]
pub fn format_workstream_name(label: &str) -> String {
    let base = label.split_once(':').map_or(label, |(_, rest)| rest);
    let mut chars = base.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// =============================================================================
// Partitioner
// =============================================================================

/// Everything a partitioner may look at.
pub struct PartitionInput<'a> {
    pub catalog: &'a Catalog,
    pub index: &'a CatalogIndex,
    /// Visible issues in display order.
    pub visible: &'a [IssueIdx],
    pub primaries: &'a IssueSet,
    /// Label excluded from naming (the label lens name).
    pub lens_label: Option<&'a str>,
    /// Issue whose workstream sorts first (the epic anchor).
    pub pin_first: Option<IssueIdx>,
}

/// Splits the visible set into workstreams.
pub trait Partitioner {
    fn partition(&self, input: &PartitionInput<'_>) -> Vec<Workstream>;
}

/// Weakly connected components over parent-child and blocks edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentPartitioner;

impl Partitioner for ComponentPartitioner {
    fn partition(&self, input: &PartitionInput<'_>) -> Vec<Workstream> {
        let mut members: Vec<IssueIdx> = Vec::with_capacity(input.visible.len());
        let mut position: HashMap<IssueIdx, usize> = HashMap::new();
        for &idx in input.visible {
            if !position.contains_key(&idx) {
                position.insert(idx, members.len());
                members.push(idx);
            }
        }
        if members.is_empty() {
            return Vec::new();
        }

        let mut sets = DisjointSets::new(members.len());
        for (pos, &idx) in members.iter().enumerate() {
            for up in input.index.upstream(idx) {
                if let Some(&other) = position.get(up) {
                    sets.union(pos, other);
                }
            }
        }

        let mut components: Vec<Vec<IssueIdx>> = Vec::new();
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        for (pos, &idx) in members.iter().enumerate() {
            let root = sets.find(pos);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(idx);
        }

        let mut workstreams = Vec::new();
        let mut standalone = Vec::new();
        let mut unnamed = 0_usize;
        for component in components {
            if component.len() < 2 {
                standalone.extend(component);
                continue;
            }
            let name = Self::name_component(input, &component).unwrap_or_else(|| {
                unnamed += 1;
                format!("Workstream {unnamed}")
            });
            let id = format!("ws:{}", input.catalog.issue(component[0]).id);
            workstreams.push(Workstream::from_issues(
                id,
                name,
                component,
                input.catalog,
                input.index,
                input.primaries,
            ));
        }

        workstreams.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.name.cmp(&b.name)));
        if let Some(pin) = input.pin_first {
            workstreams.sort_by_key(|ws| !ws.contains(pin));
        }
        if !standalone.is_empty() {
            workstreams.push(Workstream::from_issues(
                STANDALONE_ID,
                STANDALONE_NAME,
                standalone,
                input.catalog,
                input.index,
                input.primaries,
            ));
        }

        detect_cross_blockers(&mut workstreams, input.catalog, input.index);
        tracing::debug!(
            visible = members.len(),
            workstreams = workstreams.len(),
            "partitioned workstreams"
        );
        workstreams
    }
}

impl ComponentPartitioner {
    /// Dominant label other than the lens label, else the root's title.
    fn name_component(input: &PartitionInput<'_>, component: &[IssueIdx]) -> Option<String> {
        let exclude: Vec<&str> = input.lens_label.into_iter().collect();
        let labels = count_labels(component.iter().map(|&i| input.catalog.issue(i)), &exclude);
        if let Some(top) = labels.first() {
            let name = format_workstream_name(&top.label);
            if !name.is_empty() {
                return Some(name);
            }
        }
        let members: HashSet<IssueIdx> = component.iter().copied().collect();
        let root = component
            .iter()
            .copied()
            .find(|&idx| {
                !input
                    .index
                    .upstream(idx)
                    .iter()
                    .any(|u| *u != idx && members.contains(u))
            })
            .unwrap_or(component[0]);
        let title = input.catalog.issue(root).title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // keep the earlier member as representative
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}

/// Fill `cross_blocked_by` / `cross_blocks` for open issues blocked by an
/// open issue of a sibling workstream.
pub fn detect_cross_blockers(workstreams: &mut [Workstream], catalog: &Catalog, index: &CatalogIndex) {
    for ws in workstreams.iter_mut() {
        ws.cross_blocked_by.clear();
        ws.cross_blocks.clear();
    }
    if workstreams.len() < 2 {
        return;
    }
    let mut owner: HashMap<IssueIdx, usize> = HashMap::new();
    for (i, ws) in workstreams.iter().enumerate() {
        for &idx in &ws.issues {
            owner.entry(idx).or_insert(i);
        }
    }

    let mut found: Vec<(usize, usize, CrossBlocker)> = Vec::new();
    for (i, ws) in workstreams.iter().enumerate() {
        for &blocked in &ws.issues {
            if !index.is_open(blocked) {
                continue;
            }
            for &blocker in index.blockers(blocked) {
                let Some(&j) = owner.get(&blocker) else { continue };
                if j == i || !index.is_open(blocker) {
                    continue;
                }
                found.push((
                    i,
                    j,
                    CrossBlocker {
                        blocker_id: catalog.issue(blocker).id.clone(),
                        blocker_workstream: workstreams[j].name.clone(),
                        blocked_id: catalog.issue(blocked).id.clone(),
                        blocked_workstream: ws.name.clone(),
                    },
                ));
            }
        }
    }
    for (blocked_ws, blocker_ws, edge) in found {
        workstreams[blocker_ws].cross_blocks.push(edge.clone());
        workstreams[blocked_ws].cross_blocked_by.push(edge);
    }
}

// =============================================================================
// Subdivision
// =============================================================================

/// Controls label-based subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Maximum nesting below the top level.
    pub max_depth: usize,
    /// Smallest sub-group that stands on its own; floored at 2.
    pub min_group_size: usize,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            min_group_size: 2,
        }
    }
}

impl GroupingOptions {
    const fn min_size(self) -> usize {
        if self.min_group_size < 2 { 2 } else { self.min_group_size }
    }
}

/// Subdivide every workstream in place, recursing up to `max_depth`.
pub fn subdivide_all(
    workstreams: &mut [Workstream],
    catalog: &Catalog,
    index: &CatalogIndex,
    primaries: &IssueSet,
    opts: GroupingOptions,
) {
    for ws in workstreams.iter_mut() {
        subdivide_recursive(ws, catalog, index, primaries, opts, &[]);
    }
}

fn subdivide_recursive(
    ws: &mut Workstream,
    catalog: &Catalog,
    index: &CatalogIndex,
    primaries: &IssueSet,
    opts: GroupingOptions,
    inherited: &[String],
) {
    let subs = subdivide_workstream(ws, catalog, index, primaries, opts, inherited);
    if subs.is_empty() {
        return;
    }
    let mut excluded: Vec<String> = inherited.to_vec();
    excluded.extend(common_labels(ws, catalog));
    ws.sub_workstreams = subs;
    for sub in &mut ws.sub_workstreams {
        if let Some(label) = &sub.grouped_by {
            let mut next = excluded.clone();
            next.push(label.clone());
            subdivide_recursive(sub, catalog, index, primaries, opts, &next);
        }
    }
}

/// Split one workstream by its most common labels not shared by most
/// members. Returns nothing unless at least two sub-groups reach the
/// minimum size.
#[must_use]
pub fn subdivide_workstream(
    ws: &Workstream,
    catalog: &Catalog,
    index: &CatalogIndex,
    primaries: &IssueSet,
    opts: GroupingOptions,
    inherited: &[String],
) -> Vec<Workstream> {
    if ws.depth >= opts.max_depth {
        return Vec::new();
    }
    let min = opts.min_size();
    if ws.len() < min * 2 {
        return Vec::new();
    }

    let mut excluded: Vec<String> = inherited.to_vec();
    excluded.extend(common_labels(ws, catalog));
    let exclude_refs: Vec<&str> = excluded.iter().map(String::as_str).collect();
    let ranked: Vec<LabelCount> =
        count_labels(ws.issues.iter().map(|&i| catalog.issue(i)), &exclude_refs);
    let rank: HashMap<&str, usize> = ranked
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.label.as_str(), pos))
        .collect();

    let mut buckets: Vec<(String, Vec<IssueIdx>)> = Vec::new();
    let mut core: Vec<IssueIdx> = Vec::new();
    for &idx in &ws.issues {
        let best = catalog
            .issue(idx)
            .labels
            .iter()
            .filter_map(|l| rank.get(l.as_str()).map(|&r| (r, l)))
            .min_by_key(|&(r, _)| r);
        match best {
            Some((_, label)) => match buckets.iter_mut().find(|(l, _)| l == label) {
                Some((_, members)) => members.push(idx),
                None => buckets.push((label.clone(), vec![idx])),
            },
            None => core.push(idx),
        }
    }

    let mut groups: Vec<(String, Vec<IssueIdx>)> = Vec::new();
    for (label, members) in buckets {
        if members.len() < min {
            core.extend(members);
        } else {
            groups.push((label, members));
        }
    }
    if groups.len() < 2 {
        return Vec::new();
    }
    groups.sort_by(|a, b| {
        b.1.len()
            .cmp(&a.1.len())
            .then_with(|| rank.get(a.0.as_str()).cmp(&rank.get(b.0.as_str())))
    });

    let order: HashMap<IssueIdx, usize> = ws.issues.iter().enumerate().map(|(p, &i)| (i, p)).collect();
    let mut subs: Vec<Workstream> = groups
        .into_iter()
        .map(|(label, members)| {
            let mut sub = Workstream::from_issues(
                format!("{}/{label}", ws.id),
                format_workstream_name(&label),
                members,
                catalog,
                index,
                primaries,
            );
            sub.depth = ws.depth + 1;
            sub.grouped_by = Some(label);
            sub
        })
        .collect();
    if !core.is_empty() {
        core.sort_by_key(|idx| order.get(idx).copied().unwrap_or(usize::MAX));
        let mut sub = Workstream::from_issues(
            format!("{}/core", ws.id),
            CORE_NAME,
            core,
            catalog,
            index,
            primaries,
        );
        sub.depth = ws.depth + 1;
        subs.push(sub);
    }
    detect_cross_blockers(&mut subs, catalog, index);
    subs
}

/// Labels carried by more than half of the members.
fn common_labels(ws: &Workstream, catalog: &Catalog) -> Vec<String> {
    let total = ws.len();
    count_labels(ws.issues.iter().map(|&i| catalog.issue(i)), &[])
        .into_iter()
        .filter(|c| c.count * 2 > total)
        .map(|c| c.label)
        .collect()
}

// =============================================================================
// Workstream tree view
// =============================================================================

/// Flatten a workstream as a forest over its internal blocks edges.
///
/// Roots are members with no in-stream blocker (every member when none
/// qualifies). Children are the members each issue blocks; recursion stops
/// at the depth bound.
#[must_use]
pub fn workstream_tree(
    ws: &Workstream,
    catalog: &Catalog,
    index: &CatalogIndex,
    primaries: &IssueSet,
    depth: DepthOption,
    unbounded: usize,
) -> Vec<FlatNode> {
    if ws.is_empty() {
        return Vec::new();
    }
    let members: HashSet<IssueIdx> = ws.issues.iter().copied().collect();
    let mut roots: Vec<IssueIdx> = ws
        .issues
        .iter()
        .copied()
        .filter(|&idx| !index.blockers(idx).iter().any(|b| *b != idx && members.contains(b)))
        .collect();
    if roots.is_empty() {
        roots.clone_from(&ws.issues);
    }

    let max_depth = depth.max_depth(unbounded);
    let mut forest = Forest::default();
    let mut seen: HashSet<IssueIdx> = HashSet::new();
    for root in roots {
        if seen.contains(&root) {
            continue;
        }
        let id = build_ws_node(&mut forest, &mut seen, root, 0, max_depth, &members, index, primaries);
        forest.push_root(id);
    }
    forest.fix_structure(&[]);
    flatten(&forest, catalog, index, &[])
}

#[allow(clippy::too_many_arguments)]
fn build_ws_node(
    forest: &mut Forest,
    seen: &mut HashSet<IssueIdx>,
    issue: IssueIdx,
    depth: usize,
    max_depth: usize,
    members: &HashSet<IssueIdx>,
    index: &CatalogIndex,
    primaries: &IssueSet,
) -> usize {
    seen.insert(issue);
    let id = forest.push(TreeNode::new(issue, primaries.contains(&issue), depth));
    if depth + 1 < max_depth {
        for &next in index.blocks(issue) {
            if members.contains(&next) && !seen.contains(&next) {
                let child = build_ws_node(forest, seen, next, depth + 1, max_depth, members, index, primaries);
                forest.add_child(id, child);
            }
        }
    }
    id
}
