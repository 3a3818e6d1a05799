//! Lens descriptors and depth materialization.
//!
//! A lens names a projection of the catalog. Building a [`LensDescriptor`]
//! runs every BFS once; [`LensDescriptor::materialize`] then applies a scope
//! and yields a [`PrimaryTable`] holding one primary set per depth option,
//! so cycling depth never re-walks the graph.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::depth::DepthOption;
use crate::error::Error;
use crate::scope::Scope;

// =============================================================================
// Lens kind
// =============================================================================

/// Which projection the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LensKind {
    /// Every issue bearing the label.
    Label(String),
    /// An issue and its parent-child descendants.
    Epic(String),
    /// An issue plus descendants and everything it transitively unblocks.
    Bead(String),
}

impl LensKind {
    /// The label name or anchor id.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Label(v) | Self::Epic(v) | Self::Bead(v) => v,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Label(_) => "label",
            Self::Epic(_) => "epic",
            Self::Bead(_) => "bead",
        }
    }

    #[must_use]
    pub const fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }

    /// Anchor id for epic and bead lenses.
    #[must_use]
    pub fn anchor_id(&self) -> Option<&str> {
        match self {
            Self::Label(_) => None,
            Self::Epic(id) | Self::Bead(id) => Some(id),
        }
    }
}

impl fmt::Display for LensKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind_name(), self.value())
    }
}

impl FromStr for LensKind {
    type Err = Error;

    /// Parse `label:<name>`, `epic:<id>` or `bead:<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidLens(s.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidLens(s.to_string()));
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "label" => Ok(Self::Label(value.to_string())),
            "epic" => Ok(Self::Epic(value.to_string())),
            "bead" | "issue" => Ok(Self::Bead(value.to_string())),
            _ => Err(Error::InvalidLens(s.to_string())),
        }
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// Unscoped primary sets for one lens, computed once per dashboard.
///
/// # Constraints
/// - Epic and bead descriptors list every reachable descendant with its
///   BFS level (shortest hop distance from the anchor, starting at 1).
/// - A missing anchor yields a descriptor with `found == false` and no
///   primaries.
#[derive(Debug, Clone)]
pub struct LensDescriptor {
    kind: LensKind,
    anchor: Option<IssueIdx>,
    found: bool,
    title: String,
    direct: IssueSet,
    expanded: IssueSet,
    levels: Vec<(IssueIdx, usize)>,
}

impl LensDescriptor {
    #[must_use]
    pub fn build(kind: LensKind, catalog: &Catalog, index: &CatalogIndex) -> Self {
        let descriptor = match &kind {
            LensKind::Label(name) => {
                let direct: IssueSet = catalog
                    .issues()
                    .iter()
                    .enumerate()
                    .filter(|(_, issue)| issue.has_label(name))
                    .map(|(idx, _)| idx)
                    .collect();
                let expanded = expand_to_descendants(&direct, index);
                Self {
                    title: name.clone(),
                    kind: kind.clone(),
                    anchor: None,
                    found: true,
                    direct,
                    expanded,
                    levels: Vec::new(),
                }
            }
            LensKind::Epic(id) | LensKind::Bead(id) => match catalog.index_of(id) {
                None => {
                    tracing::warn!(lens = %kind, "lens anchor not found in catalog");
                    Self {
                        title: format!("Not Found: {id}"),
                        kind: kind.clone(),
                        anchor: None,
                        found: false,
                        direct: IssueSet::new(),
                        expanded: IssueSet::new(),
                        levels: Vec::new(),
                    }
                }
                Some(anchor) => {
                    let follow_blocks = matches!(kind, LensKind::Bead(_));
                    let levels = descendant_levels(anchor, index, follow_blocks);
                    let direct: IssueSet = index.children(anchor).iter().copied().collect();
                    let mut expanded: IssueSet = levels.iter().map(|&(idx, _)| idx).collect();
                    expanded.insert(anchor);
                    Self {
                        title: catalog.issue(anchor).title.clone(),
                        kind: kind.clone(),
                        anchor: Some(anchor),
                        found: true,
                        direct,
                        expanded,
                        levels,
                    }
                }
            },
        };
        tracing::debug!(
            lens = %descriptor.kind,
            found = descriptor.found,
            direct = descriptor.direct.len(),
            expanded = descriptor.expanded.len(),
            "built lens descriptor"
        );
        descriptor
    }

    #[must_use]
    pub const fn kind(&self) -> &LensKind {
        &self.kind
    }

    #[must_use]
    pub const fn anchor(&self) -> Option<IssueIdx> {
        self.anchor
    }

    /// `false` when an epic or bead anchor is missing from the catalog.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.found
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Label lens: issues bearing the label. Epic/bead: direct children.
    #[must_use]
    pub const fn direct(&self) -> &IssueSet {
        &self.direct
    }

    /// Label lens: direct plus parent-child descendants. Epic/bead: the
    /// anchor plus every reachable descendant.
    #[must_use]
    pub const fn expanded(&self) -> &IssueSet {
        &self.expanded
    }

    /// BFS level of `idx` below the anchor (`Some(0)` for the anchor).
    #[must_use]
    pub fn level_of(&self, idx: IssueIdx) -> Option<usize> {
        if Some(idx) == self.anchor {
            return Some(0);
        }
        self.levels
            .iter()
            .find(|&&(candidate, _)| candidate == idx)
            .map(|&(_, level)| level)
    }

    /// Apply `scope` and produce the per-depth primary sets.
    #[must_use]
    pub fn materialize(&self, catalog: &Catalog, index: &CatalogIndex, scope: &Scope) -> PrimaryTable {
        let by_depth = match self.anchor {
            None if self.kind.is_label() => {
                let direct = scope.filter_set(catalog, &self.direct, None);
                let expanded = if scope.is_empty() {
                    self.expanded.clone()
                } else {
                    expand_to_descendants(&direct, index)
                };
                [direct, expanded.clone(), expanded.clone(), expanded]
            }
            None => Default::default(),
            Some(anchor) => DepthOption::CYCLE.map(|depth| {
                let mut set: IssueSet = self
                    .levels
                    .iter()
                    .filter(|&&(_, level)| depth.level().is_none_or(|max| level <= max))
                    .map(|&(idx, _)| idx)
                    .collect();
                set.insert(anchor);
                scope.filter_set(catalog, &set, Some(anchor))
            }),
        };
        PrimaryTable { by_depth }
    }
}

/// Scoped primary sets, one per depth option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryTable {
    by_depth: [IssueSet; 4],
}

impl PrimaryTable {
    #[must_use]
    pub const fn get(&self, depth: DepthOption) -> &IssueSet {
        &self.by_depth[depth.slot()]
    }
}

// =============================================================================
// Graph walks
// =============================================================================

/// `seeds` plus every parent-child descendant.
#[must_use]
pub fn expand_to_descendants(seeds: &IssueSet, index: &CatalogIndex) -> IssueSet {
    let mut out = seeds.clone();
    let mut queue: VecDeque<IssueIdx> = seeds.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        for &child in index.children(current) {
            if out.insert(child) {
                queue.push_back(child);
            }
        }
    }
    out
}

/// `seeds` plus every descendant and every transitively blocked issue.
#[must_use]
pub fn expand_to_descendants_and_blocked(seeds: &IssueSet, index: &CatalogIndex) -> IssueSet {
    let mut out = seeds.clone();
    let mut queue: VecDeque<IssueIdx> = seeds.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        for &next in index.downstream(current) {
            if out.insert(next) {
                queue.push_back(next);
            }
        }
    }
    out
}

/// BFS below `anchor` recording each discovered issue with its level.
fn descendant_levels(anchor: IssueIdx, index: &CatalogIndex, follow_blocks: bool) -> Vec<(IssueIdx, usize)> {
    let mut visited = IssueSet::from([anchor]);
    let mut queue = VecDeque::from([(anchor, 0_usize)]);
    let mut levels = Vec::new();
    while let Some((current, level)) = queue.pop_front() {
        let next: &[IssueIdx] = if follow_blocks {
            index.downstream(current)
        } else {
            index.children(current)
        };
        for &child in next {
            if visited.insert(child) {
                levels.push((child, level + 1));
                queue.push_back((child, level + 1));
            }
        }
    }
    levels
}
