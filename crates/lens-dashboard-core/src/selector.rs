//! Lens picker: lists labels, open epics and beads, filters them by fuzzy
//! query and search mode, and narrows them by a label scope.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::error::Error;
use crate::fuzzy;
use crate::lens::LensKind;
use crate::models::IssueType;
use crate::scope::{Scope, ScopeMode};
use crate::sorting::{LabelCount, compare_hierarchical_ids, sort_label_counts};

// =============================================================================
// Items and modes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensItemKind {
    Label,
    Epic,
    Bead,
}

impl LensItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Epic => "epic",
            Self::Bead => "bead",
        }
    }
}

/// One selectable lens.
///
/// # Constraints
/// - Labels count issues bearing the label directly.
/// - Epics count every parent-child descendant.
/// - `overlap_count` is only non-zero while a scope is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensItem {
    pub kind: LensItemKind,
    pub value: String,
    pub title: String,
    pub issue_count: usize,
    pub closed_count: usize,
    pub progress: f64,
    pub overlap_count: usize,
}

impl LensItem {
    #[must_use]
    pub fn lens(&self) -> LensKind {
        match self.kind {
            LensItemKind::Label => LensKind::Label(self.value.clone()),
            LensItemKind::Epic => LensKind::Epic(self.value.clone()),
            LensItemKind::Bead => LensKind::Bead(self.value.clone()),
        }
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.title, self.value)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(closed: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { closed as f64 / total as f64 }
}

/// Which item kinds the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Epics and labels; beads join once a query is typed.
    #[default]
    Merged,
    Epic,
    Label,
    Bead,
}

impl SearchMode {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Merged => Self::Epic,
            Self::Epic => Self::Label,
            Self::Label => Self::Bead,
            Self::Bead => Self::Merged,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Epic => "epic",
            Self::Label => "label",
            Self::Bead => "bead",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merged" | "all" => Ok(Self::Merged),
            "epic" | "epics" => Ok(Self::Epic),
            "label" | "labels" => Ok(Self::Label),
            "bead" | "beads" => Ok(Self::Bead),
            other => Err(Error::InvalidArgument(format!("unknown search mode: {other}"))),
        }
    }
}

/// What a confirmed selection resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LensSelection {
    pub lens: LensKind,
    pub scope_labels: Vec<String>,
    pub scope_mode: ScopeMode,
}

// =============================================================================
// Selector
// =============================================================================

/// Picker state over one catalog.
pub struct LensSelector<'c> {
    catalog: &'c Catalog,
    index: &'c CatalogIndex,
    labels: Vec<LensItem>,
    epics: Vec<LensItem>,
    beads: Vec<LensItem>,
    filtered: Vec<LensItem>,
    query: String,
    mode: SearchMode,
    scope: Scope,
    default_scope_mode: ScopeMode,
    scope_add_mode: bool,
    selected: usize,
    confirmed: Option<LensSelection>,
}

impl<'c> LensSelector<'c> {
    #[must_use]
    pub fn new(catalog: &'c Catalog, index: &'c CatalogIndex) -> Self {
        Self::with_scope_mode(catalog, index, ScopeMode::default())
    }

    #[must_use]
    pub fn with_scope_mode(catalog: &'c Catalog, index: &'c CatalogIndex, scope_mode: ScopeMode) -> Self {
        let mut epics = Vec::new();
        let mut beads = Vec::with_capacity(catalog.len());
        let mut label_counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, issue) in catalog.issues().iter().enumerate() {
            if issue.issue_type == IssueType::Epic && !issue.is_closed() {
                let descendants = descendants(index, idx);
                let closed = descendants.iter().filter(|&&d| !index.is_open(d)).count();
                epics.push(LensItem {
                    kind: LensItemKind::Epic,
                    value: issue.id.clone(),
                    title: issue.title.clone(),
                    issue_count: descendants.len(),
                    closed_count: closed,
                    progress: ratio(closed, descendants.len()),
                    overlap_count: 0,
                });
            }
            beads.push(LensItem {
                kind: LensItemKind::Bead,
                value: issue.id.clone(),
                title: issue.title.clone(),
                issue_count: 1,
                closed_count: usize::from(issue.is_closed()),
                progress: 0.0,
                overlap_count: 0,
            });
            for label in &issue.labels {
                let entry = label_counts.entry(label.as_str()).or_default();
                entry.0 += 1;
                if issue.is_closed() {
                    entry.1 += 1;
                }
            }
        }

        let mut labels: Vec<LensItem> = label_counts
            .into_iter()
            .map(|(name, (total, closed))| LensItem {
                kind: LensItemKind::Label,
                value: name.to_string(),
                title: name.to_string(),
                issue_count: total,
                closed_count: closed,
                progress: ratio(closed, total),
                overlap_count: 0,
            })
            .collect();
        labels.sort_by(|a, b| a.value.cmp(&b.value));
        epics.sort_by(|a, b| {
            a.progress
                .total_cmp(&b.progress)
                .then_with(|| a.title.cmp(&b.title))
        });
        beads.sort_by(|a, b| compare_hierarchical_ids(&a.value, &b.value));

        let mut selector = Self {
            catalog,
            index,
            labels,
            epics,
            beads,
            filtered: Vec::new(),
            query: String::new(),
            mode: SearchMode::Merged,
            scope: Scope::new(scope_mode),
            default_scope_mode: scope_mode,
            scope_add_mode: false,
            selected: 0,
            confirmed: None,
        };
        selector.refilter();
        selector
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn items(&self) -> &[LensItem] {
        &self.filtered
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&LensItem> {
        self.filtered.get(self.selected)
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn mode(&self) -> SearchMode {
        self.mode
    }

    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub const fn is_scope_add_mode(&self) -> bool {
        self.scope_add_mode
    }

    #[must_use]
    pub const fn confirmed(&self) -> Option<&LensSelection> {
        self.confirmed.as_ref()
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Replace the query and re-filter. The selection returns to the top.
    pub fn set_query(&mut self, query: &str) {
        query.clone_into(&mut self.query);
        self.refilter();
    }

    /// Merged → epic → label → bead → merged, keeping the query.
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.refilter();
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
        self.refilter();
    }

    /// While on, the query searches labels only, for adding to scope.
    pub fn set_scope_add_mode(&mut self, on: bool) {
        self.scope_add_mode = on;
        self.refilter();
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    pub fn jump_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn jump_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.filtered.len().saturating_sub(1));
    }

    // -------------------------------------------------------------------------
    // Scope
    // -------------------------------------------------------------------------

    /// Add `label` to scope if missing. The query is kept.
    pub fn add_scope(&mut self, label: &str) {
        self.scope.add(label.to_string());
        self.scope_add_mode = false;
        self.refilter();
    }

    /// Add or remove `label`. Clears the query.
    pub fn toggle_scope(&mut self, label: &str) {
        if !self.scope.remove(label) {
            self.scope.add(label.to_string());
        }
        self.query.clear();
        self.refilter();
    }

    pub fn toggle_scope_mode(&mut self) {
        self.scope.set_mode(self.scope.mode().toggled());
        self.refilter();
    }

    /// Drop every scope label and restore the default scope mode.
    pub fn clear_scope(&mut self) {
        self.scope = Scope::new(self.default_scope_mode);
        self.query.clear();
        self.refilter();
    }

    /// Labels co-occurring with `label`, most frequent first.
    #[must_use]
    pub fn related_labels(&self, label: &str, limit: usize) -> Vec<LabelCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for issue in self.catalog.issues().iter().filter(|i| i.has_label(label)) {
            for other in issue.labels.iter().filter(|l| l.as_str() != label) {
                *counts.entry(other.as_str()).or_default() += 1;
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
        if limit > 0 {
            out.truncate(limit);
        }
        out
    }

    // -------------------------------------------------------------------------
    // Result
    // -------------------------------------------------------------------------

    /// Confirm the highlighted item. `None` when the list is empty.
    pub fn confirm(&mut self) -> Option<&LensSelection> {
        let item = self.filtered.get(self.selected)?;
        self.confirmed = Some(LensSelection {
            lens: item.lens(),
            scope_labels: self.scope.labels().to_vec(),
            scope_mode: self.scope.mode(),
        });
        self.confirmed.as_ref()
    }

    /// Back to the initial state: no query, merged mode, empty scope.
    pub fn reset(&mut self) {
        self.confirmed = None;
        self.scope = Scope::new(self.default_scope_mode);
        self.query.clear();
        self.mode = SearchMode::Merged;
        self.scope_add_mode = false;
        self.refilter();
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    fn refilter(&mut self) {
        let query = self.query.trim();
        let source: Vec<LensItem> = if self.scope_add_mode {
            self.labels.clone()
        } else if !self.scope.is_empty() {
            let mut scoped = self.scoped_items();
            if query.is_empty() && matches!(self.mode, SearchMode::Label | SearchMode::Merged) {
                scoped.sort_by(|a, b| b.overlap_count.cmp(&a.overlap_count));
            }
            scoped
        } else {
            self.unscoped_items(!query.is_empty())
        };

        self.filtered = if query.is_empty() {
            source
        } else {
            let texts: Vec<String> = source.iter().map(LensItem::search_text).collect();
            fuzzy::find(query, &texts)
                .into_iter()
                .map(|m| source[m.index].clone())
                .collect()
        };
        self.selected = 0;
    }

    fn unscoped_items(&self, searching: bool) -> Vec<LensItem> {
        match self.mode {
            SearchMode::Epic => self.epics.clone(),
            SearchMode::Label => self.labels.clone(),
            SearchMode::Bead => self.beads.clone(),
            SearchMode::Merged => {
                let mut items = self.epics.clone();
                items.extend(self.labels.iter().cloned());
                if searching {
                    items.extend(self.beads.iter().cloned());
                }
                items
            }
        }
    }

    /// Items relevant to the scope, annotated with overlap counts.
    fn scoped_items(&self) -> Vec<LensItem> {
        let matching = self.scope.matching_set(self.catalog);
        let mut label_overlap: HashMap<&str, usize> = HashMap::new();
        for &idx in &matching {
            for label in &self.catalog.issue(idx).labels {
                if !self.scope.contains(label) {
                    *label_overlap.entry(label.as_str()).or_default() += 1;
                }
            }
        }
        let with_overlap = |item: &LensItem, overlap: usize| LensItem {
            overlap_count: overlap,
            ..item.clone()
        };

        let beads = || {
            self.beads.iter().filter_map(|item| {
                let idx = self.catalog.index_of(&item.value)?;
                matching.contains(&idx).then(|| with_overlap(item, 1))
            })
        };
        let epics = || {
            self.epics.iter().filter_map(|item| {
                let idx = self.catalog.index_of(&item.value)?;
                let overlap = descendants(self.index, idx)
                    .iter()
                    .filter(|d| matching.contains(d))
                    .count();
                (overlap > 0).then(|| with_overlap(item, overlap))
            })
        };
        let labels = || {
            self.labels.iter().filter_map(|item| {
                let overlap = label_overlap.get(item.value.as_str()).copied().unwrap_or(0);
                (overlap > 0 && !self.scope.contains(&item.value)).then(|| with_overlap(item, overlap))
            })
        };

        match self.mode {
            SearchMode::Bead => beads().collect(),
            SearchMode::Epic => epics().collect(),
            SearchMode::Label => labels().collect(),
            SearchMode::Merged => beads().chain(epics()).chain(labels()).collect(),
        }
    }
}

/// Every parent-child descendant of `root`, breadth first.
fn descendants(index: &CatalogIndex, root: IssueIdx) -> Vec<IssueIdx> {
    let mut seen = IssueSet::from([root]);
    let mut out = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(current) = queue.pop_front() {
        for &child in index.children(current) {
            if seen.insert(child) {
                out.push(child);
                queue.push_back(child);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, Status};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("bd-10", "Payments epic").with_type(IssueType::Epic),
            Issue::new("bd-2", "Card form").with_labels(["ui", "payments"]).child_of("bd-10"),
            Issue::new("bd-3", "Ledger").with_labels(["backend", "payments"]).child_of("bd-10").with_status(Status::Closed),
            Issue::new("bd-1", "Login page").with_labels(["ui"]),
            Issue::new("bd-4", "Old epic").with_type(IssueType::Epic).with_status(Status::Closed),
        ])
    }

    fn values(selector: &LensSelector<'_>) -> Vec<String> {
        selector.items().iter().map(|i| i.value.clone()).collect()
    }

    #[test]
    fn merged_mode_lists_open_epics_then_labels() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let selector = LensSelector::new(&catalog, &index);
        assert_eq!(values(&selector), vec!["bd-10", "backend", "payments", "ui"]);
        let epic = &selector.items()[0];
        assert_eq!(epic.issue_count, 2);
        assert_eq!(epic.closed_count, 1);
    }

    #[test]
    fn bead_mode_sorts_ids_naturally() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let mut selector = LensSelector::new(&catalog, &index);
        selector.set_mode(SearchMode::Bead);
        assert_eq!(values(&selector), vec!["bd-1", "bd-2", "bd-3", "bd-4", "bd-10"]);
    }

    #[test]
    fn query_includes_beads_in_merged_mode() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let mut selector = LensSelector::new(&catalog, &index);
        selector.set_query("login");
        assert_eq!(values(&selector), vec!["bd-1"]);
        selector.set_query("");
        assert_eq!(selector.items().len(), 4);
    }

    #[test]
    fn scope_narrows_and_counts_overlap() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let mut selector = LensSelector::new(&catalog, &index);
        selector.set_mode(SearchMode::Label);
        selector.toggle_scope("payments");
        let rows: Vec<(String, usize)> = selector
            .items()
            .iter()
            .map(|i| (i.value.clone(), i.overlap_count))
            .collect();
        assert_eq!(rows, vec![("backend".to_string(), 1), ("ui".to_string(), 1)]);

        selector.set_mode(SearchMode::Epic);
        assert_eq!(selector.items()[0].overlap_count, 2);

        selector.toggle_scope("payments");
        assert!(selector.scope().is_empty());
    }

    #[test]
    fn confirm_carries_scope() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let mut selector = LensSelector::new(&catalog, &index);
        selector.add_scope("ui");
        selector.set_mode(SearchMode::Bead);
        let picked = selector.confirm().cloned();
        let picked = picked.unwrap_or_else(|| panic!("non-empty list"));
        assert_eq!(picked.lens, LensKind::Bead("bd-1".into()));
        assert_eq!(picked.scope_labels, vec!["ui".to_string()]);
        selector.reset();
        assert!(selector.confirmed().is_none());
        assert_eq!(selector.mode(), SearchMode::Merged);
    }

    #[test]
    fn related_labels_by_cooccurrence() {
        let catalog = catalog();
        let index = CatalogIndex::build(&catalog);
        let selector = LensSelector::new(&catalog, &index);
        let related = selector.related_labels("payments", 0);
        let names: Vec<&str> = related.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(names, vec!["backend", "ui"]);
    }
}
