//! The dashboard value: one lens over a borrowed catalog plus view state.
//!
//! Every intent is a synchronous method that mutates the view state and
//! returns nothing. Derived structures (tree rows, workstreams, grouped
//! sections) are rebuilt wholesale whenever depth, scope or the centered
//! flag changes.

use lens_dashboard_core::{
    Catalog, CatalogIndex, CentralityRank, CentralityTable, ComponentPartitioner, DashboardConfig,
    DepthOption, FlatNode, GroupByMode, IssueIdx, IssueSet, LensDescriptor, LensKind,
    PartitionInput, Partitioner, PrimaryTable, Scope, ScopeMode, TreeBuilder, TreeStats, ViewMode,
    build_ego_layout, flatten,
};

use crate::grouped::GroupedState;
use crate::search::FuzzySearch;
use crate::viewport::Viewport;
use crate::workstreams::WorkstreamState;

/// Interactive view over one lens.
pub struct LensDashboard<'c> {
    pub(crate) catalog: &'c Catalog,
    pub(crate) index: CatalogIndex,
    pub(crate) config: DashboardConfig,
    pub(crate) lens: LensDescriptor,
    pub(crate) primaries: PrimaryTable,
    pub(crate) scope: Scope,
    pub(crate) depth: DepthOption,
    pub(crate) centered: bool,
    pub(crate) view: ViewMode,
    pub(crate) group_by: GroupByMode,
    pub(crate) width: u16,
    pub(crate) height: u16,

    /// Flat rows, or the downstream section when centered.
    pub(crate) flat: Vec<FlatNode>,
    pub(crate) upstream: Vec<FlatNode>,
    pub(crate) ego: Option<FlatNode>,
    pub(crate) stats: TreeStats,
    pub(crate) cursor: usize,
    pub(crate) scroll: usize,
    pub(crate) selected: String,

    pub(crate) ws: WorkstreamState,
    pub(crate) grouped: GroupedState,
    pub(crate) search: Option<FuzzySearch>,
    pub(crate) scope_input: Option<String>,
    pub(crate) centrality: CentralityTable,
    partitioner: Box<dyn Partitioner>,
}

impl std::fmt::Debug for LensDashboard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LensDashboard")
            .field("lens", self.lens.kind())
            .field("depth", &self.depth)
            .field("view", &self.view)
            .field("centered", &self.centered)
            .field("rows", &self.row_count())
            .field("cursor", &self.cursor)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl<'c> LensDashboard<'c> {
    /// Open `lens` over `catalog` with the defaults from `config`.
    #[must_use]
    pub fn new(catalog: &'c Catalog, lens: LensKind, config: &DashboardConfig) -> Self {
        let index = CatalogIndex::build(catalog);
        let descriptor = LensDescriptor::build(lens, catalog, &index);
        let scope = Scope::new(config.default_scope_mode).with_labels(config.default_scope.iter().cloned());
        let primaries = descriptor.materialize(catalog, &index, &scope);
        let mut dashboard = Self {
            catalog,
            index,
            config: config.clone(),
            lens: descriptor,
            primaries,
            scope,
            depth: config.default_depth,
            centered: config.centered_by_default,
            view: ViewMode::Flat,
            group_by: config.default_group_by,
            width: config.width,
            height: config.height,
            flat: Vec::new(),
            upstream: Vec::new(),
            ego: None,
            stats: TreeStats::default(),
            cursor: 0,
            scroll: 0,
            selected: String::new(),
            ws: WorkstreamState::default(),
            grouped: GroupedState::default(),
            search: None,
            scope_input: None,
            centrality: CentralityTable::new(),
            partitioner: Box::new(ComponentPartitioner),
        };
        dashboard.rebuild();
        match config.default_view {
            ViewMode::Flat => {}
            ViewMode::Workstream => dashboard.toggle_view_type(),
            ViewMode::Grouped => dashboard.enter_grouped_view(),
        }
        dashboard
    }

    /// Attach centrality scores shown for the selected issue.
    #[must_use]
    pub fn with_centrality(mut self, table: CentralityTable) -> Self {
        self.centrality = table;
        self
    }

    /// Replace the workstream partitioner and recompute workstreams.
    #[must_use]
    pub fn with_partitioner(mut self, partitioner: Box<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self.recompute_workstreams();
        self.refresh_selection();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    #[must_use]
    pub const fn index(&self) -> &CatalogIndex {
        &self.index
    }

    #[must_use]
    pub const fn lens(&self) -> &LensDescriptor {
        &self.lens
    }

    /// Header title: the label, the anchor's title, or `Not Found: <id>`.
    #[must_use]
    pub fn title(&self) -> &str {
        self.lens.title()
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub const fn depth(&self) -> DepthOption {
        self.depth
    }

    #[must_use]
    pub const fn view(&self) -> ViewMode {
        self.view
    }

    #[must_use]
    pub const fn group_by(&self) -> GroupByMode {
        self.group_by
    }

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Whether the ego-centered layout is showing. Only epic and bead
    /// lenses with a known anchor can be centered.
    #[must_use]
    pub fn is_centered(&self) -> bool {
        self.centered && !self.lens.kind().is_label() && self.lens.anchor().is_some()
    }

    /// Flat rows, or the downstream section of a centered layout.
    #[must_use]
    pub fn flat_nodes(&self) -> &[FlatNode] {
        &self.flat
    }

    /// Upstream section of a centered layout.
    #[must_use]
    pub fn upstream_nodes(&self) -> &[FlatNode] {
        &self.upstream
    }

    #[must_use]
    pub const fn ego_node(&self) -> Option<&FlatNode> {
        self.ego.as_ref()
    }

    /// Rows in cursor order for the flat or centered list.
    pub fn rows(&self) -> impl Iterator<Item = &FlatNode> {
        self.upstream.iter().chain(self.ego.iter()).chain(self.flat.iter())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.upstream.len() + usize::from(self.ego.is_some()) + self.flat.len()
    }

    /// Row at a cursor position of the flat or centered list.
    #[must_use]
    pub fn row(&self, pos: usize) -> Option<&FlatNode> {
        let up = self.upstream.len();
        match &self.ego {
            Some(ego) if pos == up => Some(ego),
            Some(_) if pos > up => self.flat.get(pos - up - 1),
            Some(_) => self.upstream.get(pos),
            None => self.flat.get(pos),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Issues in the tree.
    #[must_use]
    pub const fn issue_count(&self) -> usize {
        self.stats.total
    }

    #[must_use]
    pub const fn primary_count(&self) -> usize {
        self.stats.primary
    }

    #[must_use]
    pub const fn context_count(&self) -> usize {
        self.stats.context
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    /// Id of the selected issue; empty when nothing is selected.
    #[must_use]
    pub fn selected_issue_id(&self) -> &str {
        &self.selected
    }

    /// Primary set for the current depth and scope.
    #[must_use]
    pub const fn primaries(&self) -> &IssueSet {
        self.primaries.get(self.depth)
    }

    #[must_use]
    pub fn scope_labels(&self) -> &[String] {
        self.scope.labels()
    }

    #[must_use]
    pub const fn scope_mode(&self) -> ScopeMode {
        self.scope.mode()
    }

    #[must_use]
    pub fn has_scope(&self) -> bool {
        !self.scope.is_empty()
    }

    #[must_use]
    pub const fn centrality(&self) -> &CentralityTable {
        &self.centrality
    }

    /// Centrality rank of the selected issue, when scored.
    #[must_use]
    pub fn selected_centrality(&self) -> Option<CentralityRank> {
        if self.selected.is_empty() {
            return None;
        }
        self.centrality.rank(&self.selected)
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::compute(self.height, self.has_scope(), self.scope_input.is_some())
    }

    /// Issues visible in the flat or centered list, in display order.
    #[must_use]
    pub fn visible_issues(&self) -> Vec<IssueIdx> {
        let mut seen = vec![false; self.catalog.len()];
        let mut out = Vec::with_capacity(self.row_count());
        for node in self.rows() {
            let idx = node.issue();
            if !seen[idx] {
                seen[idx] = true;
                out.push(idx);
            }
        }
        out
    }

    // =========================================================================
    // Depth, centering, size
    // =========================================================================

    /// 1 → 2 → 3 → All → 1.
    pub fn cycle_depth(&mut self) {
        self.depth = self.depth.next();
        self.rebuild();
    }

    pub fn set_depth(&mut self, depth: DepthOption) {
        self.depth = depth;
        self.rebuild();
    }

    /// Switch between the centered and tree layouts. Label lenses ignore it.
    /// The centered layout opens with the cursor on the ego.
    pub fn toggle_centered_mode(&mut self) {
        if self.lens.kind().is_label() {
            return;
        }
        self.centered = !self.centered;
        self.cursor = 0;
        self.scroll = 0;
        self.rebuild();
        if self.ego.is_some() {
            self.cursor = self.upstream.len();
            self.refresh_selection();
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.refresh_scroll();
    }

    // =========================================================================
    // Scope
    // =========================================================================

    /// Add a scope label; a label already in scope is ignored.
    pub fn add_scope_label(&mut self, label: &str) {
        if self.scope.add(label.to_string()) {
            self.rebuild_with_scope();
        }
    }

    pub fn remove_scope_label(&mut self, label: &str) {
        if self.scope.remove(label) {
            self.rebuild_with_scope();
        }
    }

    /// Drop the most recently added label. `false` when the scope is empty.
    pub fn remove_last_scope_label(&mut self) -> bool {
        if self.scope.remove_last().is_some() {
            self.rebuild_with_scope();
            true
        } else {
            false
        }
    }

    pub fn clear_scope(&mut self) {
        if !self.scope.is_empty() {
            self.scope.clear();
            self.rebuild_with_scope();
        }
    }

    /// Union ↔ intersection. Rebuilds only when a scope is active.
    pub fn toggle_scope_mode(&mut self) {
        self.scope.set_mode(self.scope.mode().toggled());
        if !self.scope.is_empty() {
            self.rebuild_with_scope();
        }
    }

    /// Labels offered for extending the scope: every label when the scope
    /// is empty, otherwise labels co-occurring on matching issues.
    #[must_use]
    pub fn available_scope_labels(&self) -> Vec<String> {
        self.scope
            .available_labels(self.catalog)
            .into_iter()
            .map(|c| c.label)
            .collect()
    }

    fn rebuild_with_scope(&mut self) {
        self.primaries = self.lens.materialize(self.catalog, &self.index, &self.scope);
        tracing::debug!(
            labels = ?self.scope.labels(),
            mode = %self.scope.mode(),
            "scope changed"
        );
        self.rebuild();
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Rebuild rows, workstreams and grouped sections from the current
    /// depth, scope and centering.
    pub(crate) fn rebuild(&mut self) {
        if let Some(search) = self.search.take() {
            // A rebuild invalidates the search snapshot.
            self.cursor = search.saved_cursor;
        }
        let primaries = self.primaries.get(self.depth);
        let unbounded = self.config.unbounded_depth;

        match (self.is_centered(), self.lens.anchor()) {
            (true, Some(anchor)) => {
                let layout = build_ego_layout(
                    self.catalog,
                    &self.index,
                    primaries,
                    anchor,
                    self.depth.max_depth(unbounded),
                );
                self.upstream = layout.upstream;
                self.ego = Some(layout.ego);
                self.flat = layout.downstream;
                self.stats = layout.stats;
                if self.cursor >= self.row_count() {
                    self.cursor = self.upstream.len();
                }
            }
            _ => {
                let forest = TreeBuilder::new(self.catalog, &self.index, primaries)
                    .with_anchor(self.lens.anchor())
                    .with_depth(self.depth, unbounded)
                    .build();
                self.stats = TreeStats::from_forest(&forest, &self.index);
                self.flat = flatten(&forest, self.catalog, &self.index, &[]);
                self.upstream.clear();
                self.ego = None;
                let rows = self.row_count();
                if self.cursor >= rows {
                    self.cursor = rows.saturating_sub(1);
                }
            }
        }
        self.selected = self.row(self.cursor).map(|n| n.id.clone()).unwrap_or_default();

        tracing::debug!(
            lens = %self.lens.kind(),
            depth = %self.depth,
            centered = self.is_centered(),
            rows = self.row_count(),
            primary = self.stats.primary,
            context = self.stats.context,
            "rebuilt dashboard"
        );

        self.recompute_workstreams();
        if self.view == ViewMode::Grouped {
            self.rebuild_grouped_sections();
        }
        self.refresh_selection();
    }

    /// Partition the visible issues into workstreams.
    pub(crate) fn recompute_workstreams(&mut self) {
        let visible = self.visible_issues();
        let lens_label = match self.lens.kind() {
            LensKind::Label(name) => Some(name.as_str()),
            _ => None,
        };
        let pin_first = match self.lens.kind() {
            LensKind::Epic(_) => self.lens.anchor(),
            _ => None,
        };
        let input = PartitionInput {
            catalog: self.catalog,
            index: &self.index,
            visible: &visible,
            primaries: self.primaries.get(self.depth),
            lens_label,
            pin_first,
        };
        let list = self.partitioner.partition(&input);
        self.set_workstreams(list);
    }

    /// Re-derive the selection from whichever cursor the view uses.
    pub(crate) fn refresh_selection(&mut self) {
        if self.grouped_active() {
            self.update_selected_from_grouped();
            self.ensure_grouped_visible();
        } else if self.ws_active() {
            self.update_selected_from_ws();
        } else {
            self.selected = self.row(self.cursor).map(|n| n.id.clone()).unwrap_or_default();
            self.ensure_visible();
        }
    }

    pub(crate) fn refresh_scroll(&mut self) {
        if self.grouped_active() {
            self.ensure_grouped_visible();
        } else if self.ws_active() {
            self.ensure_visible_ws();
        } else {
            self.ensure_visible();
        }
    }

    // =========================================================================
    // View modes
    // =========================================================================

    /// Flat → workstream, grouped → workstream, workstream → flat. Entering
    /// the workstream view puts the cursor on the first header.
    pub fn toggle_view_type(&mut self) {
        match self.view {
            ViewMode::Flat | ViewMode::Grouped => {
                self.view = ViewMode::Workstream;
                self.ws.cursor = 0;
                self.ws.issue = None;
            }
            ViewMode::Workstream => self.view = ViewMode::Flat,
        }
        self.refresh_selection();
    }

    pub fn enter_grouped_view(&mut self) {
        self.view = ViewMode::Grouped;
        self.rebuild_grouped_sections();
        self.grouped.reset_cursor();
        self.refresh_selection();
    }

    pub fn exit_grouped_view(&mut self) {
        if self.view == ViewMode::Grouped {
            self.view = ViewMode::Flat;
            self.refresh_selection();
        }
    }

    /// Label → priority → status → label.
    pub fn cycle_group_by_mode(&mut self) {
        self.group_by = self.group_by.next();
        self.grouped = GroupedState::default();
        self.rebuild_grouped_sections();
        if self.view == ViewMode::Grouped {
            self.refresh_selection();
        }
    }

    /// Primary issues that are visible, the input to grouping.
    pub(crate) fn visible_primaries(&self) -> IssueSet {
        let primaries = self.primaries.get(self.depth);
        self.visible_issues()
            .into_iter()
            .filter(|idx| primaries.contains(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_dashboard_core::{Issue, Status};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("p", "Parent").with_labels(["x"]),
            Issue::new("c", "Child").child_of("p"),
            Issue::new("b", "Blocker").with_status(Status::InProgress),
            Issue::new("q", "Other").with_labels(["x"]).blocked_by("b"),
        ])
    }

    #[test]
    fn label_lens_opens_flat() {
        let catalog = catalog();
        let dash = LensDashboard::new(&catalog, LensKind::Label("x".into()), &DashboardConfig::default());
        assert_eq!(dash.view(), ViewMode::Flat);
        assert_eq!(dash.depth(), DepthOption::Two);
        assert_eq!(dash.issue_count(), 4);
        assert_eq!(dash.primary_count(), 3);
        assert_eq!(dash.context_count(), 1);
        assert_eq!(dash.selected_issue_id(), dash.flat_nodes()[0].id);
    }

    #[test]
    fn missing_anchor_is_degenerate() {
        let catalog = catalog();
        let mut dash = LensDashboard::new(&catalog, LensKind::Bead("nope".into()), &DashboardConfig::default());
        assert_eq!(dash.title(), "Not Found: nope");
        assert_eq!(dash.row_count(), 0);
        assert!(!dash.is_centered());
        dash.move_down();
        dash.go_to_bottom();
        assert_eq!(dash.selected_issue_id(), "");
        assert_eq!(dash.cursor(), 0);
    }

    #[test]
    fn centered_toggle_only_for_anchored_lenses() {
        let catalog = catalog();
        let mut dash = LensDashboard::new(&catalog, LensKind::Label("x".into()), &DashboardConfig::default());
        dash.toggle_centered_mode();
        assert!(!dash.is_centered());

        let mut dash = LensDashboard::new(&catalog, LensKind::Epic("p".into()), &DashboardConfig::default());
        assert!(dash.is_centered());
        dash.toggle_centered_mode();
        assert!(!dash.is_centered());
        assert_eq!(dash.rows().next().map(|n| n.id.as_str()), Some("p"));
    }

    #[test]
    fn centering_lands_on_the_ego() {
        let catalog = catalog();
        let config = DashboardConfig {
            centered_by_default: false,
            ..DashboardConfig::default()
        };
        let mut dash = LensDashboard::new(&catalog, LensKind::Bead("q".into()), &config);
        dash.toggle_centered_mode();
        assert!(dash.is_centered());
        assert_eq!(dash.upstream_nodes().len(), 1);
        assert_eq!(dash.cursor(), 1);
        assert_eq!(dash.selected_issue_id(), "q");
    }

    #[test]
    fn default_view_and_scope_from_config() {
        let catalog = catalog();
        let config = DashboardConfig {
            default_view: ViewMode::Grouped,
            default_scope: vec!["x".into()],
            ..DashboardConfig::default()
        };
        let dash = LensDashboard::new(&catalog, LensKind::Label("x".into()), &config);
        assert_eq!(dash.view(), ViewMode::Grouped);
        assert_eq!(dash.scope_labels(), ["x".to_string()]);
    }

    #[test]
    fn centrality_of_selection() {
        use lens_dashboard_core::Centrality;
        let catalog = catalog();
        let table: CentralityTable = [
            ("p", Centrality { pagerank: 0.4, betweenness: 1.0 }),
            ("q", Centrality { pagerank: 0.6, betweenness: 0.0 }),
        ]
        .into_iter()
        .collect();
        let dash = LensDashboard::new(&catalog, LensKind::Epic("p".into()), &DashboardConfig::default())
            .with_centrality(table);
        assert_eq!(dash.selected_issue_id(), "p");
        let rank = dash.selected_centrality().unwrap_or_else(|| panic!("p is scored"));
        assert_eq!(rank.pagerank_rank, 2);
        assert_eq!(rank.betweenness_rank, 1);
    }
}
