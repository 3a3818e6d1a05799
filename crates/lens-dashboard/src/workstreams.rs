//! Workstream view: a `(workstream, issue)` cursor over the partition.
//!
//! `issue == None` means the cursor sits on the workstream header. The
//! view is only navigable with two or more workstreams; with fewer, the
//! flat list keeps the cursor.

use lens_dashboard_core::{FlatNode, ViewMode, Workstream, subdivide_all, workstream_tree};

use crate::dashboard::LensDashboard;
use crate::viewport::{WS_MIN_LIST_LINES, page_size, scroll_for};

/// Cursor, expansion and scroll state of the workstream view.
#[derive(Debug, Clone, Default)]
pub struct WorkstreamState {
    pub(crate) list: Vec<Workstream>,
    pub(crate) cursor: usize,
    pub(crate) issue: Option<usize>,
    pub(crate) expanded: Vec<bool>,
    pub(crate) sub_expanded: Vec<Vec<bool>>,
    pub(crate) tree_view: bool,
    pub(crate) subdivided: bool,
    pub(crate) scroll: usize,
}

impl WorkstreamState {
    fn is_expanded(&self, w: usize) -> bool {
        self.expanded.get(w).copied().unwrap_or(false)
    }

    fn reset_sub_expansion(&mut self) {
        self.sub_expanded = self
            .list
            .iter()
            .map(|ws| vec![false; ws.sub_workstreams.len()])
            .collect();
    }
}

impl LensDashboard<'_> {
    pub(crate) fn set_workstreams(&mut self, list: Vec<Workstream>) {
        self.ws.expanded = vec![false; list.len()];
        self.ws.list = list;
        self.ws.subdivided = false;
        self.ws.reset_sub_expansion();
        self.clamp_ws_cursor();
    }

    pub(crate) fn clamp_ws_cursor(&mut self) {
        let len = self.ws.list.len();
        if len == 0 {
            self.ws.cursor = 0;
            self.ws.issue = None;
            return;
        }
        self.ws.cursor = self.ws.cursor.min(len - 1);
        if let Some(issue) = self.ws.issue {
            let visible = self.visible_issue_count(self.ws.cursor);
            self.ws.issue = if visible == 0 { None } else { Some(issue.min(visible - 1)) };
        }
    }

    /// Workstream navigation is in effect.
    #[must_use]
    pub fn ws_active(&self) -> bool {
        self.view == ViewMode::Workstream && self.ws.list.len() > 1
    }

    #[must_use]
    pub fn workstreams(&self) -> &[Workstream] {
        &self.ws.list
    }

    /// `(workstream, issue)`; `None` for the header.
    #[must_use]
    pub const fn workstream_cursor(&self) -> (usize, Option<usize>) {
        (self.ws.cursor, self.ws.issue)
    }

    #[must_use]
    pub fn current_workstream_name(&self) -> &str {
        self.ws.list.get(self.ws.cursor).map_or("", |ws| ws.name.as_str())
    }

    #[must_use]
    pub fn is_workstream_expanded(&self, w: usize) -> bool {
        self.ws.is_expanded(w)
    }

    #[must_use]
    pub fn is_sub_workstream_expanded(&self, w: usize, s: usize) -> bool {
        self.ws
            .sub_expanded
            .get(w)
            .and_then(|subs| subs.get(s))
            .copied()
            .unwrap_or(false)
    }

    pub fn toggle_sub_workstream_expand(&mut self, w: usize, s: usize) {
        if let Some(flag) = self.ws.sub_expanded.get_mut(w).and_then(|subs| subs.get_mut(s)) {
            *flag = !*flag;
        }
    }

    #[must_use]
    pub const fn is_ws_tree_view(&self) -> bool {
        self.ws.tree_view
    }

    #[must_use]
    pub const fn is_subdivided(&self) -> bool {
        self.ws.subdivided
    }

    #[must_use]
    pub const fn ws_scroll(&self) -> usize {
        self.ws.scroll
    }

    /// Dependency-tree rows of workstream `w`.
    #[must_use]
    pub fn workstream_rows(&self, w: usize) -> Vec<FlatNode> {
        self.ws.list.get(w).map_or_else(Vec::new, |ws| {
            workstream_tree(
                ws,
                self.catalog,
                &self.index,
                self.primaries.get(self.depth),
                self.depth,
                self.config.unbounded_depth,
            )
        })
    }

    /// Issue rows the cursor can land on inside workstream `w`.
    #[must_use]
    pub fn visible_issue_count(&self, w: usize) -> usize {
        let Some(ws) = self.ws.list.get(w) else {
            return 0;
        };
        let expanded = self.ws.is_expanded(w);
        if self.ws.tree_view && expanded {
            return self.workstream_rows(w).len();
        }
        if !expanded && ws.len() > self.config.collapsed_preview {
            self.config.collapsed_preview
        } else {
            ws.len()
        }
    }

    /// The "+N more" line under a collapsed workstream.
    fn has_more_line(&self, w: usize) -> bool {
        !self.ws.is_expanded(w) && self.ws.list[w].len() > self.config.collapsed_preview
    }

    // =========================================================================
    // Selection and scroll
    // =========================================================================

    pub(crate) fn update_selected_from_ws(&mut self) {
        self.selected = self.ws_selected_id().unwrap_or_default();
        self.ensure_visible_ws();
    }

    fn ws_selected_id(&self) -> Option<String> {
        let w = self.ws.cursor;
        let ws = self.ws.list.get(w)?;
        let first = || ws.issue_ids.first().cloned();
        match self.ws.issue {
            Some(i) if self.ws.tree_view && self.ws.is_expanded(w) => {
                let rows = self.workstream_rows(w);
                rows.get(i).or_else(|| rows.last()).map(|n| n.id.clone())
            }
            Some(i) if i < self.visible_issue_count(w) => {
                ws.issue_ids.get(i).cloned().or_else(first)
            }
            _ => first(),
        }
    }

    fn ws_cursor_line(&self) -> usize {
        let mut line = 0;
        for w in 0..self.ws.list.len() {
            if w == self.ws.cursor && self.ws.issue.is_none() {
                return line;
            }
            line += 1;
            let count = self.visible_issue_count(w);
            if w == self.ws.cursor {
                if let Some(i) = self.ws.issue {
                    return line + i.min(count.saturating_sub(1));
                }
            }
            line += count;
            if self.has_more_line(w) {
                line += 1;
            }
            line += 1;
        }
        line
    }

    pub(crate) fn total_ws_lines(&self) -> usize {
        (0..self.ws.list.len())
            .map(|w| 2 + self.visible_issue_count(w) + usize::from(self.has_more_line(w)))
            .sum()
    }

    pub(crate) fn ensure_visible_ws(&mut self) {
        let list = self.viewport().list_lines(WS_MIN_LIST_LINES);
        self.ws.scroll = scroll_for(self.ws_cursor_line(), self.total_ws_lines(), list);
    }

    // =========================================================================
    // Motion
    // =========================================================================

    pub(crate) fn move_up_ws(&mut self) {
        self.step_up_ws();
        self.update_selected_from_ws();
    }

    pub(crate) fn move_down_ws(&mut self) {
        self.step_down_ws();
        self.update_selected_from_ws();
    }

    fn step_up_ws(&mut self) {
        match self.ws.issue {
            Some(i) if i > 0 => self.ws.issue = Some(i - 1),
            Some(_) => self.ws.issue = None,
            None if self.ws.cursor > 0 => {
                self.ws.cursor -= 1;
                let count = self.visible_issue_count(self.ws.cursor);
                self.ws.issue = count.checked_sub(1);
            }
            None => {}
        }
    }

    fn step_down_ws(&mut self) {
        let count = self.visible_issue_count(self.ws.cursor);
        let has_next = self.ws.cursor + 1 < self.ws.list.len();
        match self.ws.issue {
            None if count > 0 => self.ws.issue = Some(0),
            Some(i) if i + 1 < count => self.ws.issue = Some(i + 1),
            _ if has_next => {
                self.ws.cursor += 1;
                self.ws.issue = None;
            }
            _ => {}
        }
    }

    pub(crate) fn page_ws(&mut self, down: bool) {
        for _ in 0..page_size(self.height) {
            if down {
                self.step_down_ws();
            } else {
                self.step_up_ws();
            }
        }
        self.update_selected_from_ws();
    }

    pub(crate) fn ws_top(&mut self) {
        self.ws.cursor = 0;
        self.ws.issue = None;
        self.update_selected_from_ws();
    }

    pub(crate) fn ws_bottom(&mut self) {
        self.ws.cursor = self.ws.list.len().saturating_sub(1);
        self.ws.issue = self.visible_issue_count(self.ws.cursor).checked_sub(1);
        self.update_selected_from_ws();
    }

    /// Jump to the next workstream header, collapsing the current one and
    /// expanding the new one. From an issue row, go to its header first.
    pub fn next_workstream(&mut self) {
        if self.ws.list.is_empty() {
            return;
        }
        if self.ws.issue.is_some() {
            self.ws.issue = None;
        } else if self.ws.cursor + 1 < self.ws.list.len() {
            self.ws.expanded[self.ws.cursor] = false;
            self.ws.cursor += 1;
            self.ws.expanded[self.ws.cursor] = true;
        }
        self.update_selected_from_ws();
    }

    pub fn prev_workstream(&mut self) {
        if self.ws.list.is_empty() {
            return;
        }
        if self.ws.issue.is_some() {
            self.ws.issue = None;
        } else if self.ws.cursor > 0 {
            self.ws.expanded[self.ws.cursor] = false;
            self.ws.cursor -= 1;
            self.ws.expanded[self.ws.cursor] = true;
        }
        self.update_selected_from_ws();
    }

    // =========================================================================
    // Expansion, subdivision, tree view
    // =========================================================================

    /// Expand or collapse the workstream under the cursor. An issue cursor
    /// is pulled back into the rows that remain visible: the preview when
    /// collapsing, the dependency tree when expanding in tree view.
    pub fn toggle_workstream_expand(&mut self) {
        if self.ws.list.is_empty() {
            return;
        }
        let w = self.ws.cursor;
        self.ws.expanded[w] = !self.ws.expanded[w];
        self.clamp_ws_cursor();
        self.update_selected_from_ws();
    }

    pub fn expand_all_workstreams(&mut self) {
        self.ws.expanded.fill(true);
        for subs in &mut self.ws.sub_expanded {
            subs.fill(true);
        }
        self.clamp_ws_cursor();
        self.update_selected_from_ws();
    }

    /// Collapse everything and park the cursor on the current header.
    pub fn collapse_all_workstreams(&mut self) {
        self.ws.expanded.fill(false);
        for subs in &mut self.ws.sub_expanded {
            subs.fill(false);
        }
        self.ws.issue = None;
        self.update_selected_from_ws();
    }

    /// Split each workstream into label sub-workstreams, or drop the split.
    pub fn toggle_subdivision(&mut self) {
        self.ws.subdivided = !self.ws.subdivided;
        if self.ws.subdivided {
            subdivide_all(
                &mut self.ws.list,
                self.catalog,
                &self.index,
                self.primaries.get(self.depth),
                self.config.grouping_options(),
            );
        } else {
            for ws in &mut self.ws.list {
                ws.sub_workstreams.clear();
            }
        }
        self.ws.reset_sub_expansion();
        if self.ws_active() {
            self.update_selected_from_ws();
        }
        tracing::debug!(subdivided = self.ws.subdivided, "toggled workstream subdivision");
    }

    /// Show expanded workstreams as dependency trees instead of lists.
    pub fn toggle_ws_tree_view(&mut self) {
        self.ws.tree_view = !self.ws.tree_view;
        self.clamp_ws_cursor();
        if self.ws_active() {
            self.update_selected_from_ws();
        }
    }
}
