//! Cursor motion dispatch and flat / centered scrolling.
//!
//! Every motion intent routes to the grouped view, then the workstream
//! view, then the flat or centered list, whichever is active. Motions over
//! an empty list are no-ops.

use lens_dashboard_core::EffectiveStatus;

use crate::dashboard::LensDashboard;
use crate::viewport::{
    FLAT_MIN_LIST_LINES, GROUPED_MIN_LIST_LINES, WS_MIN_LIST_LINES, max_scroll, page_size, scroll_for,
};

impl LensDashboard<'_> {
    pub fn move_up(&mut self) {
        tracing::trace!(cursor = self.cursor, "move up");
        if self.grouped_active() {
            self.move_up_grouped();
        } else if self.ws_active() {
            self.move_up_ws();
        } else if self.cursor > 0 {
            self.cursor -= 1;
            self.sync_flat();
        }
    }

    pub fn move_down(&mut self) {
        tracing::trace!(cursor = self.cursor, "move down");
        if self.grouped_active() {
            self.move_down_grouped();
        } else if self.ws_active() {
            self.move_down_ws();
        } else if self.cursor + 1 < self.row_count() {
            self.cursor += 1;
            self.sync_flat();
        }
    }

    /// Half a screen down.
    pub fn page_down(&mut self) {
        if self.grouped_active() {
            self.page_grouped(true);
        } else if self.ws_active() {
            self.page_ws(true);
        } else if self.row_count() > 0 {
            self.cursor = (self.cursor + page_size(self.height)).min(self.row_count() - 1);
            self.sync_flat();
        }
    }

    pub fn page_up(&mut self) {
        if self.grouped_active() {
            self.page_grouped(false);
        } else if self.ws_active() {
            self.page_ws(false);
        } else if self.row_count() > 0 {
            self.cursor = self.cursor.saturating_sub(page_size(self.height));
            self.sync_flat();
        }
    }

    pub fn go_to_top(&mut self) {
        if self.grouped_active() {
            self.grouped_top();
        } else if self.ws_active() {
            self.ws_top();
        } else if self.row_count() > 0 {
            self.cursor = 0;
            self.scroll = 0;
            self.sync_flat();
        }
    }

    pub fn go_to_bottom(&mut self) {
        if self.grouped_active() {
            self.grouped_bottom();
        } else if self.ws_active() {
            self.ws_bottom();
        } else if self.row_count() > 0 {
            self.cursor = self.row_count() - 1;
            self.sync_flat();
        }
    }

    /// Jump to the first row of the next status run.
    pub fn next_section(&mut self) {
        if self.grouped_active() || self.ws_active() {
            return;
        }
        let Some(current) = self.row(self.cursor).map(|n| n.status) else {
            return;
        };
        let next = (self.cursor + 1..self.row_count())
            .find(|&pos| self.row(pos).is_some_and(|n| n.status != current));
        if let Some(pos) = next {
            self.cursor = pos;
            self.sync_flat();
        }
    }

    /// Jump to the start of the current status run, or, when already
    /// there, to the last row of the previous run.
    pub fn prev_section(&mut self) {
        if self.grouped_active() || self.ws_active() {
            return;
        }
        let Some(current) = self.row(self.cursor).map(|n| n.status) else {
            return;
        };
        let mut start = self.cursor;
        while start > 0 && self.row(start - 1).is_some_and(|n| n.status == current) {
            start -= 1;
        }
        self.cursor = if self.cursor == start && start > 0 { start - 1 } else { start };
        self.sync_flat();
    }

    fn sync_flat(&mut self) {
        self.selected = self.row(self.cursor).map(|n| n.id.clone()).unwrap_or_default();
        self.ensure_visible();
    }

    // =========================================================================
    // Scroll
    // =========================================================================

    /// Re-center the flat or centered list on the cursor.
    pub(crate) fn ensure_visible(&mut self) {
        let list = self.viewport().list_lines(FLAT_MIN_LIST_LINES);
        self.scroll = if self.ego.is_some() {
            scroll_for(self.cursor, self.row_count(), list)
        } else if self.flat.is_empty() {
            0
        } else {
            scroll_for(self.flat_line_position(self.cursor), self.total_flat_lines(), list)
        };
    }

    /// Screen line of flat row `idx`, counting a header line before every
    /// status change.
    #[must_use]
    pub fn flat_line_position(&self, idx: usize) -> usize {
        if self.flat.is_empty() {
            return 0;
        }
        let idx = idx.min(self.flat.len() - 1);
        let mut line = 0;
        let mut last: Option<EffectiveStatus> = None;
        for (i, node) in self.flat[..=idx].iter().enumerate() {
            if last != Some(node.status) {
                line += 1;
                last = Some(node.status);
            }
            if i < idx {
                line += 1;
            }
        }
        line
    }

    /// Flat rows plus one header line per status run.
    #[must_use]
    pub fn total_flat_lines(&self) -> usize {
        let runs = self
            .flat
            .iter()
            .zip(self.flat.iter().skip(1))
            .filter(|(a, b)| a.status != b.status)
            .count();
        if self.flat.is_empty() { 0 } else { self.flat.len() + runs + 1 }
    }

    /// Scroll offset of whichever view is active.
    #[must_use]
    pub fn active_scroll(&self) -> usize {
        if self.grouped_active() {
            self.grouped_scroll()
        } else if self.ws_active() {
            self.ws_scroll()
        } else {
            self.scroll
        }
    }

    /// Upper bound on [`Self::active_scroll`] for the current layout.
    #[must_use]
    pub fn max_active_scroll(&self) -> usize {
        let vp = self.viewport();
        if self.grouped_active() {
            max_scroll(self.grouped_lines(), vp.list_lines(GROUPED_MIN_LIST_LINES))
        } else if self.ws_active() {
            max_scroll(self.total_ws_lines(), vp.list_lines(WS_MIN_LIST_LINES))
        } else if self.ego.is_some() {
            max_scroll(self.row_count(), vp.list_lines(FLAT_MIN_LIST_LINES))
        } else {
            max_scroll(self.total_flat_lines(), vp.list_lines(FLAT_MIN_LIST_LINES))
        }
    }
}

#[cfg(test)]
mod tests {
    use lens_dashboard_core::{Catalog, DashboardConfig, Issue, LensKind, Status};

    use crate::LensDashboard;

    /// Ready a, b; in-progress c; closed d, e. All labelled `x`.
    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("a", "A").with_labels(["x"]),
            Issue::new("b", "B").with_labels(["x"]),
            Issue::new("c", "C").with_labels(["x"]).with_status(Status::InProgress),
            Issue::new("d", "D").with_labels(["x"]).with_status(Status::Closed),
            Issue::new("e", "E").with_labels(["x"]).with_status(Status::Closed),
        ])
    }

    fn dashboard(catalog: &Catalog) -> LensDashboard<'_> {
        LensDashboard::new(catalog, LensKind::Label("x".into()), &DashboardConfig::default())
    }

    fn ids(dash: &LensDashboard<'_>) -> Vec<String> {
        dash.flat_nodes().iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn flat_rows_sorted_by_status() {
        let catalog = catalog();
        let dash = dashboard(&catalog);
        assert_eq!(ids(&dash), ["a", "b", "c", "d", "e"]);
        // three status runs add three header lines
        assert_eq!(dash.total_flat_lines(), 8);
        assert_eq!(dash.flat_line_position(0), 1);
        assert_eq!(dash.flat_line_position(2), 4);
        assert_eq!(dash.flat_line_position(4), 7);
    }

    #[test]
    fn section_jumps() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        dash.next_section();
        assert_eq!(dash.selected_issue_id(), "c");
        dash.next_section();
        assert_eq!(dash.selected_issue_id(), "d");
        dash.next_section();
        assert_eq!(dash.selected_issue_id(), "d");
        dash.move_down();
        dash.prev_section();
        assert_eq!(dash.selected_issue_id(), "d");
        dash.prev_section();
        assert_eq!(dash.selected_issue_id(), "c");
        dash.prev_section();
        assert_eq!(dash.selected_issue_id(), "b");
    }

    #[test]
    fn bounds_are_no_ops() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        // page size (14 - 8) / 2 = 3
        dash.set_size(80, 14);
        dash.move_up();
        assert_eq!(dash.cursor(), 0);
        dash.go_to_bottom();
        assert_eq!(dash.cursor(), 4);
        dash.move_down();
        assert_eq!(dash.cursor(), 4);
        dash.page_up();
        assert_eq!(dash.cursor(), 1);
        dash.go_to_top();
        assert_eq!((dash.cursor(), dash.scroll()), (0, 0));
    }

    #[test]
    fn scroll_follows_cursor_on_small_screens() {
        let catalog = Catalog::new(
            (0..40)
                .map(|i| Issue::new(format!("i{i:02}"), "t").with_labels(["x"]))
                .collect(),
        );
        let mut dash = dashboard(&catalog);
        dash.set_size(80, 20);
        dash.go_to_bottom();
        assert!(dash.scroll() > 0);
        assert!(dash.scroll() <= dash.max_active_scroll());
        dash.go_to_top();
        assert_eq!(dash.scroll(), 0);
    }
}
