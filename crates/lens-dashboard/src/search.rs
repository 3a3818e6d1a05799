//! In-place fuzzy narrowing of the flat or centered list.
//!
//! Opening a search snapshots the rows; each keystroke re-filters the
//! snapshot over `"<id> <title>"`. Confirming restores the full list with
//! the cursor on the chosen issue; cancelling restores everything exactly.

use lens_dashboard_core::{FlatNode, fuzzy};

use crate::dashboard::LensDashboard;
use crate::keys::KeyInput;

/// Snapshot taken when a search opens.
#[derive(Debug, Clone)]
pub(crate) struct FuzzySearch {
    query: String,
    saved_flat: Vec<FlatNode>,
    saved_upstream: Vec<FlatNode>,
    pub(crate) saved_cursor: usize,
    saved_scroll: usize,
    saved_selected: String,
}

impl LensDashboard<'_> {
    /// Start a search over the flat or centered list. Ignored in the
    /// workstream and grouped views and while a search is already open.
    pub fn open_fuzzy_search(&mut self) {
        if self.search.is_some() || self.ws_active() || self.grouped_active() {
            return;
        }
        tracing::trace!(rows = self.row_count(), "open fuzzy search");
        self.search = Some(FuzzySearch {
            query: String::new(),
            saved_flat: self.flat.clone(),
            saved_upstream: self.upstream.clone(),
            saved_cursor: self.cursor,
            saved_scroll: self.scroll,
            saved_selected: self.selected.clone(),
        });
    }

    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    /// Current query; empty when no search is open.
    #[must_use]
    pub fn fuzzy_query(&self) -> &str {
        self.search.as_ref().map_or("", |s| s.query.as_str())
    }

    /// Replace the query and re-filter.
    pub fn set_fuzzy_query(&mut self, query: &str) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        query.clone_into(&mut search.query);
        self.apply_fuzzy_filter();
    }

    /// Close the search keeping the selection. Returns the selected id.
    pub fn confirm_fuzzy_search(&mut self) -> String {
        let Some(search) = self.search.take() else {
            return String::new();
        };
        let selected = std::mem::take(&mut self.selected);
        self.flat = search.saved_flat;
        self.upstream = search.saved_upstream;
        self.scroll = 0;
        let found = self.rows().position(|n| n.id == selected);
        match found {
            Some(pos) => {
                self.cursor = pos;
                self.selected = selected;
            }
            None => {
                self.cursor = 0;
                self.selected = self.row(0).map(|n| n.id.clone()).unwrap_or_default();
            }
        }
        self.ensure_visible();
        tracing::trace!(selected = %self.selected, "confirm fuzzy search");
        self.selected.clone()
    }

    /// Close the search restoring rows, cursor, scroll and selection.
    pub fn close_fuzzy_search(&mut self) {
        let Some(search) = self.search.take() else {
            return;
        };
        self.flat = search.saved_flat;
        self.upstream = search.saved_upstream;
        self.cursor = search.saved_cursor;
        self.scroll = search.saved_scroll;
        self.selected = search.saved_selected;
    }

    /// Route one key to the open search. Returns whether the key was
    /// consumed and a status message.
    pub fn handle_fuzzy_key(&mut self, key: &KeyInput) -> (bool, String) {
        if self.search.is_none() {
            return (false, String::new());
        }
        match key {
            KeyInput::Esc => {
                self.close_fuzzy_search();
                (true, "Search cancelled".into())
            }
            KeyInput::Enter => {
                if self.row_count() > 0 {
                    let id = self.confirm_fuzzy_search();
                    (true, format!("Jumped to {id}"))
                } else {
                    self.close_fuzzy_search();
                    (true, "No matches".into())
                }
            }
            KeyInput::Up | KeyInput::Char('k') | KeyInput::Ctrl('p') => {
                self.move_up();
                (true, String::new())
            }
            KeyInput::Down | KeyInput::Char('j') | KeyInput::Ctrl('n') => {
                self.move_down();
                (true, String::new())
            }
            KeyInput::Backspace | KeyInput::Ctrl('h') => {
                if let Some(search) = self.search.as_mut()
                    && search.query.pop().is_some()
                {
                    self.apply_fuzzy_filter();
                }
                (true, String::new())
            }
            KeyInput::Ctrl('u') => {
                self.set_fuzzy_query("");
                (true, String::new())
            }
            KeyInput::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
                if let Some(search) = self.search.as_mut() {
                    search.query.push(*c);
                }
                self.apply_fuzzy_filter();
                (true, String::new())
            }
            _ => (false, String::new()),
        }
    }

    fn apply_fuzzy_filter(&mut self) {
        let Some(search) = self.search.as_ref() else {
            return;
        };
        let query = search.query.trim();
        if query.is_empty() {
            self.flat = search.saved_flat.clone();
            self.upstream = search.saved_upstream.clone();
        } else {
            // The ego row is never filtered out.
            let up = search.saved_upstream.len();
            let candidates: Vec<String> = search
                .saved_upstream
                .iter()
                .chain(&search.saved_flat)
                .map(|n| format!("{} {}", n.id, self.catalog.issue(n.issue()).title))
                .collect();
            let mut upstream = Vec::new();
            let mut flat = Vec::new();
            for m in fuzzy::find(query, &candidates) {
                if m.index < up {
                    upstream.push(search.saved_upstream[m.index].clone());
                } else {
                    flat.push(search.saved_flat[m.index - up].clone());
                }
            }
            self.upstream = upstream;
            self.flat = flat;
        }
        self.cursor = 0;
        self.scroll = 0;
        self.selected = self.row(0).map(|n| n.id.clone()).unwrap_or_default();
        tracing::trace!(query = %self.fuzzy_query(), rows = self.row_count(), "fuzzy filter");
    }
}

#[cfg(test)]
mod tests {
    use lens_dashboard_core::{Catalog, DashboardConfig, Issue, LensKind};

    use crate::LensDashboard;
    use crate::keys::KeyInput;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("a-1", "Parser rewrite").with_labels(["x"]),
            Issue::new("a-2", "Lexer tokens").with_labels(["x"]),
            Issue::new("a-3", "Render pass").with_labels(["x"]),
        ])
    }

    fn dashboard(catalog: &Catalog) -> LensDashboard<'_> {
        LensDashboard::new(catalog, LensKind::Label("x".into()), &DashboardConfig::default())
    }

    fn type_str(dash: &mut LensDashboard<'_>, text: &str) {
        for c in text.chars() {
            dash.handle_fuzzy_key(&KeyInput::Char(c));
        }
    }

    #[test]
    fn filters_and_confirms() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        dash.move_down();
        dash.open_fuzzy_search();
        type_str(&mut dash, "render");
        assert_eq!(dash.row_count(), 1);
        assert_eq!(dash.selected_issue_id(), "a-3");

        let (handled, status) = dash.handle_fuzzy_key(&KeyInput::Enter);
        assert!(handled);
        assert_eq!(status, "Jumped to a-3");
        assert!(!dash.is_searching());
        assert_eq!(dash.row_count(), 3);
        assert_eq!(dash.cursor(), 2);
        assert_eq!(dash.selected_issue_id(), "a-3");
    }

    #[test]
    fn cancel_restores_snapshot() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        dash.move_down();
        dash.open_fuzzy_search();
        type_str(&mut dash, "lex");
        let (_, status) = dash.handle_fuzzy_key(&KeyInput::Esc);
        assert_eq!(status, "Search cancelled");
        assert_eq!(dash.cursor(), 1);
        assert_eq!(dash.selected_issue_id(), "a-2");
        assert_eq!(dash.row_count(), 3);
    }

    #[test]
    fn no_matches_closes() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        dash.open_fuzzy_search();
        type_str(&mut dash, "zzz");
        assert_eq!(dash.row_count(), 0);
        assert_eq!(dash.selected_issue_id(), "");
        let (_, status) = dash.handle_fuzzy_key(&KeyInput::Enter);
        assert_eq!(status, "No matches");
        assert_eq!(dash.row_count(), 3);
    }

    #[test]
    fn backspace_and_clear_widen_results() {
        let catalog = catalog();
        let mut dash = dashboard(&catalog);
        dash.open_fuzzy_search();
        type_str(&mut dash, "a-3x");
        assert_eq!(dash.row_count(), 0);
        dash.handle_fuzzy_key(&KeyInput::Backspace);
        assert_eq!(dash.fuzzy_query(), "a-3");
        assert_eq!(dash.row_count(), 1);
        dash.handle_fuzzy_key(&KeyInput::Ctrl('u'));
        assert_eq!(dash.fuzzy_query(), "");
        assert_eq!(dash.row_count(), 3);
    }

    #[test]
    fn centered_search_keeps_ego() {
        let catalog = Catalog::new(vec![
            Issue::new("u", "Upstream").with_labels(["x"]),
            Issue::new("a", "Anchor").blocked_by("u"),
            Issue::new("d", "Downstream").blocked_by("a"),
        ]);
        let mut dash = LensDashboard::new(&catalog, LensKind::Bead("a".into()), &DashboardConfig::default());
        assert!(dash.is_centered());
        dash.open_fuzzy_search();
        type_str(&mut dash, "down");
        assert!(dash.upstream_nodes().is_empty());
        assert_eq!(dash.ego_node().map(|n| n.id.as_str()), Some("a"));
        assert_eq!(dash.selected_issue_id(), "a");
        dash.move_down();
        assert_eq!(dash.selected_issue_id(), "d");
    }

    #[test]
    fn not_offered_in_workstream_view() {
        let catalog = Catalog::new(vec![
            Issue::new("a", "A").with_labels(["x"]),
            Issue::new("b", "B").with_labels(["x"]).child_of("a"),
            Issue::new("c", "C").with_labels(["x"]),
            Issue::new("d", "D").with_labels(["x"]).child_of("c"),
        ]);
        let mut dash = dashboard(&catalog);
        dash.toggle_view_type();
        dash.open_fuzzy_search();
        assert!(!dash.is_searching());
    }
}
