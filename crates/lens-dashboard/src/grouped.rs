//! Grouped view: a `(group, sub-group, issue)` cursor over label, priority
//! or status sections.
//!
//! `sub == None` addresses the group itself; `issue == None` addresses a
//! group or sub-group header. Header rows select nothing.

use std::collections::HashMap;

use lens_dashboard_core::{GroupedSection, Grouper, ViewMode};

use crate::dashboard::LensDashboard;
use crate::viewport::{GROUPED_MIN_LIST_LINES, page_size, scroll_for};

/// Cursor, expansion and scroll state of the grouped view.
#[derive(Debug, Clone, Default)]
pub struct GroupedState {
    pub(crate) sections: Vec<GroupedSection>,
    pub(crate) cursor: usize,
    pub(crate) sub: Option<usize>,
    pub(crate) issue: Option<usize>,
    pub(crate) expanded: Vec<bool>,
    pub(crate) sub_expanded: Vec<Vec<bool>>,
    pub(crate) scroll: usize,
}

impl GroupedState {
    pub(crate) const fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.sub = None;
        self.issue = None;
        self.scroll = 0;
    }

    fn is_expanded(&self, g: usize) -> bool {
        self.expanded.get(g).copied().unwrap_or(false)
    }

    fn is_sub_expanded(&self, g: usize, s: usize) -> bool {
        self.sub_expanded
            .get(g)
            .and_then(|subs| subs.get(s))
            .copied()
            .unwrap_or(false)
    }

    fn set_sub_expanded(&mut self, g: usize, s: usize, value: bool) {
        if let Some(flag) = self.sub_expanded.get_mut(g).and_then(|subs| subs.get_mut(s)) {
            *flag = value;
        }
    }

    fn sub_count(&self, g: usize) -> usize {
        self.sections.get(g).map_or(0, |s| s.sub_workstreams.len())
    }

    /// Issue count of sub-group `s` of group `g`.
    fn sub_len(&self, g: usize, s: usize) -> usize {
        self.sections
            .get(g)
            .and_then(|sec| sec.sub_workstreams.get(s))
            .map_or(0, GroupedSection::len)
    }

    /// Last issue of sub-group `s` if it is expanded and non-empty.
    fn last_sub_issue(&self, g: usize, s: usize) -> Option<usize> {
        if self.is_sub_expanded(g, s) {
            self.sub_len(g, s).checked_sub(1)
        } else {
            None
        }
    }

    /// Lines taken by the body of group `g` below its header.
    fn body_lines(&self, g: usize) -> usize {
        if !self.is_expanded(g) {
            return 0;
        }
        let subs = self.sub_count(g);
        if subs == 0 {
            return self.sections[g].len();
        }
        (0..subs).map(|s| self.sub_lines(g, s)).sum()
    }

    fn sub_lines(&self, g: usize, s: usize) -> usize {
        1 + if self.is_sub_expanded(g, s) { self.sub_len(g, s) } else { 0 }
    }

    fn total_lines(&self) -> usize {
        (0..self.sections.len()).map(|g| 2 + self.body_lines(g)).sum()
    }

    fn cursor_line(&self) -> usize {
        let g = self.cursor;
        let mut line: usize = (0..g).map(|prev| 2 + self.body_lines(prev)).sum();
        if !self.is_expanded(g) {
            return line;
        }
        line += 1;
        if self.sub_count(g) == 0 {
            return match self.issue {
                Some(i) => line + i,
                None => line - 1,
            };
        }
        match self.sub {
            Some(s) => {
                line += (0..s).map(|prev| self.sub_lines(g, prev)).sum::<usize>();
                match self.issue {
                    Some(i) => line + 1 + i,
                    None => line,
                }
            }
            None => line - 1,
        }
    }

    fn step_up(&mut self) {
        if self.sections.is_empty() {
            return;
        }
        let subs = self.sub_count(self.cursor);
        match (self.sub, self.issue) {
            (_, Some(i)) if i > 0 => self.issue = Some(i - 1),
            (_, Some(_)) => self.issue = None,
            (Some(s), None) if subs > 0 => {
                if s > 0 && s <= subs {
                    self.sub = Some(s - 1);
                    self.issue = self.last_sub_issue(self.cursor, s - 1);
                } else {
                    self.sub = None;
                }
            }
            (Some(_), None) => self.sub = None,
            (None, None) if self.cursor > 0 => {
                self.cursor -= 1;
                let g = self.cursor;
                let prev_subs = self.sub_count(g);
                if self.is_expanded(g) && prev_subs > 0 {
                    self.sub = Some(prev_subs - 1);
                    self.issue = self.last_sub_issue(g, prev_subs - 1);
                } else if self.is_expanded(g) {
                    self.sub = None;
                    self.issue = self.sections[g].len().checked_sub(1);
                } else {
                    self.sub = None;
                    self.issue = None;
                }
            }
            (None, None) => {}
        }
    }

    fn step_down(&mut self) {
        if self.sections.is_empty() {
            return;
        }
        let g = self.cursor;
        let subs = self.sub_count(g);
        let has_next_group = g + 1 < self.sections.len();
        let next_group = |state: &mut Self| {
            if has_next_group {
                state.cursor += 1;
                state.sub = None;
                state.issue = None;
            }
        };

        match self.sub {
            Some(s) if s < subs => {
                let len = self.sub_len(g, s);
                match self.issue {
                    None if self.is_sub_expanded(g, s) && len > 0 => self.issue = Some(0),
                    Some(i) if i + 1 < len => self.issue = Some(i + 1),
                    _ if s + 1 < subs => {
                        self.sub = Some(s + 1);
                        self.issue = None;
                    }
                    _ => next_group(self),
                }
            }
            Some(_) => {
                self.sub = None;
                self.issue = None;
                if has_next_group {
                    self.cursor += 1;
                }
            }
            None => match self.issue {
                Some(i) if i + 1 < self.sections[g].len() => self.issue = Some(i + 1),
                Some(_) => next_group(self),
                None if self.is_expanded(g) && subs > 0 => self.sub = Some(0),
                None if self.is_expanded(g) && !self.sections[g].is_empty() => self.issue = Some(0),
                None => next_group(self),
            },
        }
    }

    /// Expansion flags of the current sections keyed by name.
    fn expansion_by_name(&self) -> HashMap<&str, (bool, HashMap<&str, bool>)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(g, section)| {
                let subs = section
                    .sub_workstreams
                    .iter()
                    .enumerate()
                    .map(|(s, sub)| (sub.name.as_str(), self.is_sub_expanded(g, s)))
                    .collect();
                (section.name.as_str(), (self.is_expanded(g), subs))
            })
            .collect()
    }

    /// Swap in freshly grouped sections.
    ///
    /// # Constraints
    /// - Sections and sub-groups keep their expansion by name; new ones
    ///   start collapsed.
    /// - The cursor follows its section, sub-group and selected issue when
    ///   they survive, and is clamped otherwise.
    /// - The cursor never rests on an issue hidden by a collapsed header.
    pub(crate) fn replace_sections(&mut self, sections: Vec<GroupedSection>) {
        let (expanded, sub_expanded) = {
            let previous = self.expansion_by_name();
            let expanded: Vec<bool> = if previous.is_empty() {
                (0..sections.len()).map(|g| g == 0).collect()
            } else {
                sections
                    .iter()
                    .map(|sec| previous.get(sec.name.as_str()).is_some_and(|(on, _)| *on))
                    .collect()
            };
            let sub_expanded: Vec<Vec<bool>> = sections
                .iter()
                .map(|sec| {
                    let subs = previous.get(sec.name.as_str()).map(|(_, subs)| subs);
                    sec.sub_workstreams
                        .iter()
                        .map(|sub| {
                            subs.and_then(|m| m.get(sub.name.as_str())).copied().unwrap_or(false)
                        })
                        .collect()
                })
                .collect();
            (expanded, sub_expanded)
        };

        let old_section = self.sections.get(self.cursor).map(|sec| sec.name.clone());
        let old_sub = self.sub.and_then(|s| {
            self.sections
                .get(self.cursor)
                .and_then(|sec| sec.sub_workstreams.get(s))
                .map(|sub| sub.name.clone())
        });
        let old_issue = self.selected_id().map(str::to_string);

        self.sections = sections;
        self.expanded = expanded;
        self.sub_expanded = sub_expanded;

        match old_section.and_then(|name| self.sections.iter().position(|sec| sec.name == name)) {
            Some(g) => self.cursor = g,
            None if self.cursor < self.sections.len() => {}
            None => {
                self.reset_cursor();
                return;
            }
        }
        let g = self.cursor;
        self.sub = old_sub.and_then(|name| {
            self.sections[g]
                .sub_workstreams
                .iter()
                .position(|sub| sub.name == name)
        });
        if self.sub.is_none() && self.sub_count(g) > 0 {
            self.issue = None;
        }
        if self.issue.is_some() {
            let ids = match self.sub {
                Some(s) => &self.sections[g].sub_workstreams[s].issue_ids,
                None => &self.sections[g].issue_ids,
            };
            self.issue = old_issue
                .and_then(|id| ids.iter().position(|other| *other == id))
                .or_else(|| self.issue.filter(|&i| i < ids.len()));
        }

        let hidden = !self.is_expanded(g)
            || self.sub.is_some_and(|s| self.issue.is_some() && !self.is_sub_expanded(g, s));
        if !self.is_expanded(g) {
            self.sub = None;
        }
        if hidden {
            self.issue = None;
        }
    }

    fn selected_id(&self) -> Option<&str> {
        let i = self.issue?;
        let section = self.sections.get(self.cursor)?;
        let ids = match self.sub {
            Some(s) if s < section.sub_workstreams.len() => &section.sub_workstreams[s].issue_ids,
            _ => &section.issue_ids,
        };
        ids.get(i).map(String::as_str)
    }
}

impl LensDashboard<'_> {
    /// Group the visible primaries by the current group-by mode, carrying
    /// expansion and the cursor over by section name. With no prior state
    /// the first group starts expanded.
    pub(crate) fn rebuild_grouped_sections(&mut self) {
        let primaries = self.visible_primaries();
        let sections = Grouper::new(self.catalog, &self.index, &primaries)
            .with_subgroup_min_issues(self.config.label_subgroup_min_issues)
            .build(self.group_by);
        self.grouped.replace_sections(sections);
    }

    /// Grouped navigation is in effect.
    #[must_use]
    pub fn grouped_active(&self) -> bool {
        self.view == ViewMode::Grouped && !self.grouped.sections.is_empty()
    }

    #[must_use]
    pub fn grouped_sections(&self) -> &[GroupedSection] {
        &self.grouped.sections
    }

    /// `(group, sub-group, issue)`.
    #[must_use]
    pub const fn grouped_cursor(&self) -> (usize, Option<usize>, Option<usize>) {
        (self.grouped.cursor, self.grouped.sub, self.grouped.issue)
    }

    #[must_use]
    pub fn current_group_name(&self) -> &str {
        self.grouped
            .sections
            .get(self.grouped.cursor)
            .map_or("", |s| s.name.as_str())
    }

    #[must_use]
    pub fn is_group_expanded(&self, g: usize) -> bool {
        self.grouped.is_expanded(g)
    }

    #[must_use]
    pub fn is_sub_group_expanded(&self, g: usize, s: usize) -> bool {
        self.grouped.is_sub_expanded(g, s)
    }

    #[must_use]
    pub const fn grouped_scroll(&self) -> usize {
        self.grouped.scroll
    }

    pub(crate) fn update_selected_from_grouped(&mut self) {
        self.selected = self.grouped.selected_id().unwrap_or_default().to_string();
    }

    pub(crate) fn ensure_grouped_visible(&mut self) {
        let list = self.viewport().list_lines(GROUPED_MIN_LIST_LINES);
        self.grouped.scroll = scroll_for(self.grouped.cursor_line(), self.grouped.total_lines(), list);
    }

    fn sync_grouped(&mut self) {
        self.update_selected_from_grouped();
        self.ensure_grouped_visible();
    }

    pub(crate) fn grouped_lines(&self) -> usize {
        self.grouped.total_lines()
    }

    // =========================================================================
    // Motion
    // =========================================================================

    pub(crate) fn move_up_grouped(&mut self) {
        self.grouped.step_up();
        self.sync_grouped();
    }

    pub(crate) fn move_down_grouped(&mut self) {
        self.grouped.step_down();
        self.sync_grouped();
    }

    pub(crate) fn page_grouped(&mut self, down: bool) {
        for _ in 0..page_size(self.height) {
            if down {
                self.grouped.step_down();
            } else {
                self.grouped.step_up();
            }
        }
        self.sync_grouped();
    }

    pub(crate) fn grouped_top(&mut self) {
        self.grouped.reset_cursor();
        self.sync_grouped();
    }

    /// Last visible row of the last group.
    pub(crate) fn grouped_bottom(&mut self) {
        let g = &mut self.grouped;
        g.cursor = g.sections.len().saturating_sub(1);
        let last = g.cursor;
        let subs = g.sub_count(last);
        if !g.is_expanded(last) {
            g.sub = None;
            g.issue = None;
        } else if subs > 0 {
            g.sub = Some(subs - 1);
            g.issue = g.last_sub_issue(last, subs - 1);
        } else {
            g.sub = None;
            g.issue = g.sections.get(last).and_then(|s| s.len().checked_sub(1));
        }
        self.sync_grouped();
    }

    /// Step to the next group or sub-group header, expanding what the
    /// cursor lands on and collapsing the sub-group it leaves.
    pub fn next_group(&mut self) {
        let g = &mut self.grouped;
        if g.cursor >= g.sections.len() {
            return;
        }
        let cur = g.cursor;
        let subs = g.sub_count(cur);

        if g.issue.is_some() {
            g.issue = None;
        } else if let (Some(s), true) = (g.sub, subs > 0) {
            g.set_sub_expanded(cur, s, false);
            if s + 1 < subs {
                g.sub = Some(s + 1);
                g.set_sub_expanded(cur, s + 1, true);
            } else {
                g.sub = None;
                self.advance_group();
            }
        } else if !g.is_expanded(cur) {
            g.expanded[cur] = true;
            if subs > 0 {
                g.sub = Some(0);
                g.set_sub_expanded(cur, 0, true);
            }
        } else if g.sub.is_none() && subs > 0 {
            g.sub = Some(0);
            g.set_sub_expanded(cur, 0, true);
        } else {
            self.advance_group();
        }
        self.sync_grouped();
    }

    /// Leave the current (expanded) group for the next one. When the group
    /// is collapsed this re-enters it first, matching `next_group` on a
    /// header.
    fn advance_group(&mut self) {
        let g = &mut self.grouped;
        let cur = g.cursor;
        if !g.is_expanded(cur) {
            g.expanded[cur] = true;
            if g.sub_count(cur) > 0 {
                g.sub = Some(0);
                g.set_sub_expanded(cur, 0, true);
            }
            return;
        }
        if cur + 1 < g.sections.len() {
            g.cursor += 1;
            g.sub = None;
            g.issue = None;
        }
    }

    pub fn prev_group(&mut self) {
        let g = &mut self.grouped;
        if g.cursor >= g.sections.len() {
            return;
        }
        let cur = g.cursor;
        let subs = g.sub_count(cur);

        if g.issue.is_some() {
            g.issue = None;
        } else if let (Some(s), true) = (g.sub, subs > 0) {
            g.set_sub_expanded(cur, s, false);
            if s > 0 {
                g.sub = Some(s - 1);
                g.set_sub_expanded(cur, s - 1, true);
            } else {
                g.sub = None;
            }
        } else if cur > 0 {
            g.cursor -= 1;
            let prev = g.cursor;
            let prev_subs = g.sub_count(prev);
            if g.is_expanded(prev) && prev_subs > 0 {
                g.sub = Some(prev_subs - 1);
                g.set_sub_expanded(prev, prev_subs - 1, true);
            } else {
                g.sub = None;
            }
        }
        self.sync_grouped();
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Toggle the sub-group or group whose header is under the cursor.
    /// Issue rows are left alone.
    pub fn toggle_grouped_expand(&mut self) {
        let g = &mut self.grouped;
        if g.cursor >= g.sections.len() || g.issue.is_some() {
            return;
        }
        let cur = g.cursor;
        match g.sub {
            Some(s) if s < g.sub_count(cur) => {
                let flag = g.is_sub_expanded(cur, s);
                g.set_sub_expanded(cur, s, !flag);
            }
            Some(_) => {}
            None => g.expanded[cur] = !g.expanded[cur],
        }
        self.sync_grouped();
    }

    pub fn expand_all_groups(&mut self) {
        self.grouped.expanded.fill(true);
        for subs in &mut self.grouped.sub_expanded {
            subs.fill(true);
        }
        self.sync_grouped();
    }

    /// Collapse everything and return the cursor to its group header.
    pub fn collapse_all_groups(&mut self) {
        self.grouped.expanded.fill(false);
        for subs in &mut self.grouped.sub_expanded {
            subs.fill(false);
        }
        self.grouped.sub = None;
        self.grouped.issue = None;
        self.sync_grouped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(sizes: &[usize]) -> GroupedState {
        use lens_dashboard_core::{Catalog, CatalogIndex, Issue, IssueSet, Workstream};
        let catalog = Catalog::new(
            (0..sizes.iter().sum::<usize>())
                .map(|i| Issue::new(format!("i{i}"), "t"))
                .collect(),
        );
        let index = CatalogIndex::build(&catalog);
        let primaries = IssueSet::new();
        let mut next = 0;
        let sections: Vec<Workstream> = sizes
            .iter()
            .enumerate()
            .map(|(g, &n)| {
                let issues: Vec<usize> = (next..next + n).collect();
                next += n;
                Workstream::from_issues(format!("g{g}"), format!("G{g}"), issues, &catalog, &index, &primaries)
            })
            .collect();
        GroupedState {
            expanded: vec![true; sections.len()],
            sub_expanded: vec![Vec::new(); sections.len()],
            sections,
            ..GroupedState::default()
        }
    }

    #[test]
    fn down_then_up_visits_every_row() {
        let mut g = state(&[2, 1]);
        let mut visited = vec![(g.cursor, g.issue)];
        for _ in 0..4 {
            g.step_down();
            visited.push((g.cursor, g.issue));
        }
        assert_eq!(
            visited,
            vec![(0, None), (0, Some(0)), (0, Some(1)), (1, None), (1, Some(0))]
        );
        for _ in 0..4 {
            g.step_up();
        }
        assert_eq!((g.cursor, g.issue), (0, None));
    }

    #[test]
    fn collapsed_groups_skip_issues() {
        let mut g = state(&[2, 1]);
        g.expanded[0] = false;
        g.step_down();
        assert_eq!((g.cursor, g.issue), (1, None));
        g.step_up();
        assert_eq!((g.cursor, g.issue), (0, None));
    }

    #[test]
    fn line_arithmetic() {
        let mut g = state(&[2, 1]);
        // header, 2 issues, blank, header, 1 issue, blank
        assert_eq!(g.total_lines(), 7);
        g.step_down();
        g.step_down();
        assert_eq!(g.cursor_line(), 2);
        g.step_down();
        assert_eq!(g.cursor_line(), 4);
    }

    fn priority_dashboard(catalog: &lens_dashboard_core::Catalog) -> LensDashboard<'_> {
        use lens_dashboard_core::{DashboardConfig, GroupByMode, LensKind};
        let config = DashboardConfig {
            default_view: ViewMode::Grouped,
            default_group_by: GroupByMode::Priority,
            ..DashboardConfig::default()
        };
        LensDashboard::new(catalog, LensKind::Label("x".into()), &config)
    }

    fn priority_catalog() -> lens_dashboard_core::Catalog {
        use lens_dashboard_core::{Catalog, Issue};
        Catalog::new(vec![
            Issue::new("a", "A").with_labels(["x", "front"]).with_priority(0),
            Issue::new("b", "B").with_labels(["x", "back"]).with_priority(1),
            Issue::new("c", "C").with_labels(["x", "back"]).with_priority(2),
        ])
    }

    #[test]
    fn depth_cycle_keeps_expansion_and_selection() {
        let catalog = priority_catalog();
        let mut dash = priority_dashboard(&catalog);
        assert!(dash.grouped_active());
        dash.next_group();
        dash.toggle_grouped_expand();
        dash.move_down();
        assert_eq!(dash.grouped_cursor(), (1, None, Some(0)));
        assert_eq!(dash.selected_issue_id(), "b");

        for _ in 0..4 {
            dash.cycle_depth();
        }
        assert!(dash.is_group_expanded(0));
        assert!(dash.is_group_expanded(1));
        assert!(!dash.is_group_expanded(2));
        assert_eq!(dash.grouped_cursor(), (1, None, Some(0)));
        assert_eq!(dash.selected_issue_id(), "b");
    }

    #[test]
    fn cursor_follows_its_group_when_sections_shift() {
        let catalog = priority_catalog();
        let mut dash = priority_dashboard(&catalog);
        dash.next_group();
        dash.toggle_grouped_expand();
        dash.move_down();
        assert_eq!(dash.selected_issue_id(), "b");

        dash.add_scope_label("back");
        let names: Vec<&str> = dash.grouped_sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["P1 High", "P2 Medium"]);
        assert_eq!(dash.grouped_cursor(), (0, None, Some(0)));
        assert!(dash.is_group_expanded(0));
        assert_eq!(dash.selected_issue_id(), "b");
    }

    #[test]
    fn collapsed_group_drops_issue_cursor() {
        let mut g = state(&[2, 1]);
        g.step_down();
        assert_eq!(g.selected_id(), Some("i0"));
        g.expanded[0] = false;
        let sections = g.sections.clone();
        g.replace_sections(sections);
        assert!(!g.is_expanded(0));
        assert_eq!((g.cursor, g.sub, g.issue), (0, None, None));
        assert_eq!(g.selected_id(), None);
    }

    #[test]
    fn first_group_expands_without_prior_state() {
        let sections = state(&[1, 1]).sections;
        let mut g = GroupedState::default();
        g.replace_sections(sections);
        assert_eq!(g.expanded, vec![true, false]);
    }

    #[test]
    fn headers_select_nothing() {
        let mut g = state(&[2]);
        assert_eq!(g.selected_id(), None);
        g.step_down();
        assert_eq!(g.selected_id(), Some("i0"));
    }
}
