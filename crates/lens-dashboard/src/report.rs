//! Plain-text dump and serializable snapshot of a dashboard.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use lens_dashboard_core::{
    DepthOption, FlatNode, GroupByMode, GroupedSection, LensKind, ScopeMode, TreeStats, ViewMode,
    Workstream,
};

use crate::dashboard::LensDashboard;

const RULE_WIDTH: usize = 60;
const SECTION_RULE_WIDTH: usize = 40;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub lens: &'a LensKind,
    pub title: &'a str,
    pub depth: DepthOption,
    pub view: ViewMode,
    pub group_by: GroupByMode,
    pub centered: bool,
    pub scope_labels: &'a [String],
    pub scope_mode: ScopeMode,
    pub stats: TreeStats,
    pub cursor: usize,
    pub scroll: usize,
    pub selected: &'a str,
    pub upstream: &'a [FlatNode],
    pub ego: Option<&'a FlatNode>,
    pub rows: &'a [FlatNode],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workstreams: Option<&'a [Workstream]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<&'a [GroupedSection]>,
}

impl LensDashboard<'_> {
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot<'_> {
        DashboardSnapshot {
            lens: self.lens.kind(),
            title: self.title(),
            depth: self.depth,
            view: self.view,
            group_by: self.group_by,
            centered: self.is_centered(),
            scope_labels: self.scope_labels(),
            scope_mode: self.scope_mode(),
            stats: self.stats,
            cursor: self.cursor,
            scroll: self.active_scroll(),
            selected: &self.selected,
            upstream: &self.upstream,
            ego: self.ego.as_ref(),
            rows: &self.flat,
            workstreams: (self.view == ViewMode::Workstream).then_some(self.workstreams()),
            groups: (self.view == ViewMode::Grouped).then_some(self.grouped_sections()),
        }
    }

    /// Text report stamped with the current time.
    #[must_use]
    pub fn dump_report(&self) -> String {
        self.dump_report_at(Utc::now())
    }

    /// Text report with summary counts, the workstream hierarchy and the
    /// visible issues grouped by tree depth.
    #[must_use]
    pub fn dump_report_at(&self, generated: DateTime<Utc>) -> String {
        let mut out = String::new();
        let stats = &self.stats;
        let _ = writeln!(out, "Lens Dashboard Dump: {}", self.lens.kind());
        let _ = writeln!(out, "Title: {}", self.title());
        let _ = writeln!(out, "Generated: {}", generated.to_rfc3339_opts(SecondsFormat::Secs, true));
        let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH));

        let _ = writeln!(out, "SUMMARY");
        let _ = writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH));
        let _ = writeln!(
            out,
            "  Total: {} issues ({} primary, {} context)",
            stats.total, stats.primary, stats.context
        );
        let _ = writeln!(
            out,
            "  Ready: {}, Blocked: {}, In Progress: {}, Closed: {}",
            stats.ready, stats.blocked, stats.in_progress, stats.closed
        );
        let _ = writeln!(out, "  Progress: {}%", percent(stats.progress()));
        let _ = writeln!(out, "  Dependency Depth: {}", self.depth);
        if self.has_scope() {
            let _ = writeln!(
                out,
                "  Scope: {} ({})",
                self.scope_labels().join(", "),
                self.scope_mode().short_name()
            );
        }
        out.push('\n');

        if !self.workstreams().is_empty() {
            let _ = writeln!(out, "WORKSTREAMS (Hierarchical)");
            let _ = writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH));
            for ws in self.workstreams() {
                self.dump_workstream(&mut out, ws, 0);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "ISSUES BY DEPTH");
        let _ = writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH));
        let mut by_depth: BTreeMap<usize, Vec<&FlatNode>> = BTreeMap::new();
        for node in self.rows() {
            by_depth.entry(node.node.depth).or_default().push(node);
        }
        for (depth, nodes) in &by_depth {
            let _ = writeln!(out, "\nDepth {depth} ({} issues):", nodes.len());
            for node in nodes {
                let issue = self.catalog.issue(node.issue());
                let _ = writeln!(out, "  [{}] {} ({})", issue.id, issue.title, issue.status);
            }
        }
        if by_depth.is_empty() {
            let _ = writeln!(out, "\n  No issues in current view");
        }
        out
    }

    fn dump_workstream(&self, out: &mut String, ws: &Workstream, indent: usize) {
        let pad = "  ".repeat(indent);
        let _ = writeln!(
            out,
            "{pad}[{}] {} ({} issues, {}% done)",
            ws.id,
            ws.name,
            ws.len(),
            percent(ws.progress)
        );
        let _ = writeln!(
            out,
            "{pad}  Ready: {}, Blocked: {}, In Progress: {}, Closed: {}",
            ws.ready_count, ws.blocked_count, ws.in_progress_count, ws.closed_count
        );
        if let Some(label) = &ws.grouped_by {
            let _ = writeln!(out, "{pad}  Grouped by: {label}");
        }
        if !ws.is_empty() {
            let _ = writeln!(out, "{pad}  Issues:");
            for &idx in &ws.issues {
                let issue = self.catalog.issue(idx);
                let _ = writeln!(out, "{pad}    - [{}] {} ({})", issue.id, issue.title, issue.status);
            }
        }
        if !ws.sub_workstreams.is_empty() {
            let _ = writeln!(out, "{pad}  Sub-workstreams ({}):", ws.sub_workstreams.len());
            for sub in &ws.sub_workstreams {
                self.dump_workstream(out, sub, indent + 1);
            }
        }
        out.push('\n');
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(progress: f64) -> u32 {
    (progress.clamp(0.0, 1.0) * 100.0) as u32
}
