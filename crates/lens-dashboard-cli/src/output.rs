//! Plain-text rendering of a dashboard frame and of the lens list.

use std::fmt::Write as _;

use lens_dashboard::{LensDashboard, bindings_for};
use lens_dashboard_core::{EffectiveStatus, FlatNode, LensItem, ViewMode};

const CURSOR: &str = "> ";
const NO_CURSOR: &str = "  ";

const fn status_icon(status: EffectiveStatus) -> char {
    match status {
        EffectiveStatus::Ready => '○',
        EffectiveStatus::InProgress => '◐',
        EffectiveStatus::Blocked => '⊘',
        EffectiveStatus::Closed => '✓',
    }
}

const fn marker(on: bool) -> &'static str {
    if on { CURSOR } else { NO_CURSOR }
}

const fn arrow(expanded: bool) -> char {
    if expanded { '▼' } else { '▶' }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(progress: f64) -> u32 {
    (progress.clamp(0.0, 1.0) * 100.0) as u32
}

/// The whole frame: header, the active view's list and the key hints.
#[must_use]
pub fn render_view(dash: &LensDashboard<'_>) -> String {
    let mut out = String::new();
    render_header(dash, &mut out);
    if dash.grouped_active() {
        render_grouped(dash, &mut out);
    } else if dash.ws_active() {
        render_workstreams(dash, &mut out);
    } else if dash.row_count() == 0 {
        let _ = writeln!(out, "  No issues in current view");
    } else if dash.ego_node().is_some() {
        render_centered(dash, &mut out);
    } else {
        render_flat(dash, &mut out);
    }

    let keys: Vec<String> = bindings_for(dash.view())
        .map(|b| format!("{} {}", b.label, b.action.to_lowercase()))
        .collect();
    let _ = writeln!(out, "\nKeys: {}", keys.join(" · "));
    out
}

fn render_header(dash: &LensDashboard<'_>, out: &mut String) {
    let stats = dash.stats();
    let _ = writeln!(out, "{}  {}", dash.lens().kind(), dash.title());
    let _ = writeln!(
        out,
        "Depth {} · {} view · {} issues ({} primary, {} context) · {}% done",
        dash.depth(),
        dash.view(),
        stats.total,
        stats.primary,
        stats.context,
        percent(stats.progress())
    );
    if dash.has_scope() {
        let _ = writeln!(
            out,
            "Scope: {} ({})",
            dash.scope_labels().join(", "),
            dash.scope_mode().short_name()
        );
    }
    if dash.view() == ViewMode::Grouped {
        let _ = writeln!(out, "Group by: {}", dash.group_by());
    }
    out.push('\n');
}

fn node_line(dash: &LensDashboard<'_>, node: &FlatNode, selected: bool) -> String {
    let title = &dash.catalog().issue(node.issue()).title;
    let mut line = format!(
        "{}{}{} {} {}",
        marker(selected),
        node.prefix,
        status_icon(node.status),
        node.id,
        title
    );
    if !node.node.is_primary {
        line.push_str(" (context)");
    }
    if let Some(blocker) = node.blocked_by.as_deref().filter(|_| !node.blocker_in_tree) {
        let _ = write!(line, "  ⊘ {blocker}");
    }
    line
}

fn issue_line(dash: &LensDashboard<'_>, id: &str, indent: &str, selected: bool) -> String {
    let catalog = dash.catalog();
    match catalog.index_of(id) {
        Some(idx) => format!(
            "{}{indent}{} {} {}",
            marker(selected),
            status_icon(dash.index().effective_status(idx)),
            id,
            catalog.issue(idx).title
        ),
        None => format!("{}{indent}{id}", marker(selected)),
    }
}

fn render_flat(dash: &LensDashboard<'_>, out: &mut String) {
    let mut last: Option<EffectiveStatus> = None;
    for (i, node) in dash.flat_nodes().iter().enumerate() {
        if last != Some(node.status) {
            let _ = writeln!(out, "── {} ──", node.status);
            last = Some(node.status);
        }
        let _ = writeln!(out, "{}", node_line(dash, node, i == dash.cursor()));
    }
}

fn render_centered(dash: &LensDashboard<'_>, out: &mut String) {
    let mut pos = 0;
    if !dash.upstream_nodes().is_empty() {
        let _ = writeln!(out, "UPSTREAM");
        for node in dash.upstream_nodes() {
            let _ = writeln!(out, "{}", node_line(dash, node, pos == dash.cursor()));
            pos += 1;
        }
    }
    if let Some(ego) = dash.ego_node() {
        let _ = writeln!(out, "FOCUS");
        let _ = writeln!(out, "{}", node_line(dash, ego, pos == dash.cursor()));
        pos += 1;
    }
    if !dash.flat_nodes().is_empty() {
        let _ = writeln!(out, "DOWNSTREAM");
        for node in dash.flat_nodes() {
            let _ = writeln!(out, "{}", node_line(dash, node, pos == dash.cursor()));
            pos += 1;
        }
    }
}

fn render_workstreams(dash: &LensDashboard<'_>, out: &mut String) {
    let (cursor_ws, cursor_issue) = dash.workstream_cursor();
    for (w, ws) in dash.workstreams().iter().enumerate() {
        let expanded = dash.is_workstream_expanded(w);
        let _ = writeln!(
            out,
            "{}{} {} ({} issues, {}% done){}",
            marker(w == cursor_ws && cursor_issue.is_none()),
            arrow(expanded),
            ws.name,
            ws.len(),
            percent(ws.progress),
            if ws.is_blocked { " [blocked]" } else { "" }
        );
        let at = |i: usize| w == cursor_ws && cursor_issue == Some(i);
        if dash.is_ws_tree_view() && expanded {
            for (i, node) in dash.workstream_rows(w).iter().enumerate() {
                let _ = writeln!(out, "  {}", node_line(dash, node, at(i)));
            }
        } else {
            let count = dash.visible_issue_count(w);
            for (i, id) in ws.issue_ids.iter().take(count).enumerate() {
                let _ = writeln!(out, "{}", issue_line(dash, id, "    ", at(i)));
            }
            if ws.len() > count {
                let _ = writeln!(out, "      … +{} more", ws.len() - count);
            }
        }
        if expanded {
            for sub in &ws.sub_workstreams {
                let _ = writeln!(out, "    ↳ {} ({} issues)", sub.name, sub.len());
            }
        }
        out.push('\n');
    }
}

fn render_grouped(dash: &LensDashboard<'_>, out: &mut String) {
    let (cursor_g, cursor_sub, cursor_issue) = dash.grouped_cursor();
    for (g, section) in dash.grouped_sections().iter().enumerate() {
        let here = g == cursor_g;
        let expanded = dash.is_group_expanded(g);
        let _ = writeln!(
            out,
            "{}{} {} ({})",
            marker(here && cursor_sub.is_none() && cursor_issue.is_none()),
            arrow(expanded),
            section.name,
            section.len()
        );
        if expanded && section.sub_workstreams.is_empty() {
            for (i, id) in section.issue_ids.iter().enumerate() {
                let on = here && cursor_sub.is_none() && cursor_issue == Some(i);
                let _ = writeln!(out, "{}", issue_line(dash, id, "    ", on));
            }
        } else if expanded {
            for (s, sub) in section.sub_workstreams.iter().enumerate() {
                let sub_here = here && cursor_sub == Some(s);
                let sub_expanded = dash.is_sub_group_expanded(g, s);
                let _ = writeln!(
                    out,
                    "{}  {} {} ({})",
                    marker(sub_here && cursor_issue.is_none()),
                    arrow(sub_expanded),
                    sub.name,
                    sub.len()
                );
                if sub_expanded {
                    for (i, id) in sub.issue_ids.iter().enumerate() {
                        let on = sub_here && cursor_issue == Some(i);
                        let _ = writeln!(out, "{}", issue_line(dash, id, "      ", on));
                    }
                }
            }
        }
        out.push('\n');
    }
}

/// One line per lens: kind, value, counts, progress and title.
#[must_use]
pub fn render_lenses(items: &[LensItem]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        let _ = writeln!(out, "No matching lenses");
        return out;
    }
    for item in items {
        let _ = write!(
            out,
            "{:<6} {:<24} {:>4} issues {:>3}%",
            item.kind.as_str(),
            item.value,
            item.issue_count,
            percent(item.progress)
        );
        if item.overlap_count > 0 {
            let _ = write!(out, "  [{} in scope]", item.overlap_count);
        }
        if item.title != item.value {
            let _ = write!(out, "  {}", item.title);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use lens_dashboard_core::{Catalog, DashboardConfig, Issue, LensKind, Status};

    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Issue::new("a", "Alpha").with_labels(["x"]),
            Issue::new("b", "Beta").with_labels(["x"]).blocked_by("a"),
            Issue::new("c", "Gamma").with_labels(["x"]).with_status(Status::Closed),
        ])
    }

    #[test]
    fn flat_frame_marks_cursor_and_status_runs() {
        let catalog = catalog();
        let dash = LensDashboard::new(&catalog, LensKind::Label("x".into()), &DashboardConfig::default());
        let frame = render_view(&dash);
        assert!(frame.starts_with("label:x  x\n"));
        assert!(frame.contains("> ○ a Alpha"));
        assert!(frame.contains("└─⊘ b Beta"));
        assert!(frame.contains("── closed ──"));
        assert!(frame.contains("Keys: j/down move down"));
    }

    #[test]
    fn empty_frame_says_so() {
        let catalog = catalog();
        let dash = LensDashboard::new(&catalog, LensKind::Bead("zz".into()), &DashboardConfig::default());
        assert!(render_view(&dash).contains("No issues in current view"));
    }

    #[test]
    fn lens_lines_show_counts() {
        let item = LensItem {
            kind: lens_dashboard_core::LensItemKind::Label,
            value: "ui".into(),
            title: "ui".into(),
            issue_count: 12,
            closed_count: 3,
            progress: 0.25,
            overlap_count: 0,
        };
        let text = render_lenses(&[item]);
        assert_eq!(text, format!("{:<6} {:<24} {:>4} issues {:>3}%\n", "label", "ui", 12, 25));
        assert_eq!(render_lenses(&[]), "No matching lenses\n");
    }
}
