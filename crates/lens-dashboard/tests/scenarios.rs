//! End-to-end walkthroughs over the fixture catalogs.

use lens_dashboard::LensDashboard;
use lens_dashboard_core::{
    Catalog, DashboardConfig, DepthOption, GroupByMode, LensKind, ScopeMode, ViewMode,
};
use lens_dashboard_test_helpers::fixtures;

fn ids<'a>(nodes: impl IntoIterator<Item = &'a lens_dashboard_core::FlatNode>) -> Vec<&'a str> {
    nodes.into_iter().map(|n| n.id.as_str()).collect()
}

fn tree_config() -> DashboardConfig {
    DashboardConfig {
        centered_by_default: false,
        ..DashboardConfig::default()
    }
}

fn primary_ids(dash: &LensDashboard<'_>) -> Vec<String> {
    let catalog: &Catalog = dash.catalog();
    dash.primaries()
        .iter()
        .map(|&i| catalog.issue(i).id.clone())
        .collect()
}

#[test]
fn label_lens_pulls_children_at_depth_two() {
    let catalog = fixtures::label_chain();
    let dash = LensDashboard::new(&catalog, LensKind::Label("X".into()), &DashboardConfig::default());
    assert_eq!(dash.depth(), DepthOption::Two);
    // G is a descendant too, but sits below the depth cut
    assert_eq!(ids(dash.flat_nodes()), ["P", "C"]);
    assert_eq!(dash.primary_count(), 2);
    assert_eq!(dash.cursor(), 0);
    assert_eq!(dash.selected_issue_id(), "P");
    assert_eq!(dash.issue_count(), 2);
    assert_eq!(dash.context_count(), 0);
}

#[test]
fn upstream_blockers_become_context_roots() {
    let catalog = fixtures::upstream_chain();
    let dash = LensDashboard::new(&catalog, LensKind::Label("X".into()), &DashboardConfig::default());
    assert_eq!(dash.primary_count(), 1);
    assert_eq!(dash.context_count(), 3);
    assert_eq!(dash.issue_count(), 4);

    let rows: Vec<(&str, usize)> = dash
        .flat_nodes()
        .iter()
        .map(|n| (n.id.as_str(), n.node.depth))
        .collect();
    // P's tree descends to D; the blocker chain gets its own root
    assert_eq!(rows, [("P", 0), ("D", 1), ("TB", 0), ("B", 1)]);
}

#[test]
fn epic_lens_ignores_sibling_epic() {
    let catalog = fixtures::sibling_epics();
    let dash = LensDashboard::new(&catalog, LensKind::Epic("E1".into()), &tree_config());
    let rows = ids(dash.flat_nodes());
    assert_eq!(rows, ["E1", "C1", "M"]);
    assert!(!rows.contains(&"E2"));
    assert!(!rows.contains(&"C2"));
    assert_eq!(primary_ids(&dash), ["E1", "C1"]);
    assert!(dash.issue_count() <= 3);

    let other = LensDashboard::new(&catalog, LensKind::Epic("E2".into()), &tree_config());
    assert_eq!(primary_ids(&other), ["E2", "C2"]);
}

#[test]
fn bead_lens_centers_on_anchor() {
    let catalog = fixtures::ego_bead();
    let mut dash = LensDashboard::new(&catalog, LensKind::Bead("A".into()), &DashboardConfig::default());
    assert!(dash.is_centered());
    assert_eq!(ids(dash.upstream_nodes()), ["U1", "U2"]);
    assert_eq!(dash.ego_node().map(|n| n.id.as_str()), Some("A"));
    // the ready child sorts ahead of the blocked dependent
    assert_eq!(ids(dash.flat_nodes()), ["D2", "D1"]);

    dash.go_to_top();
    dash.move_down();
    dash.move_down();
    assert_eq!(dash.cursor(), 2);
    assert_eq!(dash.selected_issue_id(), "A");
}

#[test]
fn intersection_scope_narrows_label_lens() {
    let catalog = fixtures::scope_overlap();
    let config = DashboardConfig {
        default_scope: vec!["beta".into()],
        default_scope_mode: ScopeMode::Intersection,
        ..DashboardConfig::default()
    };
    let dash = LensDashboard::new(&catalog, LensKind::Label("alpha".into()), &config);
    assert_eq!(primary_ids(&dash), ["X1"]);
    assert_eq!(ids(dash.flat_nodes()), ["X1"]);
}

#[test]
fn grouping_by_priority_suppresses_empty_buckets() {
    let catalog = fixtures::priority_spread();
    let config = DashboardConfig {
        default_view: ViewMode::Grouped,
        default_group_by: GroupByMode::Priority,
        ..DashboardConfig::default()
    };
    let dash = LensDashboard::new(&catalog, LensKind::Label("L".into()), &config);
    let groups: Vec<(&str, usize)> = dash
        .grouped_sections()
        .iter()
        .map(|g| (g.name.as_str(), g.len()))
        .collect();
    assert_eq!(
        groups,
        [("P0 Critical", 2), ("P1 High", 1), ("P2 Medium", 2), ("P3+ Other", 1)]
    );
}

#[test]
fn project_walkthrough() {
    let catalog = fixtures::project();
    let mut dash = LensDashboard::new(&catalog, LensKind::Label("core".into()), &DashboardConfig::default());
    let baseline: Vec<String> = dash.flat_nodes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(baseline.first().map(String::as_str), Some("bd-1"));

    dash.add_scope_label("area:ui");
    assert_eq!(primary_ids(&dash), ["bd-1.3", "bd-1.4"]);
    dash.toggle_scope_mode();
    assert_eq!(dash.scope_mode(), ScopeMode::Intersection);
    dash.clear_scope();
    let restored: Vec<String> = dash.flat_nodes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(restored, baseline);
}

#[test]
fn entering_workstream_view_starts_at_first_header() {
    use lens_dashboard_core::Issue;
    let catalog = Catalog::new(vec![
        Issue::new("a", "Alpha root").with_labels(["x", "alpha"]),
        Issue::new("a1", "Alpha one").with_labels(["x", "alpha"]).child_of("a"),
        Issue::new("a2", "Alpha two").with_labels(["x", "alpha"]).child_of("a"),
        Issue::new("b", "Beta root").with_labels(["x", "beta"]),
        Issue::new("b1", "Beta one").with_labels(["x", "beta"]).child_of("b"),
        Issue::new("c", "Gamma root").with_labels(["x", "gamma"]),
        Issue::new("c1", "Gamma one").with_labels(["x", "gamma"]).child_of("c"),
    ]);
    let mut dash = LensDashboard::new(&catalog, LensKind::Label("x".into()), &DashboardConfig::default());
    dash.toggle_view_type();
    assert!(dash.ws_active());
    assert_eq!(dash.workstreams().len(), 3);
    dash.next_workstream();
    dash.next_workstream();
    assert_eq!(dash.workstream_cursor(), (2, None));

    dash.toggle_view_type();
    assert_eq!(dash.view(), ViewMode::Flat);
    dash.add_scope_label("beta");
    dash.add_scope_label("gamma");
    dash.toggle_view_type();

    assert_eq!(dash.workstreams().len(), 2);
    assert_eq!(dash.workstream_cursor(), (0, None));
    let first = &dash.workstreams()[0];
    assert!(first.issue_ids.iter().any(|id| id == dash.selected_issue_id()));
    assert_eq!(dash.ws_scroll(), 0);
}
