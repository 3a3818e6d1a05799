//! End-to-end runs of `lensdash` commands over temporary JSONL exports.

use std::io::Write;

use lens_dashboard_cli::{CliError, run_from};
use tempfile::NamedTempFile;

const EXPORT: &str = r#"{"id":"bd-1","title":"Search revamp","issue_type":"epic","priority":1,"labels":["core"]}
{"id":"bd-1.1","title":"Tokenizer","priority":2,"status":"closed","labels":["core","area:api"],"dependencies":[{"issue_id":"bd-1.1","depends_on_id":"bd-1","type":"parent-child"}]}
{"id":"bd-1.2","title":"Ranking","priority":0,"labels":["core","area:api"],"dependencies":[{"issue_id":"bd-1.2","depends_on_id":"bd-1","type":"parent-child"},{"issue_id":"bd-1.2","depends_on_id":"bd-1.1","type":"blocks"}]}
{"id":"bd-1.3","title":"Results page","priority":2,"status":"in_progress","labels":["core","area:ui"],"dependencies":[{"issue_id":"bd-1.3","depends_on_id":"bd-1","type":"parent-child"}]}
{"id":"bd-1.4","title":"Facets","priority":2,"labels":["core","area:ui"],"dependencies":[{"issue_id":"bd-1.4","depends_on_id":"bd-1","type":"parent-child"},{"issue_id":"bd-1.4","depends_on_id":"bd-1.3","type":"blocks"}]}
{"id":"bd-2","title":"Upgrade index server","priority":1,"labels":["infra"],"dependencies":[{"issue_id":"bd-2","depends_on_id":"bd-9","type":"blocks"}]}
{"id":"bd-3","title":"Rotate logs","priority":3,"labels":["infra"]}
"#;

fn export() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EXPORT.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn run(args: &[&str]) -> Result<String, CliError> {
    let mut out = Vec::new();
    let mut argv = vec!["lensdash"];
    argv.extend_from_slice(args);
    run_from(argv, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn show_label_lens() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&["show", path, "--lens", "label:core"]).unwrap();
    assert!(text.starts_with("label:core  core\n"));
    assert!(text.contains("5 issues (5 primary, 0 context)"));
    assert!(text.contains("> ○ bd-1 Search revamp"));
    assert!(!text.contains("bd-2"));
}

#[test]
fn show_bead_lens_centered_json() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&["show", path, "--lens", "bead:bd-1.4", "--json"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["centered"], true);
    assert_eq!(json["ego"]["id"], "bd-1.4");
    let upstream: Vec<&str> = json["upstream"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["id"].as_str())
        .collect();
    assert_eq!(upstream.len(), 2);
    assert!(upstream.contains(&"bd-1") && upstream.contains(&"bd-1.3"));
}

#[test]
fn show_with_scope_and_grouping() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&[
        "show", path, "--lens", "label:core", "--depth", "1", "--scope", "area:ui,area:api",
        "--view", "grouped", "--group-by", "priority",
    ])
    .unwrap();
    assert!(text.contains("Scope: area:ui, area:api (∪ ANY)"));
    assert!(text.contains("Group by: Priority"));
    assert!(text.contains("P0 Critical (1)"));
    assert!(text.contains("P2 Medium (3)"));
    assert!(!text.contains("Search revamp"));
}

#[test]
fn dump_report() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&["dump", path, "--lens", "epic:bd-1", "--no-centered"]).unwrap();
    assert!(text.starts_with("Lens Dashboard Dump: epic:bd-1\n"));
    assert!(text.contains("Title: Search revamp"));
    assert!(text.contains("ISSUES BY DEPTH"));
}

#[test]
fn lenses_listing() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&["lenses", path, "--mode", "label"]).unwrap();
    let labels: Vec<&str> = text
        .lines()
        .filter_map(|l| l.split_whitespace().nth(1))
        .collect();
    assert!(labels.contains(&"core"));
    assert!(labels.contains(&"infra"));
    assert!(text.lines().all(|l| l.starts_with("label")));

    let json = run(&["lenses", path, "--mode", "epic", "--json"]).unwrap();
    let items: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(items[0]["value"], "bd-1");
    assert_eq!(items[0]["issue_count"], 4);
}

#[test]
fn lenses_with_unknown_scope_label_fails() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let err = run(&["lenses", path, "--scope", "nope"]).unwrap_err();
    assert_eq!(err.to_string(), "Label not found: nope");
}

#[test]
fn replay_moves_cursor_and_reports_status() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let text = run(&["replay", path, "--lens", "label:core", "--keys", "j,cycle-depth"]).unwrap();
    assert!(text.contains("Depth 3"));
    assert!(text.trim_end().ends_with("Depth: 3"));

    let err = run(&["replay", path, "--lens", "label:core", "--keys", "set-depth=9"]).unwrap_err();
    assert!(matches!(err, CliError::Core(_)));
}

#[test]
fn bad_arguments_and_files() {
    let file = export();
    let path = file.path().to_str().unwrap();
    let err = run(&["show", path, "--lens", "tag:x"]).unwrap_err();
    assert!(matches!(err, CliError::InvalidArgument(_)));

    let err = run(&["show", "/nonexistent.jsonl", "--lens", "label:x"]).unwrap_err();
    assert!(matches!(err, CliError::Io(_)));

    let mut broken = NamedTempFile::new().unwrap();
    writeln!(broken, "{{\"id\":\"a\",\"title\":\"A\"}}").unwrap();
    writeln!(broken, "{{\"id\":").unwrap();
    let err = run(&["show", broken.path().to_str().unwrap(), "--lens", "label:x"]).unwrap_err();
    assert!(matches!(err, CliError::Json { line: 2, .. }));
}
