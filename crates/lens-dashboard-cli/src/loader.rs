//! Beads JSONL loading.
//!
//! One issue object per line; blank lines are skipped. The catalog is
//! validated after loading, and dependencies pointing outside the file
//! are kept on the issue but reported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lens_dashboard_core::{Catalog, Issue};

use crate::CliError;

/// Load and validate the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Catalog, CliError> {
    let file = File::open(path)?;
    let catalog = parse_jsonl(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), issues = catalog.len(), "loaded catalog");
    Ok(catalog)
}

/// Parse JSONL issue records from `reader`.
pub fn parse_jsonl(reader: impl BufRead) -> Result<Catalog, CliError> {
    let mut issues: Vec<Issue> = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let issue: Issue =
            serde_json::from_str(&line).map_err(|source| CliError::Json { line: n + 1, source })?;
        issues.push(issue);
    }

    let catalog = Catalog::new(issues);
    catalog.validate()?;

    let dangling = catalog
        .issues()
        .iter()
        .flat_map(|issue| issue.dependencies.iter())
        .filter(|dep| catalog.get(&dep.depends_on_id).is_none())
        .count();
    if dangling > 0 {
        tracing::warn!(dangling, "skipping dependencies whose target is not in the catalog");
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use lens_dashboard_core::{DependencyKind, IssueType, Status};

    use super::*;

    #[test]
    fn parses_lenient_records() {
        let input = r#"
{"id":"bd-1","title":"Epic","issue_type":"epic","labels":["core"]}

{"id":"bd-2","title":"Child","status":"in_progress","dependencies":[{"issue_id":"bd-2","depends_on_id":"bd-1","type":"parent-child"}]}
{"id":"bd-3","title":"Blocked","dependencies":[{"depends_on_id":"bd-2","type":""},{"depends_on_id":"gone","type":"blocks"}]}
"#;
        let catalog = parse_jsonl(Cursor::new(input)).unwrap();
        assert_eq!(catalog.len(), 3);
        let epic = catalog.get("bd-1").unwrap();
        assert_eq!(epic.issue_type, IssueType::Epic);
        assert_eq!(epic.status, Status::Open);
        assert_eq!(catalog.get("bd-2").unwrap().status, Status::InProgress);
        let blocked = catalog.get("bd-3").unwrap();
        assert_eq!(blocked.dependencies[0].kind, DependencyKind::Blocks);
        assert_eq!(blocked.dependencies.len(), 2);
    }

    #[test]
    fn reports_line_of_bad_json() {
        let input = "{\"id\":\"a\",\"title\":\"A\"}\n{not json}\n";
        let err = parse_jsonl(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, CliError::Json { line: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = "{\"id\":\"a\",\"title\":\"A\"}\n{\"id\":\"a\",\"title\":\"Again\"}\n";
        let err = parse_jsonl(Cursor::new(input)).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate issue id: a");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog(Path::new("/nonexistent/issues.jsonl")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
