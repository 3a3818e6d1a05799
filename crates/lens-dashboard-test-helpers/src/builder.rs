//! Fluent construction of small catalogs.
//!
//! Edges are written the way they read: `blocks("A", "B")` means A must
//! close before B. Edge methods naming an id that was never added are
//! ignored, so fixtures can describe dangling references explicitly with
//! [`CatalogBuilder::dangling_blocker`].

use lens_dashboard_core::{Catalog, Dependency, DependencyKind, Issue, IssueType, Status};

#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    issues: Vec<Issue>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task titled after its id.
    #[must_use]
    pub fn task(self, id: &str) -> Self {
        let title = format!("Task {id}");
        self.issue(Issue::new(id, title))
    }

    /// Add an epic titled after its id.
    #[must_use]
    pub fn epic(self, id: &str) -> Self {
        let title = format!("Epic {id}");
        self.issue(Issue::new(id, title).with_type(IssueType::Epic))
    }

    /// Add a fully formed issue.
    #[must_use]
    pub fn issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    #[must_use]
    pub fn title(self, id: &str, title: &str) -> Self {
        self.with_issue(id, |issue| issue.title = title.to_string())
    }

    #[must_use]
    pub fn labels(self, id: &str, labels: &[&str]) -> Self {
        self.with_issue(id, |issue| {
            issue.labels.extend(labels.iter().map(|l| (*l).to_string()));
        })
    }

    #[must_use]
    pub fn status(self, id: &str, status: Status) -> Self {
        self.with_issue(id, |issue| issue.status = status)
    }

    #[must_use]
    pub fn priority(self, id: &str, priority: i32) -> Self {
        self.with_issue(id, |issue| issue.priority = priority)
    }

    /// `blocker` must close before `blocked` can progress.
    #[must_use]
    pub fn blocks(self, blocker: &str, blocked: &str) -> Self {
        self.edge(blocker, blocked, DependencyKind::Blocks)
    }

    /// `parent` contains `child`.
    #[must_use]
    pub fn parent(self, parent: &str, child: &str) -> Self {
        self.edge(parent, child, DependencyKind::ParentChild)
    }

    /// A blocks edge on `blocked` whose target is not in the catalog.
    #[must_use]
    pub fn dangling_blocker(self, blocked: &str, missing: &str) -> Self {
        let dep = Dependency::new(blocked, missing, DependencyKind::Blocks);
        self.with_issue(blocked, |issue| issue.dependencies.push(dep))
    }

    #[must_use]
    pub fn build(self) -> Catalog {
        Catalog::new(self.issues)
    }

    fn edge(self, upstream: &str, downstream: &str, kind: DependencyKind) -> Self {
        if !self.issues.iter().any(|i| i.id == upstream) {
            tracing::trace!(upstream, downstream, "builder edge names an unknown issue");
            return self;
        }
        let dep = Dependency::new(downstream, upstream, kind);
        self.with_issue(downstream, |issue| issue.dependencies.push(dep))
    }

    fn with_issue(mut self, id: &str, f: impl FnOnce(&mut Issue)) -> Self {
        if let Some(issue) = self.issues.iter_mut().find(|i| i.id == id) {
            f(issue);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_land_on_the_dependent() {
        let catalog = CatalogBuilder::new()
            .task("a")
            .task("b")
            .blocks("a", "b")
            .parent("a", "zzz")
            .build();
        let b = catalog.get("b").unwrap_or_else(|| panic!("b exists"));
        assert_eq!(b.dependencies.len(), 1);
        assert_eq!(b.dependencies[0].depends_on_id, "a");
        let a = catalog.get("a").unwrap_or_else(|| panic!("a exists"));
        assert!(a.dependencies.is_empty());
    }
}
