//! Catalogs for the end-to-end scenarios.

use lens_dashboard_core::{Catalog, IssueType, Status};

use crate::builder::CatalogBuilder;

/// `P` (label X) is parent of `C`, which is parent of `G`.
#[must_use]
pub fn label_chain() -> Catalog {
    CatalogBuilder::new()
        .task("P")
        .task("C")
        .task("G")
        .labels("P", &["X"])
        .parent("P", "C")
        .parent("C", "G")
        .build()
}

/// Blocker chain `TB → B → P → D` with only `P` labelled X.
#[must_use]
pub fn upstream_chain() -> Catalog {
    CatalogBuilder::new()
        .task("TB")
        .task("B")
        .task("P")
        .task("D")
        .labels("P", &["X"])
        .blocks("TB", "B")
        .blocks("B", "P")
        .blocks("P", "D")
        .build()
}

/// Two epics sharing one blocker `M`.
#[must_use]
pub fn sibling_epics() -> Catalog {
    CatalogBuilder::new()
        .epic("E1")
        .task("C1")
        .epic("E2")
        .task("C2")
        .task("M")
        .parent("E1", "C1")
        .parent("E2", "C2")
        .blocks("M", "C1")
        .blocks("M", "C2")
        .build()
}

/// `A` with two blockers above it and a blocked issue and a child below.
#[must_use]
pub fn ego_bead() -> Catalog {
    CatalogBuilder::new()
        .task("U1")
        .task("U2")
        .task("A")
        .task("D1")
        .task("D2")
        .blocks("U1", "A")
        .blocks("U2", "A")
        .blocks("A", "D1")
        .parent("A", "D2")
        .build()
}

/// Label overlap for scope tests.
#[must_use]
pub fn scope_overlap() -> Catalog {
    CatalogBuilder::new()
        .task("X1")
        .task("X2")
        .task("X3")
        .labels("X1", &["alpha", "beta"])
        .labels("X2", &["alpha"])
        .labels("X3", &["beta"])
        .build()
}

/// Six issues labelled L with priorities 0, 0, 1, 2, 2, 3.
#[must_use]
pub fn priority_spread() -> Catalog {
    [0, 0, 1, 2, 2, 3]
        .iter()
        .enumerate()
        .fold(CatalogBuilder::new(), |b, (i, &p)| {
            let id = format!("I{}", i + 1);
            b.task(&id).labels(&id, &["L"]).priority(&id, p)
        })
        .build()
}

/// Two blocks edges forming a cycle, both labelled X.
#[must_use]
pub fn blocks_cycle() -> Catalog {
    CatalogBuilder::new()
        .task("A")
        .task("B")
        .labels("A", &["X"])
        .labels("B", &["X"])
        .blocks("A", "B")
        .blocks("B", "A")
        .build()
}

/// A medium project: one epic with labelled children in two clusters,
/// a closed task and an in-progress one.
#[must_use]
pub fn project() -> Catalog {
    CatalogBuilder::new()
        .epic("bd-1")
        .task("bd-1.1")
        .task("bd-1.2")
        .task("bd-1.3")
        .task("bd-1.4")
        .task("bd-1.5")
        .task("bd-2")
        .parent("bd-1", "bd-1.1")
        .parent("bd-1", "bd-1.2")
        .parent("bd-1", "bd-1.3")
        .parent("bd-1", "bd-1.4")
        .parent("bd-1", "bd-1.5")
        .blocks("bd-1.1", "bd-1.2")
        .blocks("bd-1.3", "bd-1.4")
        .blocks("bd-2", "bd-1.5")
        .labels("bd-1", &["core"])
        .labels("bd-1.1", &["core", "area:api"])
        .labels("bd-1.2", &["core", "area:api"])
        .labels("bd-1.3", &["core", "area:ui"])
        .labels("bd-1.4", &["core", "area:ui"])
        .labels("bd-1.5", &["core"])
        .labels("bd-2", &["infra"])
        .status("bd-1.1", Status::Closed)
        .status("bd-1.3", Status::InProgress)
        .priority("bd-1.2", 0)
        .issue(
            lens_dashboard_core::Issue::new("bd-3", "Loose chore")
                .with_type(IssueType::Chore)
                .with_labels(["infra"]),
        )
        .build()
}
