//! Property-based test generators for catalogs, lenses, key scripts and
//! intent scripts.
//!
//! Generated catalogs use ids `bd-1`, `bd-2`, ... in catalog order, labels
//! drawn from [`LABEL_POOL`] and arbitrary blocks / parent-child edges,
//! cycles included. Self-edges are never generated.

use lens_dashboard_core::{Catalog, Dependency, DependencyKind, Issue, IssueType, LensKind, Status};
use proptest::prelude::*;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Shared proptest configuration: 1 000 cases, generous shrink budget.
#[must_use]
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 1000,
        max_shrink_iters: 5000,
        ..ProptestConfig::default()
    }
}

/// Fewer cases for properties that replay whole key scripts.
#[must_use]
pub fn proptest_config_scripted() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 2000,
        ..ProptestConfig::default()
    }
}

// ─── Pools ───────────────────────────────────────────────────────────────────

/// Labels random issues draw from.
pub const LABEL_POOL: &[&str] = &["alpha", "beta", "gamma", "area:ui", "area:api"];

/// Key names understood by the dashboard's key dispatch, including the
/// modal keys and a few printable characters for search and scope input.
pub const KEY_POOL: &[&str] = &[
    "j", "k", "down", "up", "pgdown", "pgup", "g", "G", "n", "N", "d", "c", "w", "o", "b",
    "enter", "E", "C", "s", "t", "S", "x", "X", "m", "/", "esc", "backspace", "tab", "ctrl+u",
    "a", "e", "1", "-",
];

/// Plain intent tokens the scripted properties replay. Parameterised
/// intents (`set-depth=`, `add-scope=`, `set-size=`) come from
/// [`arb_intent_token`].
pub const INTENT_POOL: &[&str] = &[
    "move-up", "move-down", "page-up", "page-down", "go-to-top", "go-to-bottom",
    "cycle-depth", "toggle-centered", "toggle-view", "enter-grouped", "exit-grouped",
    "cycle-group-by", "next-group", "prev-group", "toggle-group", "expand-groups",
    "collapse-groups", "next-workstream", "prev-workstream", "toggle-workstream",
    "expand-workstreams", "collapse-workstreams", "toggle-subdivision", "toggle-ws-tree",
    "remove-last-scope", "clear-scope", "toggle-scope-mode",
];

const DEPTH_TOKENS: &[&str] = &["1", "2", "3", "all"];

const SIZE_TOKENS: &[&str] = &["80x12", "100x24", "60x40"];

// ─── Leaf strategies ─────────────────────────────────────────────────────────

/// Catalog id for position `i`.
#[must_use]
pub fn issue_id(i: usize) -> String {
    format!("bd-{}", i + 1)
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        4 => Just(Status::Open),
        2 => Just(Status::InProgress),
        1 => Just(Status::Blocked),
        2 => Just(Status::Closed),
    ]
}

fn arb_issue_type() -> impl Strategy<Value = IssueType> {
    prop_oneof![3 => Just(IssueType::Task), 1 => Just(IssueType::Epic), 1 => Just(IssueType::Bug)]
}

/// `(target position, is parent-child)` edges for an issue in a catalog of
/// `n` issues.
fn arb_edges(n: usize) -> impl Strategy<Value = Vec<(usize, bool)>> {
    proptest::collection::vec((0..n.max(1), any::<bool>()), 0..=3)
}

// ─── Composite strategies ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct IssueDraft {
    status: Status,
    priority: i32,
    issue_type: IssueType,
    labels: Vec<usize>,
    edges: Vec<(usize, bool)>,
}

fn arb_issue_draft(n: usize) -> impl Strategy<Value = IssueDraft> {
    (
        arb_status(),
        0..5i32,
        arb_issue_type(),
        proptest::collection::vec(0..LABEL_POOL.len(), 0..=2),
        arb_edges(n),
    )
        .prop_map(|(status, priority, issue_type, labels, edges)| IssueDraft {
            status,
            priority,
            issue_type,
            labels,
            edges,
        })
}

fn build_catalog(drafts: Vec<IssueDraft>) -> Catalog {
    let n = drafts.len();
    let issues = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| {
            let id = issue_id(i);
            let mut labels: Vec<String> = Vec::new();
            for l in draft.labels {
                let label = LABEL_POOL[l].to_string();
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
            let dependencies = draft
                .edges
                .into_iter()
                .filter(|&(target, _)| target < n && target != i)
                .map(|(target, parent)| {
                    let kind = if parent {
                        DependencyKind::ParentChild
                    } else {
                        DependencyKind::Blocks
                    };
                    Dependency::new(id.clone(), issue_id(target), kind)
                })
                .collect();
            Issue {
                labels,
                dependencies,
                ..Issue::new(id.clone(), format!("Issue {id}"))
                    .with_status(draft.status)
                    .with_priority(draft.priority)
                    .with_type(draft.issue_type)
            }
        })
        .collect();
    Catalog::new(issues)
}

/// Strategy for a catalog of at most `max_issues` issues.
pub fn arb_catalog(max_issues: usize) -> impl Strategy<Value = Catalog> {
    (0..=max_issues)
        .prop_flat_map(|n| proptest::collection::vec(arb_issue_draft(n), n))
        .prop_map(build_catalog)
}

/// Strategy for a lens over a catalog of `n` issues. Anchored lenses may
/// name a missing issue when the catalog is empty.
pub fn arb_lens(n: usize) -> impl Strategy<Value = LensKind> {
    (0..3usize, 0..LABEL_POOL.len(), 0..n.max(1)).prop_map(|(kind, label, pos)| match kind {
        0 => LensKind::Label(LABEL_POOL[label].to_string()),
        1 => LensKind::Epic(issue_id(pos)),
        _ => LensKind::Bead(issue_id(pos)),
    })
}

/// Strategy for a catalog paired with a lens over it.
pub fn arb_catalog_and_lens(max_issues: usize) -> impl Strategy<Value = (Catalog, LensKind)> {
    arb_catalog(max_issues).prop_flat_map(|catalog| {
        let lens = arb_lens(catalog.len());
        (Just(catalog), lens)
    })
}

/// Strategy for one key name from [`KEY_POOL`].
pub fn arb_key_name() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(KEY_POOL)
}

/// Strategy for a key script of up to `max_len` keys.
pub fn arb_key_script(max_len: usize) -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(arb_key_name(), 0..=max_len)
}

/// Strategy for one intent token, weighted towards the plain pool.
pub fn arb_intent_token() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => proptest::sample::select(INTENT_POOL).prop_map(str::to_string),
        2 => proptest::sample::select(LABEL_POOL).prop_map(|l| format!("add-scope={l}")),
        1 => proptest::sample::select(DEPTH_TOKENS).prop_map(|d| format!("set-depth={d}")),
        1 => proptest::sample::select(SIZE_TOKENS).prop_map(|s| format!("set-size={s}")),
    ]
}

/// Strategy for an intent script of up to `max_len` tokens.
pub fn arb_intent_script(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_intent_token(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn generated_catalogs_validate((catalog, lens) in arb_catalog_and_lens(10)) {
            prop_assert!(catalog.validate().is_ok());
            for issue in catalog.issues() {
                for dep in &issue.dependencies {
                    prop_assert_ne!(&dep.depends_on_id, &issue.id);
                    prop_assert!(catalog.get(&dep.depends_on_id).is_some());
                }
            }
            if let Some(anchor) = lens.anchor_id() {
                prop_assert!(catalog.is_empty() || catalog.get(anchor).is_some());
            }
        }
    }
}
