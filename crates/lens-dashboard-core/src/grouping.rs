//! Attribute grouping of the primary set: by label popularity, priority
//! bucket, or effective status.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
use crate::error::Error;
use crate::models::EffectiveStatus;
use crate::sorting::count_labels;
use crate::workstream::{CORE_NAME, Workstream};

/// Name of the trailing group for primaries with no labels.
pub const UNLABELED_NAME: &str = "Unlabeled";

/// Priority bucket names, highest first. Anything past P2 lands in the last.
pub const PRIORITY_BUCKETS: [&str; 4] = ["P0 Critical", "P1 High", "P2 Medium", "P3+ Other"];

/// Smallest label sub-group that is kept apart from Core.
const MIN_SUBGROUP_SIZE: usize = 2;

/// Attribute used by the grouped view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupByMode {
    #[default]
    Label,
    Priority,
    Status,
}

impl GroupByMode {
    /// Label → Priority → Status → Label.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Label => Self::Priority,
            Self::Priority => Self::Status,
            Self::Status => Self::Label,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Priority => "Priority",
            Self::Status => "Status",
        }
    }
}

impl fmt::Display for GroupByMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupByMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "label" | "labels" => Ok(Self::Label),
            "priority" | "prio" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            other => Err(Error::InvalidGroupBy(other.to_string())),
        }
    }
}

/// Group display name for an effective status. Ready issues read as "Open".
#[must_use]
pub const fn status_group_name(status: EffectiveStatus) -> &'static str {
    match status {
        EffectiveStatus::Ready => "Open",
        EffectiveStatus::InProgress => "In Progress",
        EffectiveStatus::Blocked => "Blocked",
        EffectiveStatus::Closed => "Closed",
    }
}

/// Bucket slot for a priority value.
#[must_use]
pub const fn priority_bucket(priority: i32) -> usize {
    match priority {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

/// A grouped-view section. Sections reuse the workstream shape.
pub type GroupedSection = Workstream;

/// Builds grouped sections over a primary set.
pub struct Grouper<'a> {
    catalog: &'a Catalog,
    index: &'a CatalogIndex,
    primaries: &'a IssueSet,
    subgroup_min_issues: usize,
}

impl<'a> Grouper<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, index: &'a CatalogIndex, primaries: &'a IssueSet) -> Self {
        Self {
            catalog,
            index,
            primaries,
            subgroup_min_issues: 4,
        }
    }

    /// Groups smaller than this are never sub-grouped.
    #[must_use]
    pub const fn with_subgroup_min_issues(mut self, min: usize) -> Self {
        self.subgroup_min_issues = min;
        self
    }

    #[must_use]
    pub fn build(&self, mode: GroupByMode) -> Vec<GroupedSection> {
        let sections = match mode {
            GroupByMode::Label => self.by_label(),
            GroupByMode::Priority => self.by_priority(),
            GroupByMode::Status => self.by_status(),
        };
        tracing::debug!(mode = %mode, groups = sections.len(), "built grouped sections");
        sections
    }

    fn section(&self, name: &str, issues: Vec<IssueIdx>) -> Workstream {
        Workstream::from_issues(
            format!("group:{name}"),
            name,
            issues,
            self.catalog,
            self.index,
            self.primaries,
        )
    }

    fn by_label(&self) -> Vec<Workstream> {
        let ranked = count_labels(self.primaries.iter().map(|&i| self.catalog.issue(i)), &[]);
        let rank: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.label.as_str(), pos))
            .collect();

        let mut groups: Vec<Vec<IssueIdx>> = vec![Vec::new(); ranked.len()];
        let mut unlabeled = Vec::new();
        for &idx in self.primaries {
            let best = self
                .catalog
                .issue(idx)
                .labels
                .iter()
                .filter_map(|l| rank.get(l.as_str()).copied())
                .min();
            match best {
                Some(slot) => groups[slot].push(idx),
                None => unlabeled.push(idx),
            }
        }

        let mut sections = Vec::new();
        for (count, members) in ranked.iter().zip(groups) {
            if members.is_empty() {
                continue;
            }
            let mut section = self.section(&count.label, members);
            self.label_subgroups(&mut section, &rank, &count.label);
            sections.push(section);
        }
        if !unlabeled.is_empty() {
            sections.push(self.section(UNLABELED_NAME, unlabeled));
        }
        sections
    }

    /// Split a label group by each member's next most popular label.
    fn label_subgroups(&self, parent: &mut Workstream, rank: &HashMap<&str, usize>, primary_label: &str) {
        if parent.len() < self.subgroup_min_issues {
            return;
        }
        let mut buckets: Vec<(usize, Vec<IssueIdx>)> = Vec::new();
        let mut core = Vec::new();
        for &idx in &parent.issues {
            let second = self
                .catalog
                .issue(idx)
                .labels
                .iter()
                .filter(|l| l.as_str() != primary_label)
                .filter_map(|l| rank.get(l.as_str()).copied())
                .min();
            match second {
                Some(slot) => match buckets.iter_mut().find(|(s, _)| *s == slot) {
                    Some((_, members)) => members.push(idx),
                    None => buckets.push((slot, vec![idx])),
                },
                None => core.push(idx),
            }
        }
        if buckets.len() < 2 {
            return;
        }

        let mut kept: Vec<(usize, Vec<IssueIdx>)> = Vec::new();
        for (slot, members) in buckets {
            if members.len() >= MIN_SUBGROUP_SIZE {
                kept.push((slot, members));
            } else {
                core.extend(members);
            }
        }
        kept.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        let labels: HashMap<usize, &str> = rank.iter().map(|(l, &s)| (s, *l)).collect();
        for (slot, members) in kept {
            let name = labels.get(&slot).copied().unwrap_or(CORE_NAME);
            let mut sub = self.section(name, members);
            sub.depth = 1;
            sub.grouped_by = Some(name.to_string());
            parent.sub_workstreams.push(sub);
        }
        if !core.is_empty() {
            let order: HashMap<IssueIdx, usize> =
                parent.issues.iter().enumerate().map(|(p, &i)| (i, p)).collect();
            core.sort_by_key(|i| order.get(i).copied().unwrap_or(usize::MAX));
            let mut sub = self.section(CORE_NAME, core);
            sub.depth = 1;
            parent.sub_workstreams.push(sub);
        }
    }

    fn by_priority(&self) -> Vec<Workstream> {
        let mut groups: [Vec<IssueIdx>; 4] = Default::default();
        for &idx in self.primaries {
            groups[priority_bucket(self.catalog.issue(idx).priority)].push(idx);
        }
        PRIORITY_BUCKETS
            .iter()
            .zip(groups)
            .filter(|(_, members)| !members.is_empty())
            .map(|(name, members)| self.section(name, members))
            .collect()
    }

    fn by_status(&self) -> Vec<Workstream> {
        const ORDER: [EffectiveStatus; 4] = [
            EffectiveStatus::Ready,
            EffectiveStatus::InProgress,
            EffectiveStatus::Blocked,
            EffectiveStatus::Closed,
        ];
        let mut groups: [Vec<IssueIdx>; 4] = Default::default();
        for &idx in self.primaries {
            let status = self.index.effective_status(idx);
            if let Some(slot) = ORDER.iter().position(|s| *s == status) {
                groups[slot].push(idx);
            }
        }
        ORDER
            .iter()
            .zip(groups)
            .filter(|(_, members)| !members.is_empty())
            .map(|(status, members)| self.section(status_group_name(*status), members))
            .collect()
    }
}
