//! Data models for the lens dashboard
//!
//! These models map directly to the beads JSONL issue records. Issues are
//! read-only for the whole lifetime of a dashboard.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// Status
// =============================================================================

/// Stored workflow status of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "" => Ok(Self::Open),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "closed" => Ok(Self::Closed),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Effective status
// =============================================================================

/// Status as displayed: an open issue with an open blocker reads as blocked.
///
/// The variant order is the display order used by every sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Ready,
    InProgress,
    Blocked,
    Closed,
}

impl EffectiveStatus {
    /// Sort rank: ready < in progress < blocked < closed.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Ready => 0,
            Self::InProgress => 1,
            Self::Blocked => 2,
            Self::Closed => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Issue type
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
    Epic,
    Chore,
}

impl IssueType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "task" | "" => Ok(Self::Task),
            "epic" => Ok(Self::Epic),
            "chore" => Ok(Self::Chore),
            other => Err(Error::InvalidIssueType(other.to_string())),
        }
    }
}

// =============================================================================
// Dependency
// =============================================================================

/// Edge kind carried on a dependency record.
///
/// Only `Blocks` and `ParentChild` feed the dashboard graphs; the others are
/// accepted so real beads exports load cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    #[default]
    #[serde(rename = "blocks", alias = "")]
    Blocks,
    #[serde(rename = "parent-child")]
    ParentChild,
    #[serde(rename = "related")]
    Related,
    #[serde(rename = "discovered-from")]
    DiscoveredFrom,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl DependencyKind {
    /// Whether this edge participates in the dashboard graphs.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Blocks | Self::ParentChild)
    }
}

/// An outgoing dependency read from the dependent issue's record.
///
/// `issue_id` depends on `depends_on_id`: for `Blocks` the target must close
/// first, for `ParentChild` the target is the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub issue_id: String,
    pub depends_on_id: String,
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Dependency {
    #[must_use]
    pub fn new(issue_id: impl Into<String>, depends_on_id: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            issue_id: issue_id.into(),
            depends_on_id: depends_on_id.into(),
            kind,
            created_at: None,
            created_by: None,
        }
    }
}

// =============================================================================
// Issue
// =============================================================================

/// A work item in the catalog.
///
/// # Constraints
/// - `id`: Unique across the catalog, non-empty.
/// - `title`: Non-empty.
/// - `priority`: Lower value means more urgent (0 is critical).
/// - `updated_at` is never before `created_at` when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl Issue {
    /// A task with default status and priority.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: Status::Open,
            priority: 2,
            issue_type: IssueType::Task,
            assignee: None,
            created_at: None,
            updated_at: None,
            closed_at: None,
            labels: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Record that `blocker` must close before this issue can progress.
    #[must_use]
    pub fn blocked_by(mut self, blocker: impl Into<String>) -> Self {
        let dep = Dependency::new(self.id.clone(), blocker, DependencyKind::Blocks);
        self.dependencies.push(dep);
        self
    }

    /// Record `parent` as this issue's parent.
    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        let dep = Dependency::new(self.id.clone(), parent, DependencyKind::ParentChild);
        self.dependencies.push(dep);
        self
    }

    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    #[must_use]
    pub const fn is_epic(&self) -> bool {
        matches!(self.issue_type, IssueType::Epic)
    }

    /// Check that the record is logically valid.
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |reason: &str| Error::InvalidIssue {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("issue ID cannot be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(invalid("issue title cannot be empty"));
        }
        if let (Some(created), Some(updated)) = (self.created_at, self.updated_at)
            && updated < created
        {
            return Err(invalid("updated_at cannot be before created_at"));
        }
        Ok(())
    }
}
