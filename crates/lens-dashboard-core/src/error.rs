//! Error types for the lens dashboard
//!
//! The materialization pipeline itself never fails; these errors only surface
//! at the edges: parsing textual options, validating a loaded catalog, and
//! reading issue files.

use thiserror::Error;

/// Result type alias for lens dashboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the lens dashboard
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Lookup Errors
    // ==========================================================================
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Label not found: {0}")]
    LabelNotFound(String),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid issue {id}: {reason}")]
    InvalidIssue { id: String, reason: String },

    #[error("Duplicate issue id: {0}")]
    DuplicateIssueId(String),

    #[error("Invalid status: {0}. Expected one of open, in_progress, blocked, closed")]
    InvalidStatus(String),

    #[error("Invalid issue type: {0}. Expected one of epic, feature, task, bug, chore")]
    InvalidIssueType(String),

    #[error("Invalid depth: {0}. Expected 1, 2, 3, or all")]
    InvalidDepth(String),

    #[error("Invalid group-by mode: {0}. Expected label, priority, or status")]
    InvalidGroupBy(String),

    #[error("Invalid scope mode: {0}. Expected union or intersection")]
    InvalidScopeMode(String),

    #[error("Invalid view mode: {0}. Expected flat, workstream, or grouped")]
    InvalidViewMode(String),

    #[error("Invalid lens: {0}. Expected label:<name>, epic:<id>, or bead:<id>")]
    InvalidLens(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable tag for this error.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::IssueNotFound(_) => "ISSUE_NOT_FOUND",
            Self::LabelNotFound(_) => "LABEL_NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidIssue { .. } => "INVALID_ISSUE",
            Self::DuplicateIssueId(_) => "DUPLICATE_ISSUE_ID",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidIssueType(_) => "INVALID_ISSUE_TYPE",
            Self::InvalidDepth(_) => "INVALID_DEPTH",
            Self::InvalidGroupBy(_) => "INVALID_GROUP_BY",
            Self::InvalidScopeMode(_) => "INVALID_SCOPE_MODE",
            Self::InvalidViewMode(_) => "INVALID_VIEW_MODE",
            Self::InvalidLens(_) => "INVALID_LENS",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the caller can fix the input and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_mapping_exhaustive() {
        let cases: Vec<(Error, &str)> = vec![
            (Error::IssueNotFound("x".into()), "ISSUE_NOT_FOUND"),
            (Error::LabelNotFound("x".into()), "LABEL_NOT_FOUND"),
            (Error::InvalidArgument("x".into()), "INVALID_ARGUMENT"),
            (
                Error::InvalidIssue {
                    id: "a".into(),
                    reason: "empty title".into(),
                },
                "INVALID_ISSUE",
            ),
            (Error::DuplicateIssueId("a".into()), "DUPLICATE_ISSUE_ID"),
            (Error::InvalidStatus("x".into()), "INVALID_STATUS"),
            (Error::InvalidIssueType("x".into()), "INVALID_ISSUE_TYPE"),
            (Error::InvalidDepth("x".into()), "INVALID_DEPTH"),
            (Error::InvalidGroupBy("x".into()), "INVALID_GROUP_BY"),
            (Error::InvalidScopeMode("x".into()), "INVALID_SCOPE_MODE"),
            (Error::InvalidViewMode("x".into()), "INVALID_VIEW_MODE"),
            (Error::InvalidLens("x".into()), "INVALID_LENS"),
            (
                Error::Io(std::io::Error::other("disk")),
                "IO_ERROR",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.error_type(), expected, "wrong tag for {err:?}");
        }

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).error_type(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_recoverable_errors() {
        let recoverable = vec![
            Error::IssueNotFound("x".into()),
            Error::InvalidDepth("7".into()),
            Error::InvalidLens("nope".into()),
            Error::DuplicateIssueId("a".into()),
        ];
        for err in recoverable {
            assert!(err.is_recoverable(), "Error {err:?} should be recoverable");
        }
        let err = Error::Io(std::io::Error::other("disk"));
        assert!(!err.is_recoverable(), "Error {err:?} should not be recoverable");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::IssueNotFound("bd-1".into()).to_string(),
            "Issue not found: bd-1"
        );
        assert_eq!(
            Error::InvalidIssue {
                id: "bd-2".into(),
                reason: "title cannot be empty".into()
            }
            .to_string(),
            "Invalid issue bd-2: title cannot be empty"
        );
    }
}
