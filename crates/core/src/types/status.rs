//! Job lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of a schedulable job.
///
/// Intake always creates jobs as [`JobStatus::Queued`]; the remaining states
/// are driven by the external schedule optimizer and by technician status
/// updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "job_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Queued,
    EnRoute,
    InProgress,
    PendingRevisit,
    Completed,
    Cancelled,
    PendingReview,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::EnRoute => write!(f, "en_route"),
            Self::InProgress => write!(f, "in_progress"),
            Self::PendingRevisit => write!(f, "pending_revisit"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::PendingReview => write!(f, "pending_review"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_queued() {
        assert_eq!(JobStatus::default(), JobStatus::Queued);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::EnRoute).unwrap(),
            "\"en_route\""
        );
        let back: JobStatus = serde_json::from_str("\"pending_revisit\"").unwrap();
        assert_eq!(back, JobStatus::PendingRevisit);
    }
}
