use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of the server-issued attempt held by a session.
///
/// `PendingCreation` is the single-flight guard: while a creation request is
/// in flight, re-entrant `begin` calls collapse into it instead of issuing a
/// second request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Absent,
    PendingCreation,
    Active { attempt_id: i64 },
    Submitted { attempt_id: i64 },
}

impl AttemptState {
    pub fn attempt_id(&self) -> Option<i64> {
        match self {
            AttemptState::Active { attempt_id } | AttemptState::Submitted { attempt_id } => {
                Some(*attempt_id)
            }
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AttemptState::Active { .. })
    }
}

/// One entry of the submission payload, in test question order.
/// `selected_option_id` is `None` for unanswered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub time_spent_seconds: u32,
    pub selection_change_count: u32,
    pub hover_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSubmission {
    pub attempt_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub attempt_id: i64,
    pub score: i32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub unanswered: u32,
    pub percentage: f64,
    pub time_taken_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHistoryItem {
    pub attempt_id: i64,
    pub test_id: i64,
    pub score: i32,
    pub total_questions: u32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
