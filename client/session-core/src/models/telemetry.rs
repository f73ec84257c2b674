use serde::{Deserialize, Serialize};

/// Behavioral counters accumulated per question while a test is in progress.
/// All counters start at zero and only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTelemetry {
    /// Whole seconds during which the question was the displayed one.
    pub time_spent_seconds: u32,
    /// Number of selection actions on the question, re-selections included.
    pub selection_change_count: u32,
    /// Number of pointer-enter events on the question's options.
    pub hover_count: u32,
}
