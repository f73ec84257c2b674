use std::collections::HashMap;

use crate::models::QuestionTelemetry;

/// Accumulates per-question behavioral counters for later analysis. Entries
/// are created lazily on first touch; a question never visited reads back as
/// all zeros.
#[derive(Debug, Clone, Default)]
pub struct TelemetryRecorder {
    entries: HashMap<i64, QuestionTelemetry>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute one elapsed second to the question displayed at the moment
    /// of the tick. Switching questions mid-second attributes the next whole
    /// tick to the new question.
    pub fn tick(&mut self, active_question_id: i64) {
        self.entries
            .entry(active_question_id)
            .or_default()
            .time_spent_seconds += 1;
    }

    /// Counts every selection action, re-selections of the same option
    /// included.
    pub fn on_answer_change(&mut self, question_id: i64) {
        self.entries
            .entry(question_id)
            .or_default()
            .selection_change_count += 1;
    }

    pub fn on_option_hover(&mut self, question_id: i64) {
        self.entries.entry(question_id).or_default().hover_count += 1;
    }

    pub fn get(&self, question_id: i64) -> QuestionTelemetry {
        self.entries.get(&question_id).copied().unwrap_or_default()
    }

    /// Sum of time spent across all questions; approximates wall-clock time
    /// in the active phase.
    pub fn total_time_seconds(&self) -> u32 {
        self.entries.values().map(|e| e.time_spent_seconds).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
