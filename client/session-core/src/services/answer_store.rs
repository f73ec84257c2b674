use std::collections::HashMap;

/// Mapping from question id to the selected option index (0-based position
/// within that question's option list). Absence means unanswered.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<i64, usize>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite semantics: last write wins. History lives in telemetry, not
    /// here.
    pub fn set(&mut self, question_id: i64, option_index: usize) {
        self.answers.insert(question_id, option_index);
    }

    pub fn get(&self, question_id: i64) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    pub fn is_answered(&self, question_id: i64) -> bool {
        self.answers.contains_key(&question_id)
    }

    /// Used on full session reset only; individual answers are never removed.
    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_per_question() {
        let mut store = AnswerStore::new();
        store.set(1, 0);
        store.set(1, 2);
        store.set(1, 1);
        store.set(2, 3);

        assert_eq!(store.get(1), Some(1));
        assert_eq!(store.get(2), Some(3));
        assert_eq!(store.answered_count(), 2);
    }

    #[test]
    fn unanswered_question_is_absent() {
        let store = AnswerStore::new();
        assert_eq!(store.get(99), None);
        assert!(!store.is_answered(99));
        assert_eq!(store.answered_count(), 0);
    }

    #[test]
    fn clear_empties_the_map() {
        let mut store = AnswerStore::new();
        store.set(1, 0);
        store.set(2, 1);
        store.clear();
        assert_eq!(store.answered_count(), 0);
        assert_eq!(store.get(1), None);
    }
}
