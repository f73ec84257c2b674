use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// AI-generated performance analysis for a submitted attempt, fetched after
/// the server finishes grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnalysis {
    pub attempt_id: i64,
    pub test_id: i64,
    pub overall_score: f64,
    pub total_questions: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unanswered_count: u32,
    pub accuracy_percentage: f64,
    pub total_time_spent_seconds: u32,
    pub topic_performances: Vec<TopicAnalysis>,
    #[serde(default)]
    pub mistake_type_counts: HashMap<String, u32>,
    pub ai_diagnostic_summary: String,
    pub synthesized_study_notes: String,
    #[serde(default)]
    pub strength_weakness_pairs: Vec<StrengthWeakness>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub topic_name: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
    pub avg_time_spent_seconds: f64,
    pub status: TopicStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicStatus {
    Mastered,
    NeedPractice,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthWeakness {
    pub point: String,
    pub strategy: String,
}
