pub mod analysis;
pub mod attempt;
pub mod telemetry;
pub mod timer;

pub use analysis::{StrengthWeakness, TestAnalysis, TopicAnalysis, TopicStatus};
pub use attempt::{
    AnswerSubmission, AttemptState, AttemptStatus, TestHistoryItem, TestResult, TestSubmission,
};
pub use telemetry::QuestionTelemetry;
pub use test::{
    Difficulty, Question, QuestionOption, QuestionType, Subject, TestDefinition, TestRequest,
};
pub use timer::{CountdownSnapshot, LOW_TIME_BOUNDARY_SECONDS};
