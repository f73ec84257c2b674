#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};

use prepdeck_session::models::{
    Difficulty, Question, QuestionOption, QuestionType, Subject, TestAnalysis, TestDefinition,
    TestHistoryItem, TestRequest, TestResult, TestSubmission,
};
use prepdeck_session::{ApiError, SessionEvent, TestApi};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// In-process stand-in for the remote test service. Counts calls, captures
/// the last submission, and fails on cue.
pub struct ScriptedApi {
    start_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    start_delay: Duration,
    submit_delay: Duration,
    start_errors: Mutex<VecDeque<(u16, String)>>,
    submit_errors: Mutex<VecDeque<(u16, String)>>,
    last_submission: Mutex<Option<TestSubmission>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Self::with_delays(Duration::ZERO, Duration::ZERO)
    }

    /// Delays let tests hold a request in flight long enough to provoke
    /// re-entrant calls.
    pub fn with_delays(start_delay: Duration, submit_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            start_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            start_delay,
            submit_delay,
            start_errors: Mutex::new(VecDeque::new()),
            submit_errors: Mutex::new(VecDeque::new()),
            last_submission: Mutex::new(None),
        })
    }

    pub fn fail_next_start(&self, status: u16, message: &str) {
        self.start_errors
            .lock()
            .unwrap()
            .push_back((status, message.to_string()));
    }

    pub fn fail_next_submit(&self, status: u16, message: &str) {
        self.submit_errors
            .lock()
            .unwrap()
            .push_back((status, message.to_string()));
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<TestSubmission> {
        self.last_submission.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestApi for ScriptedApi {
    async fn start(&self, _test_id: i64) -> Result<i64, ApiError> {
        let n = self.start_calls.fetch_add(1, Ordering::SeqCst);
        if !self.start_delay.is_zero() {
            sleep(self.start_delay).await;
        }
        if let Some((status, message)) = self.start_errors.lock().unwrap().pop_front() {
            return Err(ApiError::Status { status, message });
        }
        Ok(100 + n as i64)
    }

    async fn submit(&self, submission: &TestSubmission) -> Result<TestResult, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.submit_delay.is_zero() {
            sleep(self.submit_delay).await;
        }
        if let Some((status, message)) = self.submit_errors.lock().unwrap().pop_front() {
            return Err(ApiError::Status { status, message });
        }
        *self.last_submission.lock().unwrap() = Some(submission.clone());

        let answered = submission
            .answers
            .iter()
            .filter(|a| a.selected_option_id.is_some())
            .count() as u32;
        let total = submission.answers.len() as u32;
        Ok(TestResult {
            attempt_id: submission.attempt_id,
            score: answered as i32,
            total_questions: total,
            correct_answers: answered,
            wrong_answers: 0,
            unanswered: total - answered,
            percentage: if total == 0 {
                0.0
            } else {
                answered as f64 / total as f64 * 100.0
            },
            time_taken_minutes: 0.5,
        })
    }

    async fn generate_test(&self, _request: &TestRequest) -> Result<TestDefinition, ApiError> {
        Err(not_scripted())
    }

    async fn get_test(&self, _test_id: i64) -> Result<TestDefinition, ApiError> {
        Err(not_scripted())
    }

    async fn get_history(&self) -> Result<Vec<TestHistoryItem>, ApiError> {
        Err(not_scripted())
    }

    async fn get_analysis(&self, _attempt_id: i64) -> Result<TestAnalysis, ApiError> {
        Err(not_scripted())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        Err(not_scripted())
    }
}

fn not_scripted() -> ApiError {
    ApiError::Status {
        status: 501,
        message: "not scripted".to_string(),
    }
}

fn question(id: i64, option_ids: &[i64]) -> Question {
    Question {
        id,
        question_text: format!("question {}", id),
        question_type: QuestionType::MultipleChoice,
        difficulty_level: Difficulty::Medium,
        subject: "Physics".to_string(),
        topic: Some("Mechanics".to_string()),
        explanation: None,
        options: option_ids
            .iter()
            .enumerate()
            .map(|(order, oid)| QuestionOption {
                id: *oid,
                text: format!("option {}", oid),
                is_correct: false,
                order: order as i32,
            })
            .collect(),
    }
}

/// Two-question fixture: question 1 with options 11/12, question 2 with
/// options 21/22.
pub fn sample_test(duration_minutes: u32) -> TestDefinition {
    TestDefinition {
        id: 7,
        title: "Mechanics practice".to_string(),
        description: None,
        subject: "Physics".to_string(),
        topic: Some("Mechanics".to_string()),
        difficulty: Difficulty::Medium,
        total_questions: 2,
        total_marks: 2,
        duration_minutes,
        created_at: Utc::now(),
        questions: vec![question(1, &[11, 12]), question(2, &[21, 22])],
    }
}

/// Await the next session event, failing loudly instead of hanging.
pub async fn next_event(receiver: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

/// Await the next event that is not a timer tick.
pub async fn next_terminal_event(receiver: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    loop {
        match next_event(receiver).await {
            SessionEvent::TimerTick(_) => continue,
            event => return event,
        }
    }
}
