use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

use crate::error::SessionError;
use crate::models::{
    AnswerSubmission, AttemptState, CountdownSnapshot, Question, QuestionTelemetry,
    TestDefinition, TestResult, TestSubmission,
};
use crate::services::answer_store::AnswerStore;
use crate::services::countdown::CountdownController;
use crate::services::telemetry_recorder::TelemetryRecorder;
use crate::services::test_api::TestApi;

/// Terminal and timer events delivered to the surrounding UI over the
/// session's event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TimerTick(CountdownSnapshot),
    TimeExpired,
    SessionStartFailed { message: String },
    SubmissionSucceeded { attempt_id: i64 },
    SubmissionFailed { message: String },
    SessionExpired,
}

/// Result of consuming one clock second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session is not in an active, non-submitting state; nothing counted.
    Suspended,
    /// Telemetry and countdown advanced by one second.
    Running,
    /// This tick exhausted the countdown; an implicit submit is due.
    Expired,
}

struct SessionState {
    test: Option<TestDefinition>,
    attempt: AttemptState,
    idempotency_key: Option<String>,
    current_index: usize,
    answers: AnswerStore,
    telemetry: TelemetryRecorder,
    countdown: Option<CountdownController>,
    submitting: bool,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            test: None,
            attempt: AttemptState::Absent,
            idempotency_key: None,
            current_index: 0,
            answers: AnswerStore::new(),
            telemetry: TelemetryRecorder::new(),
            countdown: None,
            submitting: false,
        }
    }

    /// Drop per-attempt state, keeping the loaded test.
    fn reset_attempt(&mut self) {
        self.attempt = AttemptState::Absent;
        self.idempotency_key = None;
        self.current_index = 0;
        self.answers.clear();
        self.telemetry.clear();
        self.countdown = None;
        self.submitting = false;
    }
}

/// Owns an in-progress test attempt from creation to submission: the attempt
/// state machine, the current-question pointer, the answer map, behavioral
/// telemetry, and the countdown.
///
/// All mutation funnels through this type; the surrounding views hold it via
/// `Arc` and read through the accessor methods. `begin` and `submit` are the
/// only suspending operations.
pub struct TestSession {
    api: Arc<dyn TestApi>,
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl TestSession {
    /// Create a session over the given remote test service. The returned
    /// receiver is the UI's event feed; dropping it silently discards
    /// further events.
    pub fn new(api: Arc<dyn TestApi>) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            api,
            state: Mutex::new(SessionState::fresh()),
            events,
        });
        (session, receiver)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // Receiver may be gone (view dismissed); that is not an error here.
        let _ = self.events.send(event);
    }

    /// Load the test to be taken, replacing any previous session state.
    pub fn set_test(&self, test: TestDefinition) {
        let mut state = self.state();
        state.reset_attempt();
        tracing::info!(
            "Test loaded: test_id={}, questions={}",
            test.id,
            test.questions.len()
        );
        state.test = Some(test);
    }

    /// Clear the whole session, the loaded test included.
    pub fn reset(&self) {
        let mut state = self.state();
        state.reset_attempt();
        state.test = None;
    }

    /// Create the server-side attempt for the loaded test.
    ///
    /// Idempotent while an attempt is active, and single-flight while
    /// creation is pending: re-entrant calls (e.g. duplicate effect runs)
    /// collapse into the one in-flight request instead of creating a second
    /// attempt. After a successful submission a new attempt is created for
    /// the same test.
    pub async fn begin(&self) -> Result<(), SessionError> {
        let (test_id, duration_minutes) = {
            let mut state = self.state();
            let test = state.test.as_ref().ok_or(SessionError::NoActiveTest)?;
            let ids = (test.id, test.duration_minutes);
            match state.attempt {
                AttemptState::Active { .. } | AttemptState::PendingCreation => return Ok(()),
                AttemptState::Absent => {}
                AttemptState::Submitted { .. } => state.reset_attempt(),
            }
            state.attempt = AttemptState::PendingCreation;
            ids
        };

        match self.api.start(test_id).await {
            Ok(attempt_id) => {
                let mut state = self.state();
                if state.attempt != AttemptState::PendingCreation {
                    // Session was reset while the request was in flight.
                    tracing::warn!(
                        "Discarding attempt created for a torn-down session: attempt_id={}",
                        attempt_id
                    );
                    return Ok(());
                }
                state.attempt = AttemptState::Active { attempt_id };
                state.idempotency_key = Some(Uuid::new_v4().to_string());
                state.countdown = Some(CountdownController::new(duration_minutes));
                tracing::info!(
                    "Attempt active: test_id={}, attempt_id={}, duration={}min",
                    test_id,
                    attempt_id,
                    duration_minutes
                );
                Ok(())
            }
            Err(source) => {
                let mut state = self.state();
                if state.attempt == AttemptState::PendingCreation {
                    // Release the guard so the user can retry explicitly.
                    state.attempt = AttemptState::Absent;
                }
                drop(state);
                tracing::warn!(
                    "Attempt creation failed: test_id={}, error={}",
                    test_id,
                    source
                );
                self.emit(SessionEvent::SessionStartFailed {
                    message: source.to_string(),
                });
                Err(SessionError::SessionStartFailed { source })
            }
        }
    }

    /// Move the current-question pointer. Out-of-range indices are ignored;
    /// answers and telemetry are unaffected.
    pub fn navigate(&self, index: usize) {
        let mut state = self.state();
        let count = state.test.as_ref().map(|t| t.questions.len()).unwrap_or(0);
        if index < count {
            state.current_index = index;
        }
    }

    /// Record a selection: updates the answer map and the question's
    /// selection-change counter synchronously, so a following `submit`
    /// always observes it.
    pub fn select_answer(&self, question_id: i64, option_index: usize) {
        let mut state = self.state();
        state.answers.set(question_id, option_index);
        state.telemetry.on_answer_change(question_id);
    }

    pub fn record_hover(&self, question_id: i64) {
        self.state().telemetry.on_option_hover(question_id);
    }

    /// Submit the attempt. At most one submission is in flight at a time;
    /// a re-entrant call while one is unresolved is a no-op returning
    /// `Ok(None)`.
    ///
    /// On success the attempt transitions to submitted and its graded result
    /// is returned. A failure the server signals as "attempt/test not found"
    /// clears the whole session and surfaces [`SessionError::SessionExpired`];
    /// any other failure preserves state for a manual retry.
    pub async fn submit(&self) -> Result<Option<TestResult>, SessionError> {
        let submission = {
            let mut state = self.state();
            if state.submitting {
                tracing::debug!("Ignoring re-entrant submit; one is already in flight");
                return Ok(None);
            }
            let attempt_id = match state.attempt {
                AttemptState::Active { attempt_id } => attempt_id,
                _ => return Err(SessionError::NoActiveAttempt),
            };
            let test = state.test.as_ref().ok_or(SessionError::NoActiveAttempt)?;
            let answers = build_answers(test, &state.answers, &state.telemetry);
            let idempotency_key = state.idempotency_key.clone();
            state.submitting = true;
            TestSubmission {
                attempt_id,
                idempotency_key,
                answers,
            }
        };

        tracing::info!(
            "Submitting attempt: attempt_id={}, answered={}",
            submission.attempt_id,
            submission
                .answers
                .iter()
                .filter(|a| a.selected_option_id.is_some())
                .count()
        );

        match self.api.submit(&submission).await {
            Ok(result) => {
                let mut state = self.state();
                state.submitting = false;
                state.attempt = AttemptState::Submitted {
                    attempt_id: submission.attempt_id,
                };
                state.countdown = None;
                drop(state);
                self.emit(SessionEvent::SubmissionSucceeded {
                    attempt_id: submission.attempt_id,
                });
                Ok(Some(result))
            }
            Err(source) if source.is_session_invalid() => {
                tracing::warn!(
                    "Server no longer recognizes attempt {}; clearing session",
                    submission.attempt_id
                );
                {
                    let mut state = self.state();
                    state.reset_attempt();
                    state.test = None;
                }
                self.emit(SessionEvent::SessionExpired);
                Err(SessionError::SessionExpired)
            }
            Err(source) => {
                // Keep everything so no answers are lost on retry.
                self.state().submitting = false;
                tracing::warn!(
                    "Submission failed: attempt_id={}, error={}",
                    submission.attempt_id,
                    source
                );
                self.emit(SessionEvent::SubmissionFailed {
                    message: source.to_string(),
                });
                Err(SessionError::SubmissionFailed { source })
            }
        }
    }

    /// Consume one clock second: attribute it to the currently displayed
    /// question and advance the countdown. Inert unless the attempt is
    /// active and no submission is in flight.
    ///
    /// [`spawn_ticker`](Self::spawn_ticker) drives this from a 1 Hz task;
    /// embedders with their own clock may call it directly, and must treat
    /// [`TickOutcome::Expired`] as an implicit submit request.
    pub fn tick(&self) -> TickOutcome {
        let (event, outcome) = {
            let mut state = self.state();
            if state.submitting || !state.attempt.is_active() {
                return TickOutcome::Suspended;
            }

            // Read the displayed question now, not when the tick was
            // scheduled: a mid-second navigation attributes this whole
            // second to the new question.
            let active_question_id = state
                .test
                .as_ref()
                .and_then(|t| t.questions.get(state.current_index))
                .map(|q| q.id);
            if let Some(question_id) = active_question_id {
                state.telemetry.tick(question_id);
            }

            match state.countdown.as_mut() {
                Some(countdown) => {
                    let expired = countdown.tick();
                    let snapshot = countdown.snapshot();
                    if expired {
                        (Some((snapshot, true)), TickOutcome::Expired)
                    } else {
                        (Some((snapshot, false)), TickOutcome::Running)
                    }
                }
                None => (None, TickOutcome::Running),
            }
        };

        if let Some((snapshot, expired)) = event {
            self.emit(SessionEvent::TimerTick(snapshot));
            if expired {
                tracing::info!("Time is up; triggering implicit submit");
                self.emit(SessionEvent::TimeExpired);
            }
        }
        outcome
    }

    /// Spawn the 1 Hz tick task (interval shortened in tests via config).
    /// On expiry it drives the same submission path as an explicit user
    /// submit and then stops. The returned guard aborts the task when
    /// dropped; keeping it alive past the owning view leaks ticks into a
    /// dismissed session.
    pub fn spawn_ticker(self: &Arc<Self>, tick_interval: Duration) -> TickerGuard {
        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                sleep(tick_interval).await;
                if session.tick() == TickOutcome::Expired {
                    if let Err(error) = session.submit().await {
                        tracing::warn!("Auto-submit on expiry failed: {}", error);
                    }
                    break;
                }
            }
        });
        TickerGuard { handle }
    }

    // ---- accessors for the presentation layer ----

    pub fn current_index(&self) -> usize {
        self.state().current_index
    }

    pub fn question_count(&self) -> usize {
        self.state()
            .test
            .as_ref()
            .map(|t| t.questions.len())
            .unwrap_or(0)
    }

    pub fn current_question(&self) -> Option<Question> {
        let state = self.state();
        state
            .test
            .as_ref()
            .and_then(|t| t.questions.get(state.current_index))
            .cloned()
    }

    pub fn selected_option(&self, question_id: i64) -> Option<usize> {
        self.state().answers.get(question_id)
    }

    pub fn is_answered(&self, question_id: i64) -> bool {
        self.state().answers.is_answered(question_id)
    }

    /// Answer count for the pre-submission confirmation dialog.
    pub fn answered_count(&self) -> usize {
        self.state().answers.answered_count()
    }

    pub fn telemetry(&self, question_id: i64) -> QuestionTelemetry {
        self.state().telemetry.get(question_id)
    }

    pub fn countdown(&self) -> Option<CountdownSnapshot> {
        self.state().countdown.as_ref().map(|c| c.snapshot())
    }

    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    pub fn attempt_id(&self) -> Option<i64> {
        self.state().attempt.attempt_id()
    }

    pub fn is_active(&self) -> bool {
        self.state().attempt.is_active()
    }
}

/// Snapshot the answer map and telemetry into the submission payload, one
/// record per question in test order. An answer index that no longer maps to
/// an option is treated as unanswered.
fn build_answers(
    test: &TestDefinition,
    answers: &AnswerStore,
    telemetry: &TelemetryRecorder,
) -> Vec<AnswerSubmission> {
    test.questions
        .iter()
        .map(|question| {
            let selected_option_id = answers
                .get(question.id)
                .and_then(|index| question.options.get(index))
                .map(|option| option.id);
            let counters = telemetry.get(question.id);
            AnswerSubmission {
                question_id: question.id,
                selected_option_id,
                time_spent_seconds: counters.time_spent_seconds,
                selection_change_count: counters.selection_change_count,
                hover_count: counters.hover_count,
            }
        })
        .collect()
}

/// Cancels the spawned tick task on drop so no tick outlives its session
/// view.
pub struct TickerGuard {
    handle: JoinHandle<()>,
}

impl TickerGuard {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
