use thiserror::Error;

use crate::services::test_api::ApiError;

/// Failures surfaced by the session lifecycle operations.
///
/// Network-facing operations translate transport errors into this taxonomy;
/// pure local operations (navigation, answer selection, telemetry) never fail.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No test is loaded into the session. Caller routing bug; redirect to
    /// test selection instead of retrying.
    #[error("no test loaded for this session")]
    NoActiveTest,

    /// Attempt creation failed. Recoverable: the guard is released and a
    /// user-initiated `begin` may be retried.
    #[error("failed to start test session: {source}")]
    SessionStartFailed {
        #[source]
        source: ApiError,
    },

    /// `submit` was called without an active attempt. Logic error; must not
    /// be retried automatically.
    #[error("no active attempt to submit")]
    NoActiveAttempt,

    /// The server no longer recognizes the attempt or test. Local state has
    /// been cleared; the caller should redirect after showing the message.
    #[error("test session is no longer recognized by the server")]
    SessionExpired,

    /// Generic submission failure. Local state is preserved so no answers
    /// are lost; the caller may offer a manual retry.
    #[error("failed to submit test: {source}")]
    SubmissionFailed {
        #[source]
        source: ApiError,
    },
}
