pub mod answer_store;
pub mod countdown;
pub mod session_service;
pub mod telemetry_recorder;
pub mod test_api;

pub use answer_store::AnswerStore;
pub use countdown::CountdownController;
pub use session_service::{SessionEvent, TestSession, TickOutcome, TickerGuard};
pub use telemetry_recorder::TelemetryRecorder;
pub use test_api::{ApiError, HttpTestApi, TestApi};
