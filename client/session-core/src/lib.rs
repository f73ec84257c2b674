//! Client-side session engine for the PrepDeck exam-practice platform.
//!
//! Owns the in-progress test attempt (answer map, behavioral telemetry,
//! countdown, submission) on top of a remote test service that generates
//! and grades the tests. Presentation is out of scope: views hold a
//! [`TestSession`] and render from its accessors and event feed.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::SessionError;
pub use services::session_service::{SessionEvent, TestSession, TickOutcome, TickerGuard};
pub use services::test_api::{ApiError, HttpTestApi, TestApi};
