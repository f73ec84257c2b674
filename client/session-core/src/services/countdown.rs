use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::time::sleep;

use crate::models::CountdownSnapshot;

/// Converts a fixed test duration into a decrementing remaining-time value
/// with a one-shot expiry signal. The controller is clock-agnostic: the
/// owner calls [`tick`](Self::tick) once per elapsed second.
#[derive(Debug, Clone)]
pub struct CountdownController {
    total_seconds: u32,
    remaining_seconds: u32,
    expired: bool,
}

impl CountdownController {
    pub fn new(duration_minutes: u32) -> Self {
        let total_seconds = duration_minutes * 60;
        Self {
            total_seconds,
            remaining_seconds: total_seconds,
            expired: false,
        }
    }

    /// Consume one elapsed second. Returns `true` exactly once, on the tick
    /// that brings the remaining time to zero; every later call is inert.
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.expired = true;
            return true;
        }
        false
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
        }
    }
}

/// Detached display feed: one snapshot per tick interval until the countdown
/// runs out, ending with the zero snapshot. For UIs that only render the
/// clock and leave expiry handling to the session.
pub fn snapshot_stream(
    duration_minutes: u32,
    tick_interval: Duration,
) -> impl Stream<Item = CountdownSnapshot> {
    stream::unfold(
        CountdownController::new(duration_minutes),
        move |mut countdown| async move {
            if countdown.is_expired() {
                return None;
            }
            sleep(tick_interval).await;
            countdown.tick();
            Some((countdown.snapshot(), countdown))
        },
    )
}
