use serde::{Deserialize, Serialize};

use crate::utils::time::format_clock;

/// Remaining time falls below this boundary -> urgency styling on the caller
/// side. Advisory only, never a control-flow branch.
pub const LOW_TIME_BOUNDARY_SECONDS: u32 = 300;

/// Point-in-time view of the countdown, the display feed for the timer widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    pub remaining_seconds: u32,
    pub total_seconds: u32,
}

impl CountdownSnapshot {
    pub fn minutes(&self) -> u32 {
        self.remaining_seconds / 60
    }

    pub fn seconds(&self) -> u32 {
        self.remaining_seconds % 60
    }

    /// Fraction of the total duration still remaining, in percent.
    pub fn percent_remaining(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        (self.remaining_seconds as f64 / self.total_seconds as f64) * 100.0
    }

    pub fn is_low(&self) -> bool {
        self.remaining_seconds < LOW_TIME_BOUNDARY_SECONDS
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}
