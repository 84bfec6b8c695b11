// Session timer: whole-second elapsed time for the active practice run.

use serde::{Deserialize, Serialize};

/// Elapsed-time state for one practice session.
///
/// The timer itself holds no clock; the event loop delivers one `tick` per
/// wall-clock second while `running` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionTimer {
    pub elapsed_seconds: u64,
    pub running: bool,
}

impl SessionTimer {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Back to zero and stopped, regardless of current state.
    pub fn reset(&mut self) {
        *self = SessionTimer::default();
    }

    /// Advance one second. No-op while paused, so a late tick delivered
    /// just after a pause cannot drift the count.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_seconds += 1;
        }
    }

    /// Zero-padded `mm:ss` display form.
    pub fn format(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// Render a second count as zero-padded `mm:ss`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
