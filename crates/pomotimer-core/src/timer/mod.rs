mod session;

pub use session::{FinishedSession, TimerSession, TimerView};

use serde::{Deserialize, Serialize};

/// Which kind of session the countdown is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

/// Session lengths in seconds plus the advance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    /// A long break follows every n-th focus session.
    pub pomodoros_before_long_break: u32,
    /// Keep running into the next phase after a countdown completes.
    pub auto_advance: bool,
}

impl SessionPlan {
    pub fn length_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for SessionPlan {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            pomodoros_before_long_break: 4,
            auto_advance: false,
        }
    }
}
