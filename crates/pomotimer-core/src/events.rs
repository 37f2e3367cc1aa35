use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{FinishedSession, Phase};

/// Every state change of the timer produces an Event.
/// The screen redraws from them; finished sessions feed the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the timer moved on to `next_phase`.
    TimerCompleted {
        phase: Phase,
        next_phase: Phase,
        finished: Option<FinishedSession>,
        at: DateTime<Utc>,
    },
    /// Session ended early by the user.
    TimerSkipped {
        phase: Phase,
        next_phase: Phase,
        finished: Option<FinishedSession>,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The session this event closed, if any.
    pub fn finished(&self) -> Option<&FinishedSession> {
        match self {
            Event::TimerCompleted { finished, .. } | Event::TimerSkipped { finished, .. } => {
                finished.as_ref()
            }
            _ => None,
        }
    }
}
