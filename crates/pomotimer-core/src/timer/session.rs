//! Countdown state machine.
//!
//! The session holds no clock and no thread. Callers pass the current time
//! into every command and call `tick()` once per elapsed second while the
//! timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --start--> Running --pause--> Paused
//!    ^                 |
//!    |  reset / skip   |  tick reaching 0
//!    +-----------------+-----> next phase (Running if auto_advance)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Phase, SessionPlan};
use crate::events::Event;
use crate::format::format_minutes_seconds;
use crate::history::NewHistoryEntry;

/// A session that ended by completion or skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedSession {
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl FinishedSession {
    pub fn to_history_entry(&self) -> NewHistoryEntry {
        NewHistoryEntry::new(self.started_at, self.ended_at)
    }
}

/// What the screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub display: String,
    pub remaining_secs: u64,
    pub is_running: bool,
    pub phase: Phase,
}

#[derive(Debug, Clone)]
pub struct TimerSession {
    plan: SessionPlan,
    phase: Phase,
    remaining_secs: u64,
    running: bool,
    /// First start of the current session; survives pauses.
    started_at: Option<DateTime<Utc>>,
    /// Focus sessions finished or skipped so far.
    completed_focus: u32,
}

impl Default for TimerSession {
    fn default() -> Self {
        Self::new(SessionPlan::default())
    }
}

impl TimerSession {
    /// Paused, at the start of a focus session.
    pub fn new(plan: SessionPlan) -> Self {
        let remaining_secs = plan.length_secs(Phase::Focus);
        Self {
            plan,
            phase: Phase::Focus,
            remaining_secs,
            running: false,
            started_at: None,
            completed_focus: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn display(&self) -> String {
        format_minutes_seconds(self.remaining_secs)
    }

    pub fn snapshot(&self) -> TimerView {
        TimerView {
            display: self.display(),
            remaining_secs: self.remaining_secs,
            is_running: self.running,
            phase: self.phase,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.started_at.get_or_insert(now);
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// One elapsed second. Completes the session when the countdown hits zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Some(Event::TimerTicked {
                remaining_secs: self.remaining_secs,
                at: now,
            });
        }

        let phase = self.phase;
        let finished = self.finish(now);
        self.advance();
        self.running = self.plan.auto_advance;
        if self.running {
            self.started_at = Some(now);
        }
        Some(Event::TimerCompleted {
            phase,
            next_phase: self.phase,
            finished,
            at: now,
        })
    }

    /// Stop and restore the full length of the current phase.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.running = false;
        self.started_at = None;
        self.remaining_secs = self.plan.length_secs(self.phase);
        Some(Event::TimerReset {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// End the current session early and move on to the next phase, stopped.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let phase = self.phase;
        let finished = self.finish(now);
        self.running = false;
        self.advance();
        Some(Event::TimerSkipped {
            phase,
            next_phase: self.phase,
            finished,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, now: DateTime<Utc>) -> Option<FinishedSession> {
        self.started_at.take().map(|started_at| FinishedSession {
            phase: self.phase,
            started_at,
            ended_at: now,
        })
    }

    fn advance(&mut self) {
        self.phase = match self.phase {
            Phase::Focus => {
                self.completed_focus += 1;
                if self.completed_focus % self.plan.pomodoros_before_long_break.max(1) == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.remaining_secs = self.plan.length_secs(self.phase);
    }
}
