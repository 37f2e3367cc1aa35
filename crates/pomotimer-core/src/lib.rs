//! # Pomotimer Core Library
//!
//! Business logic for the Pomotimer countdown. The CLI binary is a thin
//! screen over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a clock-free state machine; the caller supplies the time and
//!   calls `tick()` once per elapsed second while running
//! - **Ticker**: periodic callback on tokio with a replaceable callback slot
//! - **Storage**: one JSON document in a string key-value store (SQLite or
//!   in-memory) and TOML configuration
//! - **History**: finished focus sessions inside that document
//!
//! ## Key Components
//!
//! - [`TimerSession`]: countdown state machine
//! - [`TimerScreen`]: wires session, ticker and history together
//! - [`HistoryRepository`]: read/append/remove over the stored history
//! - [`AppDataStore`]: fail-soft JSON adapter over a [`KeyValueStore`]

pub mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod screen;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use error::{ConfigError, CoreError, FormatError, Result, StoreError};
pub use events::Event;
pub use format::{format_minutes_seconds, minutes_to_seconds, parse_minutes_seconds};
pub use history::{
    History, HistoryEntry, HistoryRepository, HistorySummary, IdGenerator, NewHistoryEntry,
    UuidGenerator,
};
pub use screen::TimerScreen;
pub use storage::{AppData, AppDataStore, Config, KeyValueStore, MemoryStore, ReadOutcome, SqliteStore};
pub use ticker::Ticker;
pub use timer::{Phase, SessionPlan, TimerSession, TimerView};
