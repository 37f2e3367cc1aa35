//! Session history persisted inside the app document.
//!
//! Every operation is a whole-document read-modify-write through
//! [`AppDataStore`]. Reads treat a missing or unreadable document as an
//! empty history; writes start from the default document in that case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{AppData, AppDataStore, KeyValueStore, SqliteStore};

/// One finished (completed or skipped) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    /// Elapsed whole seconds, `end - start`.
    pub duration: u64,
}

/// A history entry before an id has been assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: u64,
}

impl NewHistoryEntry {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration: elapsed_secs(start, end),
        }
    }
}

fn elapsed_secs(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_seconds()).unwrap_or(0)
}

pub type History = Vec<HistoryEntry>;

/// Source of unique entry identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Aggregate numbers over the stored history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub sessions: u64,
    pub total_secs: u64,
    pub today_sessions: u64,
    pub today_secs: u64,
}

pub struct HistoryRepository<S> {
    data: AppDataStore<S>,
    ids: Box<dyn IdGenerator + Send>,
}

impl HistoryRepository<SqliteStore> {
    /// Repository over `<data_dir>/pomotimer.db` with uuid ids.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(SqliteStore::open()?))
    }
}

impl<S: KeyValueStore> HistoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_id_generator(store, UuidGenerator)
    }

    pub fn with_id_generator(store: S, ids: impl IdGenerator + Send + 'static) -> Self {
        Self {
            data: AppDataStore::new(store),
            ids: Box::new(ids),
        }
    }

    pub fn store(&self) -> &AppDataStore<S> {
        &self.data
    }

    /// Write the default document if none is stored yet.
    pub fn ensure_initialized(&self) {
        self.data.ensure_initialized();
    }

    fn load(&self) -> AppData {
        self.data.read().unwrap_or_default()
    }

    pub fn list(&self) -> History {
        self.load().history
    }

    pub fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.load().history.into_iter().find(|e| e.id == id)
    }

    /// Overwrite the whole sequence. Returns `false` if nothing was written.
    pub fn replace(&self, history: History) -> bool {
        let mut data = self.load();
        data.history = history;
        self.data.write(&data)
    }

    pub fn clear(&self) -> bool {
        self.replace(History::new())
    }

    /// Assign a fresh id and append the entry at the end.
    ///
    /// Returns `None` when the document could not be written.
    pub fn append(&mut self, entry: NewHistoryEntry) -> Option<HistoryEntry> {
        let mut data = self.load();

        let duration = elapsed_secs(entry.start, entry.end);
        if duration != entry.duration {
            tracing::warn!(
                supplied = entry.duration,
                computed = duration,
                "history entry duration disagrees with its timestamps, using end - start"
            );
        }

        let mut id = self.ids.next_id();
        while data.history.iter().any(|e| e.id == id) {
            tracing::warn!(%id, "generated history id already in use");
            id = self.ids.next_id();
        }

        let stored = HistoryEntry {
            id,
            start: entry.start,
            end: entry.end,
            duration,
        };
        data.history.push(stored.clone());
        if !self.data.write(&data) {
            return None;
        }
        tracing::debug!(id = %stored.id, duration, "appended history entry");
        Some(stored)
    }

    /// Remove the entry with `id`. Returns whether an entry was removed.
    pub fn remove_by_id(&self, id: &str) -> bool {
        let mut data = self.load();
        let before = data.history.len();
        data.history.retain(|e| e.id != id);
        if data.history.len() == before {
            return false;
        }
        self.data.write(&data)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> HistorySummary {
        let today = now.date_naive();
        self.list()
            .iter()
            .fold(HistorySummary::default(), |mut acc, entry| {
                acc.sessions += 1;
                acc.total_secs += entry.duration;
                if entry.end.date_naive() == today {
                    acc.today_sessions += 1;
                    acc.today_secs += entry.duration;
                }
                acc
            })
    }
}
