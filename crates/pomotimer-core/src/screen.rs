//! The timer screen: wires the countdown, the ticker and the history.
//!
//! Built once per process with an explicit repository. User intents map to
//! session transitions; the ticker drives `tick()` once per second while
//! the session runs; finished focus sessions are appended to history.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;

use crate::events::Event;
use crate::history::{History, HistoryRepository, HistorySummary};
use crate::storage::KeyValueStore;
use crate::ticker::Ticker;
use crate::timer::{Phase, TimerSession, TimerView};

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Receives the view after every tick.
pub type ViewObserver = Box<dyn FnMut(&TimerView) + Send>;

struct ScreenState<S> {
    session: TimerSession,
    history: HistoryRepository<S>,
    observer: Option<ViewObserver>,
}

impl<S: KeyValueStore> ScreenState<S> {
    fn record(&mut self, event: Option<&Event>) {
        let Some(finished) = event.and_then(Event::finished) else {
            return;
        };
        if finished.phase != Phase::Focus {
            return;
        }
        if self.history.append(finished.to_history_entry()).is_none() {
            tracing::warn!("finished focus session was not saved");
        }
    }

    fn notify(&mut self) {
        let view = self.session.snapshot();
        if let Some(observer) = self.observer.as_mut() {
            observer(&view);
        }
    }
}

pub struct TimerScreen<S> {
    shared: Arc<Mutex<ScreenState<S>>>,
    ticker: Ticker,
}

fn lock<S>(shared: &Mutex<ScreenState<S>>) -> MutexGuard<'_, ScreenState<S>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: KeyValueStore + Send + 'static> TimerScreen<S> {
    /// Initializes the stored document before anything touches history.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new(session: TimerSession, history: HistoryRepository<S>) -> Self {
        history.ensure_initialized();
        let shared = Arc::new(Mutex::new(ScreenState {
            session,
            history,
            observer: None,
        }));

        let ticker = Ticker::current();
        let slot = Arc::clone(&shared);
        ticker.set_callback(move || {
            let mut state = lock(&slot);
            let event = state.session.tick(Utc::now());
            state.record(event.as_ref());
            state.notify();
            if state.session.is_running() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });

        Self { shared, ticker }
    }

    pub fn set_observer(&self, observer: impl FnMut(&TimerView) + Send + 'static) {
        lock(&self.shared).observer = Some(Box::new(observer));
    }

    pub fn view(&self) -> TimerView {
        lock(&self.shared).session.snapshot()
    }

    pub fn history(&self) -> History {
        lock(&self.shared).history.list()
    }

    pub fn summary(&self) -> HistorySummary {
        lock(&self.shared).history.summary(Utc::now())
    }

    pub fn remove_history_entry(&self, id: &str) -> bool {
        lock(&self.shared).history.remove_by_id(id)
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn start(&mut self) -> Option<Event> {
        let event = lock(&self.shared).session.start(Utc::now());
        if event.is_some() {
            tracing::debug!("timer started");
            // A chain that just completed a countdown may not have exited yet.
            self.ticker.stop();
            self.ticker.set_interval(Some(TICK_INTERVAL));
        }
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = lock(&self.shared).session.pause(Utc::now());
        self.ticker.stop();
        event
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = lock(&self.shared).session.reset(Utc::now());
        self.ticker.stop();
        event
    }

    /// End the session early; a started focus session goes into history.
    pub fn skip(&mut self) -> Option<Event> {
        let event = {
            let mut state = lock(&self.shared);
            let event = state.session.skip(Utc::now());
            state.record(event.as_ref());
            event
        };
        self.ticker.stop();
        event
    }

    /// Stop ticking. Call before the screen goes away.
    pub fn shutdown(&mut self) {
        self.ticker.stop();
    }
}
