//! Periodic callback on the tokio runtime.
//!
//! The callback lives in a replaceable slot shared with the scheduled task,
//! so swapping it never touches the schedule and the task always invokes
//! the most recent callback. Changing the interval cancels the running
//! chain and arms a new one.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Invoked once per period. Returning `Break` ends the chain.
pub type TickCallback = Box<dyn FnMut() -> ControlFlow<()> + Send>;

struct Chain {
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

pub struct Ticker {
    runtime: Handle,
    callback: Arc<Mutex<TickCallback>>,
    interval: Option<Duration>,
    chain: Option<Chain>,
}

impl Ticker {
    /// A disarmed ticker with a no-op callback.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            callback: Arc::new(Mutex::new(Box::new(|| ControlFlow::Continue(())))),
            interval: None,
            chain: None,
        }
    }

    /// Ticker on the runtime of the calling task.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| !c.task.is_finished())
    }

    /// Replace the callback and arm `interval`. `None` leaves the ticker idle.
    pub fn start<F>(&mut self, callback: F, interval: Option<Duration>)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.set_callback(callback);
        self.set_interval(interval);
    }

    /// Swap the callback. The next tick uses it; the schedule is untouched.
    ///
    /// Must not be called from inside the callback itself.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let mut slot = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Box::new(callback);
    }

    /// Re-arm with a new interval. Same interval while active is a no-op.
    pub fn set_interval(&mut self, interval: Option<Duration>) {
        if self.is_active() && self.interval == interval {
            return;
        }
        self.stop();
        self.interval = interval;

        let Some(period) = interval else {
            return;
        };
        // tokio rejects a zero period.
        let period = period.max(Duration::from_millis(1));

        let slot = Arc::clone(&self.callback);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = self.runtime.spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let mut callback = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if (*callback)().is_break() {
                    break;
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker armed");
        self.chain = Some(Chain { task, cancelled });
    }

    /// Cancel the schedule. No invocation starts after this returns.
    pub fn stop(&mut self) {
        self.interval = None;
        if let Some(chain) = self.chain.take() {
            chain.cancelled.store(true, Ordering::Release);
            // Wait out an invocation that is already running.
            drop(self.callback.lock().unwrap_or_else(PoisonError::into_inner));
            chain.task.abort();
            tracing::debug!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> ControlFlow<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn no_interval_never_fires() {
        let (count, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, None);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let (count, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, Some(Duration::from_millis(1000)));

        sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(2501)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let (count, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, Some(Duration::from_secs(1)));
        sleep(Duration::from_millis(2500)).await;
        ticker.stop();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!ticker.is_active());
        assert_eq!(ticker.interval(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_interval_reschedules() {
        let (count, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, Some(Duration::from_millis(1000)));
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        ticker.set_interval(Some(Duration::from_millis(500)));
        sleep(Duration::from_millis(1600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn same_interval_does_not_reschedule() {
        let (count, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, Some(Duration::from_millis(1000)));
        sleep(Duration::from_millis(900)).await;
        ticker.set_interval(Some(Duration::from_millis(1000)));
        sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_callback_used_on_next_tick() {
        let (first, cb) = counter();
        let mut ticker = Ticker::current();
        ticker.start(cb, Some(Duration::from_secs(1)));
        sleep(Duration::from_millis(1500)).await;

        let (second, cb) = counter();
        ticker.set_callback(cb);
        // Still on the original 1s grid: fires at 2s, not 2.5s.
        sleep(Duration::from_millis(700)).await;
        assert_eq!(second.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_chain() {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let mut ticker = Ticker::current();
        ticker.start(
            move || {
                if inner.fetch_add(1, Ordering::SeqCst) + 1 >= 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
            Some(Duration::from_secs(1)),
        );
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (count, cb) = counter();
        {
            let mut ticker = Ticker::current();
            ticker.start(cb, Some(Duration::from_secs(1)));
            sleep(Duration::from_millis(1500)).await;
        }
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
