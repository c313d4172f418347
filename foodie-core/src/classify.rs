//! Upcoming/past partition of meet-ups, kept current as data and time move.
//!
//! The partition is never stored. It is recomputed by one reducer,
//! [`classify`], whenever the store pushes a snapshot and on a fixed tick, so
//! a meet-up moves to "past" once its start time elapses even if nothing is
//! written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::meetup::MeetUpRecord;
use crate::store::{MeetUpStore, Subscription};
use crate::temporal;

pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Meet-ups split around an instant, each side in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub upcoming: Vec<MeetUpRecord>,
    pub past: Vec<MeetUpRecord>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

/// Split `records` into those starting at or after `now` and those before it.
pub fn classify(records: &[MeetUpRecord], now: NaiveDateTime) -> Classification {
    let (past, upcoming): (Vec<_>, Vec<_>) = records
        .iter()
        .cloned()
        .partition(|record| temporal::is_before(record.starts_at(), now));

    Classification { upcoming, past }
}

/// Keeps a live [`Classification`] for a store while mounted.
pub struct LifecycleClassifier {
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl LifecycleClassifier {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        LifecycleClassifier {
            clock,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Subscribe to `store` and start the tick. Both stop when the returned
    /// value is dropped. Must be called from within a tokio runtime.
    pub fn mount(&self, store: &MeetUpStore) -> MountedClassifier {
        let reducer = Arc::new(Reducer::new(self.clock.clone()));
        let updates = reducer.output.subscribe();

        let on_change = reducer.clone();
        let subscription = store.subscribe(move |records| on_change.replace(records));

        let on_tick = reducer.clone();
        let period = self.tick;
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick.reevaluate();
            }
        });

        tracing::debug!(collection = store.collection(), tick = ?period, "classifier mounted");

        MountedClassifier {
            _subscription: subscription,
            ticker,
            reducer,
            updates,
        }
    }
}

struct Reducer {
    clock: Arc<dyn Clock>,
    /// Cleared on unmount. Held while a result is published.
    active: Mutex<bool>,
    records: Mutex<Vec<MeetUpRecord>>,
    output: watch::Sender<Classification>,
    evaluations: AtomicU64,
}

impl Reducer {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Reducer {
            clock,
            active: Mutex::new(true),
            records: Mutex::new(Vec::new()),
            output: watch::channel(Classification::default()).0,
            evaluations: AtomicU64::new(0),
        }
    }

    fn replace(&self, records: Vec<MeetUpRecord>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
        self.reevaluate();
    }

    fn reevaluate(&self) {
        let now = self.clock.now();

        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !*active {
            return;
        }

        let next = {
            let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            classify(&records, now)
        };
        self.evaluations.fetch_add(1, Ordering::SeqCst);

        let changed = self.output.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });

        if changed {
            tracing::debug!(%now, "meet-up classification changed");
        }
    }

    /// Stop publishing. Waits for a publish already under way.
    fn close(&self) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// A classifier attached to a store. Dropping it (or calling
/// [`MountedClassifier::unmount`]) releases the subscription and stops the
/// tick on every exit path. Nothing is published after that returns, even by
/// a tick that was already running.
#[must_use = "dropping a MountedClassifier immediately unmounts it"]
pub struct MountedClassifier {
    _subscription: Subscription,
    ticker: JoinHandle<()>,
    reducer: Arc<Reducer>,
    updates: watch::Receiver<Classification>,
}

impl MountedClassifier {
    /// The latest partition.
    pub fn snapshot(&self) -> Classification {
        self.updates.borrow().clone()
    }

    /// Wait until the partition differs from the last one seen here.
    pub async fn changed(&mut self) -> Classification {
        // The sender lives in `self.reducer`, so this cannot fail while mounted.
        let _ = self.updates.changed().await;
        self.updates.borrow_and_update().clone()
    }

    /// A receiver for presentation code. It closes once this is unmounted.
    pub fn watch(&self) -> watch::Receiver<Classification> {
        self.updates.clone()
    }

    /// How many times the partition has been recomputed.
    pub fn evaluations(&self) -> u64 {
        self.reducer.evaluations.load(Ordering::SeqCst)
    }

    pub fn unmount(self) {}
}

impl Drop for MountedClassifier {
    fn drop(&mut self) {
        self.reducer.close();
        self.ticker.abort();
        tracing::debug!("classifier unmounted");
    }
}
