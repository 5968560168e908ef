use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError, Weak,
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, trace};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{interval_at, Duration, Instant, MissedTickBehavior},
};

use crate::{
    ack::{AckHandle, AckOutcome, PendingAck},
    config::AckTrackerConfig,
    error::Result,
    handler::AckHandler,
};

type PendingAcks = DashMap<String, PendingAck>;

/// Start of the sweep when `now + sweep_interval` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Keeps track of acks that were requested but not yet received.
///
/// A sender calls [`AckTracker::create_ack`] before it transmits a message and
/// awaits the returned [`AckHandle`]; whoever receives the ack frame calls
/// [`AckTracker::trigger_ack`]. An ack is resolved exactly once: only the call
/// that removes its record from the map may resolve it, so a trigger racing
/// the sweep or a shutdown never resolves twice.
///
/// When the timeout sweep is enabled a background task spawned on the current
/// tokio runtime cancels acks older than the threshold. The sweep runs once
/// per interval, so an unacknowledged ack lives at most
/// `ack_threshold + sweep_interval`.
///
/// # Example
/// ```rust
/// use ack_tracker::{AckOutcome, AckTracker, AckTrackerConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let tracker = AckTracker::new(
///         AckTrackerConfig::default().ack_threshold(Duration::from_secs(5)),
///     )
///     .expect("valid configuration");
///
///     let handle = tracker.create_ack("msg-1");
///     // ... send the message, later the transport receives its ack
///     assert!(tracker.trigger_ack("msg-1"));
///
///     assert_eq!(handle.await, AckOutcome::Acknowledged);
/// }
/// ```
pub struct AckTracker {
    acks: Arc<PendingAcks>,
    config: AckTrackerConfig,
    sweep: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl AckTracker {
    /// Creates a tracker and, if enabled, starts its sweep on the current
    /// tokio runtime. Fails on a zero threshold or interval, or when the
    /// sweep is enabled outside of a runtime.
    pub fn new(config: AckTrackerConfig) -> Result<Self> {
        config.validate()?;

        let acks = Arc::new(PendingAcks::new());
        let sweep = if config.enable_timeout_sweep {
            let runtime = Handle::try_current()?;
            let now = Instant::now();
            let start = now
                .checked_add(config.sweep_interval)
                .unwrap_or_else(|| now + FAR_FUTURE);
            Some(runtime.spawn(run_sweep(
                Arc::downgrade(&acks),
                start,
                config.ack_threshold,
                config.sweep_interval,
            )))
        } else {
            trace!("Ack sweep disabled, pending acks only end by trigger or shutdown");
            None
        };

        Ok(AckTracker {
            acks,
            config,
            sweep: Mutex::new(sweep),
            closed: AtomicBool::new(false),
        })
    }

    /// Creates a tracker with the default configuration: sweep enabled, a
    /// threshold of one minute, sweeping every ten seconds.
    pub fn with_defaults() -> Result<Self> {
        Self::new(AckTrackerConfig::default())
    }

    pub fn config(&self) -> &AckTrackerConfig {
        &self.config
    }

    /// Registers a pending ack for `id` and returns a handle to its outcome.
    /// Calling this again while `id` is pending returns a handle to the same
    /// record. After [`AckTracker::shutdown`] the handle is already resolved
    /// as [`AckOutcome::Shutdown`].
    pub fn create_ack(&self, id: &str) -> AckHandle {
        if self.closed.load(Ordering::SeqCst) {
            return cancelled(id);
        }

        let handle = match self.acks.entry(id.to_owned()) {
            Entry::Occupied(entry) => {
                trace!("Ack {} is already pending, sharing its handle", id);
                entry.get().handle()
            }
            Entry::Vacant(entry) => {
                trace!("Registered pending ack {}", id);
                entry.insert(PendingAck::new(id)).handle()
            }
        };

        // a shutdown may have drained the map between the check and the insert
        if self.closed.load(Ordering::SeqCst) {
            if let Some((_, ack)) = self.acks.remove(id) {
                ack.resolve(AckOutcome::Shutdown);
            }
        }
        handle
    }

    /// Resolves the pending ack for `id` as acknowledged. Unknown, already
    /// triggered and already expired ids return `false` and change nothing.
    pub fn trigger_ack(&self, id: &str) -> bool {
        match self.acks.remove(id) {
            Some((_, ack)) => {
                trace!("Ack {} received after {:?}", id, ack.age());
                ack.resolve(AckOutcome::Acknowledged);
                true
            }
            None => {
                trace!("Received ack {} which is not pending (anymore)", id);
                false
            }
        }
    }

    /// Runs a single sweep pass now, cancelling every ack older than the
    /// threshold. Returns how many acks were cancelled.
    pub fn check_expired(&self) -> usize {
        expire(&self.acks, self.config.ack_threshold)
    }

    /// Number of acks currently pending.
    pub fn pending(&self) -> usize {
        self.acks.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.acks.contains_key(id)
    }

    /// Stops the sweep and cancels every pending ack as
    /// [`AckOutcome::Shutdown`], returning how many were cancelled. Acks
    /// created afterwards resolve as cancelled right away. Calling this more
    /// than once is harmless.
    pub fn shutdown(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);

        let sweep = self
            .sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sweep) = sweep {
            sweep.abort();
            debug!("Stopped the ack sweep");
        }

        let ids: Vec<String> = self.acks.iter().map(|entry| entry.key().clone()).collect();
        let mut cancelled = 0;
        for id in ids {
            if let Some((_, ack)) = self.acks.remove(&id) {
                ack.resolve(AckOutcome::Shutdown);
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!("Cancelled {} pending acks on shutdown", cancelled);
        }
        cancelled
    }
}

impl AckHandler for AckTracker {
    fn create_ack(&self, id: &str) -> AckHandle {
        AckTracker::create_ack(self, id)
    }

    fn trigger_ack(&self, id: &str) -> bool {
        AckTracker::trigger_ack(self, id)
    }
}

impl Drop for AckTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn cancelled(id: &str) -> AckHandle {
    let ack = PendingAck::new(id);
    let handle = ack.handle();
    ack.resolve(AckOutcome::Shutdown);
    handle
}

/// Removes and cancels every ack older than `threshold`. The age is checked
/// again under the entry lock, so an id triggered (or triggered and created
/// anew) since the scan is left alone.
fn expire(acks: &PendingAcks, threshold: Duration) -> usize {
    // removing while iterating would deadlock on the shard lock
    let expired: Vec<String> = acks
        .iter()
        .filter(|entry| entry.value().age() > threshold)
        .map(|entry| entry.key().clone())
        .collect();

    let mut count = 0;
    for id in expired {
        if let Some((_, ack)) = acks.remove_if(&id, |_, ack| ack.age() > threshold) {
            ack.resolve(AckOutcome::TimedOut);
            count += 1;
        }
    }
    if count > 0 {
        debug!(
            "Cancelled {} acks that were pending for longer than {:?}",
            count, threshold
        );
    }
    count
}

async fn run_sweep(
    acks: Weak<PendingAcks>,
    start: Instant,
    threshold: Duration,
    period: Duration,
) {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match acks.upgrade() {
            Some(acks) => {
                expire(&acks, threshold);
            }
            None => break,
        }
    }
    trace!("Ack sweep stopped, its tracker is gone");
}
