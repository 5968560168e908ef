use std::{
    fmt::{self, Debug},
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_util::future::{FutureExt, Shared};
use tokio::{
    sync::oneshot,
    time::{Duration, Instant},
};

/// The terminal state of an ack. Every [`AckHandle`] resolves to exactly one
/// of these, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AckOutcome {
    /// The ack was triggered.
    Acknowledged,
    /// The ack stayed pending for longer than the configured threshold.
    TimedOut,
    /// The tracker shut down while the ack was pending.
    Shutdown,
}

impl AckOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, AckOutcome::Acknowledged)
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_acknowledged()
    }
}

/// Represents the eventual outcome of an `ack` as given back to the caller.
/// All handles for the same pending id share one completion, so they resolve
/// identically and at the same moment. Awaiting a handle never fails, a
/// cancelled ack is reported as [`AckOutcome::TimedOut`] or
/// [`AckOutcome::Shutdown`].
#[derive(Clone)]
pub struct AckHandle {
    id: Arc<str>,
    outcome: Shared<oneshot::Receiver<AckOutcome>>,
}

impl AckHandle {
    /// The id this handle waits on.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the outcome if the ack already resolved, without waiting.
    pub fn outcome(&self) -> Option<AckOutcome> {
        self.outcome
            .clone()
            .now_or_never()
            .map(|received| received.unwrap_or(AckOutcome::Shutdown))
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome().is_some()
    }
}

impl Future for AckHandle {
    type Output = AckOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // a dropped sender means the record went away together with its tracker
        self.outcome
            .poll_unpin(cx)
            .map(|received| received.unwrap_or(AckOutcome::Shutdown))
    }
}

impl Debug for AckHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AckHandle")
            .field("id", &self.id)
            .field("outcome", &self.outcome())
            .finish()
    }
}

/// The record the tracker keeps per outstanding id. Only the tracker holds it;
/// whoever removes it from the map is the one allowed to resolve it.
pub(crate) struct PendingAck {
    created_at: Instant,
    completion: oneshot::Sender<AckOutcome>,
    handle: AckHandle,
}

impl PendingAck {
    pub(crate) fn new(id: &str) -> Self {
        let (completion, receiver) = oneshot::channel();
        PendingAck {
            created_at: Instant::now(),
            completion,
            handle: AckHandle {
                id: Arc::from(id),
                outcome: receiver.shared(),
            },
        }
    }

    pub(crate) fn handle(&self) -> AckHandle {
        self.handle.clone()
    }

    pub(crate) fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Consumes the record, so it can only ever be resolved once.
    pub(crate) fn resolve(self, outcome: AckOutcome) {
        // every handle may already be gone, nobody is left to tell then
        let _ = self.completion.send(outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_resolve_reaches_all_handles() {
        let pending = PendingAck::new("msg");
        let first = pending.handle();
        let second = first.clone();

        assert_eq!(first.id(), "msg");
        assert!(!first.is_resolved());

        pending.resolve(AckOutcome::Acknowledged);

        assert_eq!(first.outcome(), Some(AckOutcome::Acknowledged));
        assert_eq!(first.await, AckOutcome::Acknowledged);
        assert_eq!(second.await, AckOutcome::Acknowledged);
    }

    #[tokio::test]
    async fn test_dropped_record_resolves_shutdown() {
        let pending = PendingAck::new("msg");
        let handle = pending.handle();
        drop(pending);

        assert_eq!(handle.await, AckOutcome::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_age() {
        let pending = PendingAck::new("msg");
        tokio::time::advance(Duration::from_millis(250)).await;

        assert!(pending.age() >= Duration::from_millis(250));
    }

    #[test]
    fn test_outcome_flags() {
        assert!(AckOutcome::Acknowledged.is_acknowledged());
        assert!(!AckOutcome::Acknowledged.is_cancelled());
        assert!(AckOutcome::TimedOut.is_cancelled());
        assert!(AckOutcome::Shutdown.is_cancelled());
    }
}
