use crate::ack::AckHandle;

/// The narrow surface a transport needs to implement reliable delivery:
/// register interest in an ack before sending, signal it when the matching
/// ack frame arrives.
pub trait AckHandler: Send + Sync {
    /// Registers a pending ack for `id`, or joins the one already pending.
    fn create_ack(&self, id: &str) -> AckHandle;

    /// Resolves the pending ack for `id` as acknowledged. Returns `false` if
    /// nothing was pending under that id, which is expected for duplicate or
    /// late acks.
    fn trigger_ack(&self, id: &str) -> bool;
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{AckOutcome, AckTracker, AckTrackerConfig};

    /// Sends every message on a channel and waits for the peer to ack it.
    async fn send_reliable<H: AckHandler>(
        handler: &H,
        wire: &mpsc::UnboundedSender<String>,
        id: &str,
    ) -> AckOutcome {
        let handle = handler.create_ack(id);
        wire.send(id.to_owned()).expect("peer is gone");
        handle.await
    }

    #[tokio::test]
    async fn test_transport_round_trip() {
        let tracker = Arc::new(
            AckTracker::new(AckTrackerConfig::default().enable_timeout_sweep(false)).unwrap(),
        );
        let (wire, mut peer) = mpsc::unbounded_channel::<String>();

        let receiver = tracker.clone();
        tokio::spawn(async move {
            while let Some(id) = peer.recv().await {
                assert!(receiver.trigger_ack(&id));
            }
        });

        for id in ["a", "b", "c"] {
            let outcome = send_reliable(tracker.as_ref(), &wire, id).await;
            assert_eq!(outcome, AckOutcome::Acknowledged);
        }
        assert_eq!(tracker.pending(), 0);
    }
}
