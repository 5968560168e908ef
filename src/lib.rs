//! # ack_tracker
//!
//! A small coordination primitive for reliable delivery on top of a real-time
//! messaging transport. Before a message that needs an acknowledgment is sent,
//! the sender registers a pending ack under the message id and keeps the
//! returned [`AckHandle`]. When the transport receives the matching ack frame it
//! triggers the id and every handle for it resolves.
//!
//! Acks that never arrive must not leave their senders waiting forever, so a
//! background sweep cancels every ack that stays pending for longer than a
//! configurable threshold.
//!
//! ## Example usage
//!
//! ``` rust
//! use ack_tracker::{AckOutcome, AckTracker, AckTrackerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AckTrackerConfig::default()
//!         .ack_threshold(Duration::from_millis(100))
//!         .sweep_interval(Duration::from_millis(20));
//!     let tracker = AckTracker::new(config).expect("valid configuration");
//!
//!     // the peer acks this one
//!     let acked = tracker.create_ack("msg-1");
//!     assert!(tracker.trigger_ack("msg-1"));
//!     assert_eq!(acked.await, AckOutcome::Acknowledged);
//!
//!     // nobody acks this one, the sweep gives up after the threshold
//!     let lost = tracker.create_ack("msg-2");
//!     assert_eq!(lost.await, AckOutcome::TimedOut);
//!
//!     // late acks are not an error
//!     assert!(!tracker.trigger_ack("msg-2"));
//! }
//! ```
//!
//! ## Outcomes
//!
//! A handle resolves exactly once, to one of:
//! * [`AckOutcome::Acknowledged`]: the id was triggered.
//! * [`AckOutcome::TimedOut`]: the sweep found the ack older than the threshold.
//!   With a threshold `T` and a sweep interval `I` this happens between `T`
//!   and `T + I` after the ack was created.
//! * [`AckOutcome::Shutdown`]: the tracker was shut down or dropped while the
//!   ack was pending.
//!
//! Cancellation is an ordinary outcome, not an error. The only errors this
//! crate reports are configuration errors at construction time, see [`Error`].
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![warn(clippy::perf)]
#![warn(clippy::correctness)]

pub mod ack;
pub mod config;
pub mod error;
pub mod handler;
pub mod tracker;

pub use ack::{AckHandle, AckOutcome};
pub use config::AckTrackerConfig;
pub use error::Error;
pub use handler::AckHandler;
pub use tracker::AckTracker;
