use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration of an [`crate::AckTracker`].
///
/// With the sweep enabled an unacknowledged ack is cancelled no earlier than
/// `ack_threshold` and no later than `ack_threshold + sweep_interval` after it
/// was created, since the sweep only looks at the map once per interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AckTrackerConfig {
    pub enable_timeout_sweep: bool,
    pub ack_threshold: Duration,
    pub sweep_interval: Duration,
}

impl Default for AckTrackerConfig {
    fn default() -> Self {
        Self {
            enable_timeout_sweep: true,
            ack_threshold: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

impl AckTrackerConfig {
    /// Enables or disables the background sweep. Without it pending acks only
    /// leave the tracker when they are triggered or the tracker shuts down.
    pub fn enable_timeout_sweep(mut self, enable: bool) -> Self {
        self.enable_timeout_sweep = enable;
        self
    }

    /// Maximum age a pending ack may reach before the sweep cancels it.
    pub fn ack_threshold(mut self, threshold: Duration) -> Self {
        self.ack_threshold = threshold;
        self
    }

    /// How often the sweep looks for expired acks.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Rejects a zero threshold or interval while sweeping, as either would
    /// turn the sweep into a busy loop or expire acks immediately.
    pub fn validate(&self) -> Result<()> {
        if !self.enable_timeout_sweep {
            return Ok(());
        }
        if self.ack_threshold.is_zero() {
            return Err(Error::InvalidAckThreshold(self.ack_threshold));
        }
        if self.sweep_interval.is_zero() {
            return Err(Error::InvalidSweepInterval(self.sweep_interval));
        }
        Ok(())
    }
}
