//! Configuration for the tracker and its adapters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocks scanned back from the chain head on backfill.
pub const LOOKBACK_BLOCKS: u64 = 200_000;
/// Blocks covered by a single log query.
pub const RANGE_BLOCKS: u64 = 50_000;

/// Configuration for the position tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Blocks scanned back from the head on backfill.
    pub lookback_blocks: u64,
    /// Blocks per log query.
    pub range_blocks: u64,
    /// Timeout applied to every chain and wallet call, in seconds.
    pub request_timeout_secs: u64,
    /// Whether results are re-checked against the wallet's current account.
    pub verify_wallet: bool,
    /// Live event feed.
    pub live_feed: LiveFeedConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lookback_blocks: LOOKBACK_BLOCKS,
            range_blocks: RANGE_BLOCKS,
            request_timeout_secs: 30,
            verify_wallet: true,
            live_feed: LiveFeedConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration for the live event feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveFeedConfig {
    /// Whether a feed is started for each tracked account.
    pub enabled: bool,
    /// Head polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for LiveFeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 4_000,
        }
    }
}

impl LiveFeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration for the account watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountWatcherConfig {
    /// Store polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for AccountWatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
        }
    }
}

impl AccountWatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
