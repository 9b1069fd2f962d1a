//! Prelude module for convenient imports.
//!
//! ```rust
//! use himera_tracker::prelude::*;
//! ```

// Config
pub use crate::config::{
    AccountWatcherConfig, LOOKBACK_BLOCKS, LiveFeedConfig, RANGE_BLOCKS, TrackerConfig,
};

// Errors
pub use crate::errors::TrackerError;

// Notifications
pub use crate::notify::{ConsoleNotifier, MultiNotifier, NotificationKind, Notifier};

// Store
pub use crate::store::{
    JsonFileStore, KeyValueStore, MemoryStore, SELECTED_POOL_KEY, StoreWallet,
    WALLET_ADDRESS_KEY, stored_account,
};

// Sync
pub use crate::sync::{AccountWatcher, LiveFeed};

// Tracker
pub use crate::tracker::{
    Activation, BackfillOutcome, IgnoreReason, LiveOutcome, PositionTracker, TrackerSession,
    TrackerSnapshot,
};
