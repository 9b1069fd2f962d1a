//! Liquidity position history tracking.
//!
//! This crate keeps the list of `AddLiquidity` positions of the active
//! account up to date:
//! - Historical backfill over a bounded block window
//! - Live updates for newly mined events
//! - Stale-result protection when the active account changes
//! - Account observation from the persisted store and wallet pushes
//! - User-facing notifications on load failures

/// Prelude module for convenient imports.
pub mod prelude;

/// Tracker configuration.
pub mod config;
/// Error types.
pub mod errors;
/// Notification sinks.
pub mod notify;
/// Persisted key-value store.
pub mod store;
/// Account observation and live event feed.
pub mod sync;
/// Position tracker and its session state.
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;
