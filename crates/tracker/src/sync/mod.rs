//! Inputs that drive the tracker.
//!
//! - Account watcher: wallet pushes and the persisted store
//! - Live feed: new `AddLiquidity` events past the backfilled head

mod account_watcher;
mod live_feed;

pub use account_watcher::*;
pub use live_feed::*;
