//! Position tracker.
//!
//! Keeps the positions of the active account:
//! - Backfill of the recent block window on activation
//! - Live appends from the event feed
//! - Stale-result guard across account changes

mod backfill;
mod position_tracker;
mod session;

pub use backfill::BackfillOutcome;
pub use position_tracker::*;
pub use session::*;
