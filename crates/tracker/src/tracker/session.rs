//! Per-account session state.

use alloy::primitives::Address;
use himera_domain::{EventKey, PoolId, Position};
use std::collections::HashSet;
use tokio::task::JoinHandle;

/// State kept for the account currently being tracked.
#[derive(Debug, Default)]
pub struct TrackerSession {
    /// Tracked account.
    pub(crate) account: Option<Address>,
    /// Bumped on every account change; results tagged with an older value are stale.
    pub(crate) generation: u64,
    /// Positions in discovery order.
    pub(crate) positions: Vec<Position>,
    /// Keys of `positions`.
    pub(crate) seen: HashSet<EventKey>,
    /// Pool picked in the UI.
    pub(crate) selected_pool: PoolId,
    /// A backfill was requested while another one was running.
    pub(crate) backfill_pending: bool,
    /// Live feed task for this session.
    pub(crate) live_feed: Option<JoinHandle<()>>,
}

impl TrackerSession {
    /// Switches to `account`, discarding everything tied to the previous one.
    pub(crate) fn reset(&mut self, account: Option<Address>) {
        self.account = account;
        self.generation += 1;
        self.positions.clear();
        self.seen.clear();
        self.backfill_pending = false;
        self.stop_live_feed();
    }

    pub(crate) fn stop_live_feed(&mut self) {
        if let Some(feed) = self.live_feed.take() {
            feed.abort();
        }
    }

    /// Whether results produced for `account` at `generation` may still be shown.
    pub(crate) fn is_current(&self, account: Address, generation: u64) -> bool {
        self.generation == generation && self.account == Some(account)
    }

    /// Replaces the positions with a backfilled batch. Live positions that
    /// arrived while the batch was loading and are not part of it stay, after
    /// the batch.
    pub(crate) fn publish(&mut self, batch: Vec<Position>) -> usize {
        let mut seen = HashSet::with_capacity(batch.len());
        let mut positions = Vec::with_capacity(batch.len());
        for position in batch {
            if seen.insert(position.key()) {
                positions.push(position);
            }
        }
        let published = positions.len();

        for position in self.positions.drain(..) {
            if seen.insert(position.key()) {
                positions.push(position);
            }
        }

        self.positions = positions;
        self.seen = seen;
        published
    }

    /// Appends a live position unless it is already known.
    pub(crate) fn append(&mut self, position: Position) -> bool {
        if !self.seen.insert(position.key()) {
            return false;
        }
        self.positions.push(position);
        true
    }

    pub(crate) fn clear_positions(&mut self) {
        self.positions.clear();
        self.seen.clear();
    }
}

/// Read-only view of the tracker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSnapshot {
    /// Tracked account.
    pub account: Option<Address>,
    /// Positions in discovery order.
    pub positions: Vec<Position>,
    /// Whether a backfill is running.
    pub loading: bool,
    /// Pool picked in the UI.
    pub selected_pool: PoolId,
}
