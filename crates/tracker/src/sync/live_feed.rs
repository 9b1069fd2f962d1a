//! Live event feed.

use crate::errors::TrackerError;
use crate::tracker::{LiveOutcome, PositionTracker};
use alloy::primitives::Address;
use himera_chain::raw_event::EventFilter;
use himera_domain::BlockRange;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

/// Polls the chain head and forwards new `AddLiquidity` events of one account
/// to the tracker.
///
/// A feed belongs to one tracker generation and stops once that generation is
/// no longer current.
pub struct LiveFeed {
    tracker: PositionTracker,
    account: Address,
    generation: u64,
    /// Next block to read.
    cursor: u64,
    filter: EventFilter,
}

impl LiveFeed {
    pub(crate) fn new(
        tracker: PositionTracker,
        account: Address,
        generation: u64,
        from_block: u64,
    ) -> Self {
        Self {
            tracker,
            account,
            generation,
            cursor: from_block,
            filter: EventFilter::add_liquidity(Some(account)),
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let mut ticker = interval(self.tracker.config().live_feed.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(0) => {}
                Ok(appended) => debug!(appended, cursor = self.cursor, "Live feed caught up"),
                Err(TrackerError::StaleResult) => {
                    debug!(account = %self.account, "Live feed stopped");
                    break;
                }
                Err(e) => warn!(error = %e, cursor = self.cursor, "Live feed poll failed"),
            }
        }
    }

    /// Reads events from the cursor up to the current head. Returns the number
    /// of positions appended.
    ///
    /// The cursor only moves past a sub-range once all of its events were
    /// handled, so a failed poll reads the same blocks again.
    pub async fn poll_once(&mut self) -> Result<usize, TrackerError> {
        if !self.tracker.is_current(self.account, self.generation).await {
            return Err(TrackerError::StaleResult);
        }

        let head = self.tracker.timed(self.tracker.chain().block_number()).await?;
        if head < self.cursor {
            return Ok(0);
        }

        let mut appended = 0;
        for range in BlockRange::split(self.cursor, head, self.tracker.config().range_blocks) {
            let mut events = self.tracker.query_pools(&self.filter, range).await?;
            events.sort_by_key(|e| (e.block_number, e.log_index));
            for event in &events {
                if self.tracker.on_live_event(event).await? == LiveOutcome::Appended {
                    appended += 1;
                }
            }
            self.cursor = range.to.saturating_add(1);
        }
        Ok(appended)
    }
}
