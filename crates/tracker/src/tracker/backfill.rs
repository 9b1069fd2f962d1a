//! Historical backfill over the recent block window.

use super::position_tracker::PositionTracker;
use crate::errors::TrackerError;
use crate::notify::NotificationKind;
use alloy::primitives::Address;
use himera_chain::events::LiquidityAdded;
use himera_chain::raw_event::EventFilter;
use himera_domain::{BlockRange, Position};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

const FAILURE_TITLE: &str = "Error Loading Positions";
const FAILURE_MESSAGE: &str = "Failed to load your positions. Please try again.";

/// Result of a backfill pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillOutcome {
    /// Positions were published; holds the batch size.
    Published(usize),
    /// Another backfill is running.
    AlreadyLoading,
    /// No account is tracked.
    NoAccount,
    /// The account changed before the results were ready; they were dropped.
    Stale,
    /// The chain or the wallet could not be read; positions were cleared.
    Failed(TrackerError),
}

impl PositionTracker {
    /// Reloads the positions of the tracked account.
    pub async fn backfill(&self) -> BackfillOutcome {
        let (account, generation) = {
            let session = self.inner.session.read().await;
            let Some(account) = session.account else {
                return BackfillOutcome::NoAccount;
            };
            if !self.try_begin_load() {
                debug!(account = %account, "Backfill already running");
                return BackfillOutcome::AlreadyLoading;
            }
            (account, session.generation)
        };
        self.drive(account, generation).await
    }

    pub(crate) fn try_begin_load(&self) -> bool {
        self.inner.loading.send_if_modified(|loading| {
            if *loading {
                false
            } else {
                *loading = true;
                true
            }
        })
    }

    /// Runs a pass for `account`, then any pass deferred while it ran. Returns
    /// the outcome of the first pass.
    pub(crate) async fn drive(&self, account: Address, generation: u64) -> BackfillOutcome {
        let outcome = self.backfill_pass(account, generation).await;
        let mut next = self.finish_pass().await;
        while let Some((account, generation)) = next {
            let deferred = self.backfill_pass(account, generation).await;
            debug!(account = %account, outcome = ?deferred, "Deferred backfill finished");
            next = self.finish_pass().await;
        }
        outcome
    }

    /// Hands the loading flag to a deferred pass, or releases it.
    async fn finish_pass(&self) -> Option<(Address, u64)> {
        let mut session = self.inner.session.write().await;
        if std::mem::take(&mut session.backfill_pending) {
            if let Some(account) = session.account {
                return Some((account, session.generation));
            }
        }
        self.inner.loading.send_replace(false);
        drop(session);
        self.bump_revision();
        None
    }

    async fn backfill_pass(&self, account: Address, generation: u64) -> BackfillOutcome {
        match self.scan(account, generation).await {
            Ok(batch) => self.publish(account, generation, batch).await,
            Err(e) => self.fail(account, generation, e).await,
        }
    }

    async fn scan(&self, account: Address, generation: u64) -> Result<Vec<Position>, TrackerError> {
        let head = self.timed(self.chain().block_number()).await?;
        self.start_live_feed(account, generation, head.saturating_add(1))
            .await;

        let config = self.config();
        let ranges = BlockRange::lookback_window(head, config.lookback_blocks, config.range_blocks);
        let filter = EventFilter::add_liquidity(Some(account));
        info!(
            account = %account,
            head,
            ranges = ranges.len(),
            "Backfilling positions"
        );

        let mut raw_events = Vec::new();
        for range in ranges {
            debug!(range = %range, "Querying range");
            raw_events.extend(self.query_pools(&filter, range).await?);
        }
        debug!(events = raw_events.len(), "Backfill queries complete");

        let mut timestamps = HashMap::new();
        let mut positions = Vec::with_capacity(raw_events.len());
        for raw in &raw_events {
            let event = match LiquidityAdded::decode(raw, self.sources()) {
                Ok(event) if event.user == account => event,
                Ok(event) => {
                    warn!(user = %event.user, "Skipping event for another account");
                    continue;
                }
                Err(e) => {
                    warn!(
                        block = raw.block_number,
                        log_index = raw.log_index,
                        error = %e,
                        "Skipping undecodable event"
                    );
                    continue;
                }
            };
            match self.to_position(&event, &mut timestamps).await {
                Ok(position) => positions.push(position),
                Err(e) => warn!(
                    block = raw.block_number,
                    log_index = raw.log_index,
                    error = %e,
                    "Skipping event"
                ),
            }
        }
        Ok(positions)
    }

    async fn publish(
        &self,
        account: Address,
        generation: u64,
        batch: Vec<Position>,
    ) -> BackfillOutcome {
        match self.wallet_confirms(account).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(account = %account, "Discarding backfill for inactive wallet account");
                return BackfillOutcome::Stale;
            }
            Err(e) => return self.fail(account, generation, e).await,
        }

        let mut session = self.inner.session.write().await;
        if !session.is_current(account, generation) {
            debug!(account = %account, generation, "Discarding stale backfill");
            return BackfillOutcome::Stale;
        }
        let published = session.publish(batch);
        let total = session.positions.len();
        drop(session);

        info!(account = %account, published, total, "Positions loaded");
        self.bump_revision();
        BackfillOutcome::Published(published)
    }

    async fn fail(&self, account: Address, generation: u64, err: TrackerError) -> BackfillOutcome {
        let mut session = self.inner.session.write().await;
        if !session.is_current(account, generation) {
            debug!(account = %account, error = %err, "Ignoring failure of stale backfill");
            return BackfillOutcome::Stale;
        }
        session.clear_positions();
        drop(session);
        self.bump_revision();

        if err == TrackerError::ProviderUnavailable {
            warn!(account = %account, "No wallet provider, positions cleared");
        } else {
            error!(account = %account, error = %err, "Error loading positions");
            self.inner
                .notifier
                .notify(NotificationKind::Error, FAILURE_TITLE, FAILURE_MESSAGE);
        }
        BackfillOutcome::Failed(err)
    }
}
