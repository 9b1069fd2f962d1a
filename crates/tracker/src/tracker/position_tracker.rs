//! Position tracker.

use super::backfill::BackfillOutcome;
use super::session::{TrackerSession, TrackerSnapshot};
use crate::config::TrackerConfig;
use crate::errors::TrackerError;
use crate::notify::Notifier;
use crate::sync::LiveFeed;
use alloy::primitives::Address;
use himera_chain::errors::ChainError;
use himera_chain::events::LiquidityAdded;
use himera_chain::raw_event::{EventFilter, RawEvent};
use himera_chain::sources::PoolSources;
use himera_chain::{ChainReader, WalletProvider};
use himera_domain::{BlockRange, PoolId, Position};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of [`PositionTracker::activate`].
#[derive(Debug)]
pub enum Activation {
    /// The account was already tracked.
    Unchanged,
    /// No account: state cleared.
    Cleared,
    /// A backfill was started for the new account.
    Started(JoinHandle<BackfillOutcome>),
    /// A backfill was already running; it reruns for the new account once done.
    Deferred,
}

/// Why a live event was not appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No account is tracked.
    NoAccount,
    /// The event belongs to another account.
    OtherAccount,
    /// The active account changed while the event was processed.
    Stale,
    /// The payload or its block could not be read.
    Undecodable,
    /// The event is already shown.
    Duplicate,
}

/// Result of [`PositionTracker::on_live_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveOutcome {
    /// The position was added to the end of the list.
    Appended,
    /// The event was dropped.
    Ignored(IgnoreReason),
}

pub(crate) struct Inner {
    pub(crate) chain: Arc<dyn ChainReader>,
    pub(crate) wallet: Arc<dyn WalletProvider>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) sources: PoolSources,
    pub(crate) config: TrackerConfig,
    pub(crate) session: RwLock<TrackerSession>,
    /// Set while a backfill runs. At most one runs at a time.
    pub(crate) loading: watch::Sender<bool>,
    /// Bumped whenever the visible state changes.
    pub(crate) revision: watch::Sender<u64>,
}

/// Keeps the `AddLiquidity` positions of the active account.
///
/// Activating an account starts a backfill over the recent block window and a
/// live feed from the head onwards. Results computed for an account that is no
/// longer active are discarded.
#[derive(Clone)]
pub struct PositionTracker {
    pub(crate) inner: Arc<Inner>,
}

impl PositionTracker {
    /// Creates a tracker with no active account.
    pub fn new(
        chain: Arc<dyn ChainReader>,
        wallet: Arc<dyn WalletProvider>,
        notifier: Arc<dyn Notifier>,
        sources: PoolSources,
        config: TrackerConfig,
    ) -> Self {
        let (loading, _) = watch::channel(false);
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                chain,
                wallet,
                notifier,
                sources,
                config,
                session: RwLock::new(TrackerSession::default()),
                loading,
                revision,
            }),
        }
    }

    /// Makes `account` the active account.
    ///
    /// Re-activating the tracked account is a no-op. `None` clears all state.
    /// Any other account resets the positions and starts a backfill, or
    /// schedules one if a backfill is already running.
    pub async fn activate(&self, account: Option<Address>) -> Activation {
        let Some(account) = account else {
            self.deactivate().await;
            return Activation::Cleared;
        };

        let mut session = self.inner.session.write().await;
        if session.account == Some(account) {
            debug!(account = %account, "Account already tracked");
            return Activation::Unchanged;
        }

        session.reset(Some(account));
        let generation = session.generation;
        info!(account = %account, generation, "Tracking account");

        let activation = if self.try_begin_load() {
            let tracker = self.clone();
            Activation::Started(tokio::spawn(async move {
                tracker.drive(account, generation).await
            }))
        } else {
            session.backfill_pending = true;
            debug!(account = %account, "Backfill in flight, deferring");
            Activation::Deferred
        };
        drop(session);

        self.bump_revision();
        activation
    }

    /// Stops tracking: clears positions and stops the live feed.
    pub async fn deactivate(&self) {
        let mut session = self.inner.session.write().await;
        let had_state = session.account.is_some()
            || !session.positions.is_empty()
            || session.live_feed.is_some();
        session.reset(None);
        drop(session);

        if had_state {
            info!("Stopped tracking account");
            self.bump_revision();
        }
    }

    /// Handles an `AddLiquidity` event delivered by the live feed.
    ///
    /// Fails only when the wallet cannot be asked for its active account, so
    /// the caller can deliver the event again.
    pub async fn on_live_event(&self, raw: &RawEvent) -> Result<LiveOutcome, TrackerError> {
        let Some((account, generation)) = self.current().await else {
            return Ok(LiveOutcome::Ignored(IgnoreReason::NoAccount));
        };

        let event = match LiquidityAdded::decode(raw, &self.inner.sources) {
            Ok(event) => event,
            Err(e) => {
                warn!(block = raw.block_number, error = %e, "Ignoring undecodable live event");
                return Ok(LiveOutcome::Ignored(IgnoreReason::Undecodable));
            }
        };
        if event.user != account {
            debug!(user = %event.user, "Ignoring live event for another account");
            return Ok(LiveOutcome::Ignored(IgnoreReason::OtherAccount));
        }
        if !self.wallet_confirms(account).await? {
            return Ok(LiveOutcome::Ignored(IgnoreReason::Stale));
        }

        let position = match self.to_position(&event, &mut HashMap::new()).await {
            Ok(position) => position,
            Err(e) => {
                warn!(block = raw.block_number, error = %e, "Dropping live event");
                return Ok(LiveOutcome::Ignored(IgnoreReason::Undecodable));
            }
        };

        let mut session = self.inner.session.write().await;
        if !session.is_current(account, generation) {
            return Ok(LiveOutcome::Ignored(IgnoreReason::Stale));
        }
        if !session.append(position) {
            return Ok(LiveOutcome::Ignored(IgnoreReason::Duplicate));
        }
        drop(session);

        info!(
            account = %account,
            pool = %event.key.pool,
            block = event.key.block_number,
            "Live position appended"
        );
        self.bump_revision();
        Ok(LiveOutcome::Appended)
    }

    /// Current state.
    pub async fn snapshot(&self) -> TrackerSnapshot {
        let session = self.inner.session.read().await;
        TrackerSnapshot {
            account: session.account,
            positions: session.positions.clone(),
            loading: self.is_loading(),
            selected_pool: session.selected_pool,
        }
    }

    /// Positions in discovery order.
    pub async fn positions(&self) -> Vec<Position> {
        self.inner.session.read().await.positions.clone()
    }

    /// Positions of a single pool, in discovery order.
    pub async fn positions_for(&self, pool: PoolId) -> Vec<Position> {
        self.inner
            .session
            .read()
            .await
            .positions
            .iter()
            .filter(|p| p.pool == pool)
            .cloned()
            .collect()
    }

    pub async fn account(&self) -> Option<Address> {
        self.inner.session.read().await.account
    }

    /// Whether a backfill is running.
    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    pub async fn selected_pool(&self) -> PoolId {
        self.inner.session.read().await.selected_pool
    }

    pub async fn set_selected_pool(&self, pool: PoolId) {
        let mut session = self.inner.session.write().await;
        if session.selected_pool == pool {
            return;
        }
        session.selected_pool = pool;
        drop(session);
        debug!(pool = %pool, "Selected pool changed");
        self.bump_revision();
    }

    /// Receiver notified whenever the visible state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Waits until no backfill is running.
    pub async fn wait_idle(&self) {
        let mut loading = self.inner.loading.subscribe();
        let _ = loading.wait_for(|loading| !*loading).await;
    }

    pub(crate) fn sources(&self) -> &PoolSources {
        &self.inner.sources
    }

    pub(crate) fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub(crate) fn chain(&self) -> &dyn ChainReader {
        self.inner.chain.as_ref()
    }

    pub(crate) async fn current(&self) -> Option<(Address, u64)> {
        let session = self.inner.session.read().await;
        session.account.map(|account| (account, session.generation))
    }

    pub(crate) async fn is_current(&self, account: Address, generation: u64) -> bool {
        self.inner
            .session
            .read()
            .await
            .is_current(account, generation)
    }

    pub(crate) fn bump_revision(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    /// Runs a chain or wallet call under the request timeout.
    pub(crate) async fn timed<T, F>(&self, call: F) -> Result<T, ChainError>
    where
        F: Future<Output = Result<T, ChainError>>,
    {
        let timeout = self.inner.config.request_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }

    /// Queries both pools over `range`. Pool 1 events come first.
    pub(crate) async fn query_pools(
        &self,
        filter: &EventFilter,
        range: BlockRange,
    ) -> Result<Vec<RawEvent>, ChainError> {
        let sources = self.inner.sources;
        let chain = self.chain();
        let (mut events, pool2) = tokio::try_join!(
            self.timed(chain.query_events(sources.pool1, filter, range)),
            self.timed(chain.query_events(sources.pool2, filter, range)),
        )?;
        events.extend(pool2);
        Ok(events)
    }

    /// Whether the wallet still reports `account` as active. A missing wallet
    /// provider counts as no account; any other wallet error is returned.
    pub(crate) async fn wallet_confirms(&self, account: Address) -> Result<bool, TrackerError> {
        if !self.inner.config.verify_wallet {
            return Ok(true);
        }
        match self.timed(self.inner.wallet.current_account()).await {
            Ok(current) => {
                if current != Some(account) {
                    debug!(account = %account, current = ?current, "Wallet moved to another account");
                }
                Ok(current == Some(account))
            }
            Err(ChainError::ProviderUnavailable) => Ok(false),
            Err(e) => {
                warn!(account = %account, error = %e, "Wallet check failed");
                Err(TrackerError::QueryFailure(e))
            }
        }
    }

    /// Builds a position, fetching the block timestamp unless cached.
    pub(crate) async fn to_position(
        &self,
        event: &LiquidityAdded,
        timestamps: &mut HashMap<u64, u64>,
    ) -> Result<Position, TrackerError> {
        let block = event.key.block_number;
        let timestamp = match timestamps.get(&block) {
            Some(timestamp) => *timestamp,
            None => {
                let timestamp = self
                    .timed(self.chain().block_timestamp(block))
                    .await
                    .map_err(|e| {
                        TrackerError::DecodeFailure(format!("timestamp of block {block}: {e}"))
                    })?;
                timestamps.insert(block, timestamp);
                timestamp
            }
        };
        Position::from_event(
            event.key,
            timestamp,
            event.amount_a,
            event.amount_b,
            event.shares_minted,
        )
        .map_err(|e| TrackerError::DecodeFailure(e.to_string()))
    }

    /// Starts the live feed at `from_block` if `account` is still current.
    pub(crate) async fn start_live_feed(&self, account: Address, generation: u64, from_block: u64) {
        if !self.inner.config.live_feed.enabled {
            return;
        }
        let mut session = self.inner.session.write().await;
        if !session.is_current(account, generation) {
            return;
        }
        session.stop_live_feed();
        let feed = LiveFeed::new(self.clone(), account, generation, from_block);
        session.live_feed = Some(feed.spawn());
        debug!(account = %account, from_block, "Live feed started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LiveFeedConfig;
    use crate::notify::NotificationKind;
    use crate::testing::{Harness, add_liquidity};
    use alloy::primitives::Bytes;
    use rust_decimal_macros::dec;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    async fn started(activation: Activation) -> BackfillOutcome {
        match activation {
            Activation::Started(handle) => handle.await.unwrap(),
            other => panic!("expected a backfill, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_activation_backfills_both_pools() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool2, 700, 0, alice(), 3, 4));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 2, alice(), 10, 20));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 950, 0, bob(), 1, 1));

        let outcome = started(h.tracker.activate(Some(alice())).await).await;

        assert_eq!(outcome, BackfillOutcome::Published(2));
        let positions = h.tracker.positions().await;
        assert_eq!(positions[0].pool, PoolId::Pool1);
        assert_eq!(positions[0].total_value, dec!(0.3));
        assert_eq!(positions[1].pool, PoolId::Pool2);
        assert_eq!(positions[1].total_value, dec!(0.07));
        assert!(!h.tracker.is_loading());
        assert_eq!(h.tracker.positions_for(PoolId::Pool2).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reactivating_same_account_is_noop() {
        let h = Harness::new(1_000, Some(alice()));

        started(h.tracker.activate(Some(alice())).await).await;
        assert!(matches!(
            h.tracker.activate(Some(alice())).await,
            Activation::Unchanged
        ));

        assert_eq!(h.chain.head_calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_backfill_is_discarded() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool2, 950, 0, bob(), 2, 2));
        let gate = h.chain.hold(alice());

        let Activation::Started(first) = h.tracker.activate(Some(alice())).await else {
            panic!("expected a backfill");
        };
        h.wallet.set_accounts(vec![bob()]);
        assert!(matches!(
            h.tracker.activate(Some(bob())).await,
            Activation::Deferred
        ));
        gate.add_permits(16);

        assert_eq!(first.await.unwrap(), BackfillOutcome::Stale);
        h.tracker.wait_idle().await;

        let snapshot = h.tracker.snapshot().await;
        assert_eq!(snapshot.account, Some(bob()));
        assert_eq!(snapshot.positions.len(), 1);
        assert_eq!(snapshot.positions[0].block_number, 950);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_backfill_queries_bounded_windows() {
        let h = Harness::new(230_000, Some(alice()));

        started(h.tracker.activate(Some(alice())).await).await;

        let ranges: Vec<(u64, u64)> = h
            .chain
            .queries()
            .iter()
            .filter(|(source, _)| *source == h.sources.pool1)
            .map(|(_, range)| (range.from, range.to))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (30_000, 79_999),
                (80_000, 129_999),
                (130_000, 179_999),
                (180_000, 230_000)
            ]
        );
        assert_eq!(h.chain.queries().len(), 8);
    }

    #[tokio::test]
    async fn test_undecodable_event_is_skipped() {
        let h = Harness::new(1_000, Some(alice()));
        for (i, block) in [100, 200, 300, 400, 500].into_iter().enumerate() {
            let mut event = add_liquidity(&h.sources, PoolId::Pool1, block, 0, alice(), 1, 1);
            if i == 2 {
                event.data = Bytes::from(vec![0u8; 8]);
            }
            h.chain.push(event);
        }

        let outcome = started(h.tracker.activate(Some(alice())).await).await;

        assert_eq!(outcome, BackfillOutcome::Published(4));
        let blocks: Vec<u64> = h
            .tracker
            .positions()
            .await
            .iter()
            .map(|p| p.block_number)
            .collect();
        assert_eq!(blocks, vec![100, 200, 400, 500]);
        assert_eq!(h.notifier.count(NotificationKind::Error), 0);
    }

    #[tokio::test]
    async fn test_disconnect_clears_and_rejects_live_events() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        started(h.tracker.activate(Some(alice())).await).await;
        assert_eq!(h.tracker.positions().await.len(), 1);

        assert!(matches!(h.tracker.activate(None).await, Activation::Cleared));
        assert!(h.tracker.positions().await.is_empty());
        assert_eq!(h.tracker.account().await, None);

        let live = add_liquidity(&h.sources, PoolId::Pool2, 1_001, 0, alice(), 1, 1);
        assert_eq!(
            h.tracker.on_live_event(&live).await.unwrap(),
            LiveOutcome::Ignored(IgnoreReason::NoAccount)
        );
        assert!(h.tracker.positions().await.is_empty());
    }

    #[tokio::test]
    async fn test_live_events_append_in_order() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        started(h.tracker.activate(Some(alice())).await).await;
        let before = h.tracker.positions().await;

        let first = add_liquidity(&h.sources, PoolId::Pool2, 1_001, 0, alice(), 2, 2);
        let second = add_liquidity(&h.sources, PoolId::Pool1, 1_002, 3, alice(), 5, 5);
        assert_eq!(h.tracker.on_live_event(&first).await.unwrap(), LiveOutcome::Appended);
        assert_eq!(h.tracker.on_live_event(&second).await.unwrap(), LiveOutcome::Appended);

        let after = h.tracker.positions().await;
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after[1].block_number, 1_001);
        assert_eq!(after[2].block_number, 1_002);
    }

    #[tokio::test]
    async fn test_duplicate_live_event_is_ignored() {
        let h = Harness::new(1_000, Some(alice()));
        let event = add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1);
        h.chain.push(event.clone());
        started(h.tracker.activate(Some(alice())).await).await;

        assert_eq!(
            h.tracker.on_live_event(&event).await.unwrap(),
            LiveOutcome::Ignored(IgnoreReason::Duplicate)
        );
        assert_eq!(h.tracker.positions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_live_event_for_other_account_is_ignored() {
        let h = Harness::new(1_000, Some(alice()));
        started(h.tracker.activate(Some(alice())).await).await;

        let event = add_liquidity(&h.sources, PoolId::Pool1, 1_001, 0, bob(), 1, 1);
        assert_eq!(
            h.tracker.on_live_event(&event).await.unwrap(),
            LiveOutcome::Ignored(IgnoreReason::OtherAccount)
        );
    }

    #[tokio::test]
    async fn test_live_event_ignored_when_wallet_moved() {
        let h = Harness::new(1_000, Some(alice()));
        started(h.tracker.activate(Some(alice())).await).await;
        h.wallet.set_accounts(vec![bob()]);

        let event = add_liquidity(&h.sources, PoolId::Pool1, 1_001, 0, alice(), 1, 1);
        assert_eq!(
            h.tracker.on_live_event(&event).await.unwrap(),
            LiveOutcome::Ignored(IgnoreReason::Stale)
        );
        assert!(h.tracker.positions().await.is_empty());
    }

    #[tokio::test]
    async fn test_live_event_during_backfill_is_kept() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        let gate = h.chain.hold(alice());

        let Activation::Started(handle) = h.tracker.activate(Some(alice())).await else {
            panic!("expected a backfill");
        };
        let live = add_liquidity(&h.sources, PoolId::Pool2, 1_001, 0, alice(), 2, 2);
        assert_eq!(h.tracker.on_live_event(&live).await.unwrap(), LiveOutcome::Appended);
        gate.add_permits(16);

        assert_eq!(handle.await.unwrap(), BackfillOutcome::Published(1));
        let blocks: Vec<u64> = h
            .tracker
            .positions()
            .await
            .iter()
            .map(|p| p.block_number)
            .collect();
        assert_eq!(blocks, vec![900, 1_001]);
    }

    #[tokio::test]
    async fn test_query_failure_notifies_once() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.fail_queries(true);

        let outcome = started(h.tracker.activate(Some(alice())).await).await;

        assert!(matches!(
            outcome,
            BackfillOutcome::Failed(TrackerError::QueryFailure(_))
        ));
        assert!(h.tracker.positions().await.is_empty());
        assert!(!h.tracker.is_loading());
        assert_eq!(h.notifier.count(NotificationKind::Error), 1);
        assert_eq!(h.notifier.titles(), vec!["Error Loading Positions"]);
    }

    #[tokio::test]
    async fn test_wallet_error_fails_backfill() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        h.wallet_link.set_failing(true);

        let outcome = started(h.tracker.activate(Some(alice())).await).await;

        assert!(matches!(
            outcome,
            BackfillOutcome::Failed(TrackerError::QueryFailure(_))
        ));
        assert!(h.tracker.positions().await.is_empty());
        assert!(!h.tracker.is_loading());
        assert_eq!(h.notifier.count(NotificationKind::Error), 1);
    }

    #[tokio::test]
    async fn test_live_event_wallet_error_is_returned() {
        let h = Harness::new(1_000, Some(alice()));
        started(h.tracker.activate(Some(alice())).await).await;
        let event = add_liquidity(&h.sources, PoolId::Pool1, 1_001, 0, alice(), 1, 1);

        h.wallet_link.set_failing(true);
        assert!(matches!(
            h.tracker.on_live_event(&event).await,
            Err(TrackerError::QueryFailure(_))
        ));
        assert!(h.tracker.positions().await.is_empty());

        h.wallet_link.set_failing(false);
        assert_eq!(h.tracker.on_live_event(&event).await.unwrap(), LiveOutcome::Appended);
        assert_eq!(h.tracker.positions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_backfill_discarded_after_disconnect() {
        let h = Harness::new(1_000, Some(alice()));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        let gate = h.chain.hold(alice());

        let Activation::Started(first) = h.tracker.activate(Some(alice())).await else {
            panic!("expected a backfill");
        };
        assert!(matches!(h.tracker.activate(None).await, Activation::Cleared));
        gate.add_permits(16);

        assert_eq!(first.await.unwrap(), BackfillOutcome::Stale);
        h.tracker.wait_idle().await;
        let snapshot = h.tracker.snapshot().await;
        assert_eq!(snapshot.account, None);
        assert!(snapshot.positions.is_empty());
    }

    #[tokio::test]
    async fn test_backfill_discarded_after_switch_without_wallet_check() {
        let config = TrackerConfig {
            verify_wallet: false,
            live_feed: LiveFeedConfig {
                enabled: false,
                ..LiveFeedConfig::default()
            },
            ..TrackerConfig::default()
        };
        let h = Harness::with_config(1_000, Some(alice()), config);
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool1, 900, 0, alice(), 1, 1));
        h.chain.push(add_liquidity(&h.sources, PoolId::Pool2, 950, 0, bob(), 2, 2));
        let gate = h.chain.hold(alice());

        let Activation::Started(first) = h.tracker.activate(Some(alice())).await else {
            panic!("expected a backfill");
        };
        assert!(matches!(
            h.tracker.activate(Some(bob())).await,
            Activation::Deferred
        ));
        gate.add_permits(16);

        assert_eq!(first.await.unwrap(), BackfillOutcome::Stale);
        h.tracker.wait_idle().await;

        let snapshot = h.tracker.snapshot().await;
        assert_eq!(snapshot.account, Some(bob()));
        let blocks: Vec<u64> = snapshot.positions.iter().map(|p| p.block_number).collect();
        assert_eq!(blocks, vec![950]);
    }

    #[tokio::test]
    async fn test_manual_backfill_rejected_while_loading() {
        let h = Harness::new(1_000, Some(alice()));
        assert_eq!(h.tracker.backfill().await, BackfillOutcome::NoAccount);

        let gate = h.chain.hold(alice());
        let Activation::Started(handle) = h.tracker.activate(Some(alice())).await else {
            panic!("expected a backfill");
        };
        assert!(h.tracker.is_loading());
        assert_eq!(h.tracker.backfill().await, BackfillOutcome::AlreadyLoading);

        gate.add_permits(16);
        handle.await.unwrap();
        assert_eq!(h.tracker.backfill().await, BackfillOutcome::Published(0));
    }

    #[tokio::test]
    async fn test_revision_tracks_changes() {
        let h = Harness::new(1_000, Some(alice()));
        let revisions = h.tracker.subscribe();

        started(h.tracker.activate(Some(alice())).await).await;
        h.tracker.set_selected_pool(PoolId::Pool2).await;

        assert!(*revisions.borrow() >= 3);
        assert_eq!(h.tracker.selected_pool().await, PoolId::Pool2);
    }
}
