//! In-crate fakes shared by the test modules.

use crate::config::{LiveFeedConfig, TrackerConfig};
use crate::notify::{NotificationKind, Notifier};
use crate::tracker::PositionTracker;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use himera_chain::errors::ChainError;
use himera_chain::events::to_amount;
use himera_chain::raw_event::{EventFilter, RawEvent};
use himera_chain::sources::PoolSources;
use himera_chain::wallet::StaticWallet;
use himera_chain::{ChainReader, WalletProvider};
use himera_domain::{Amount, BlockRange, EventKey, PoolId, Position};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, broadcast};

pub(crate) const BASE_TIMESTAMP: u64 = 1_700_000_000;
const E18: u128 = 1_000_000_000_000_000_000;

/// Chain double serving logs from memory.
#[derive(Default)]
pub(crate) struct FakeChain {
    head: AtomicU64,
    events: Mutex<Vec<RawEvent>>,
    queries: Mutex<Vec<(Address, BlockRange)>>,
    head_calls: AtomicUsize,
    fail: AtomicBool,
    held: Mutex<Option<(Address, Arc<Semaphore>)>>,
}

impl FakeChain {
    pub(crate) fn new(head: u64) -> Self {
        let chain = Self::default();
        chain.set_head(head);
        chain
    }

    pub(crate) fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub(crate) fn push(&self, event: RawEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub(crate) fn queries(&self) -> Vec<(Address, BlockRange)> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_queries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Blocks log queries filtered on `user` until permits are added to the
    /// returned semaphore.
    pub(crate) fn hold(&self, user: Address) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.held.lock().unwrap() = Some((user, gate.clone()));
        gate
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn query_events(
        &self,
        source: Address,
        filter: &EventFilter,
        range: BlockRange,
    ) -> Result<Vec<RawEvent>, ChainError> {
        self.queries.lock().unwrap().push((source, range));

        let gate = {
            let held = self.held.lock().unwrap();
            held.as_ref()
                .filter(|(user, _)| filter.user == Some(*user))
                .map(|(_, gate)| gate.clone())
        };
        if let Some(gate) = gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| ChainError::Transport("gate closed".into()))?;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("rate limited".into()));
        }

        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.address == source && range.contains(e.block_number))
            .filter(|e| filter.user.is_none() || filter.matches(e))
            .cloned()
            .collect())
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError> {
        Ok(BASE_TIMESTAMP + block * 12)
    }
}

/// `AddLiquidity` log with whole-token amounts.
pub(crate) fn add_liquidity(
    sources: &PoolSources,
    pool: PoolId,
    block: u64,
    log_index: u64,
    user: Address,
    amount_a: u64,
    amount_b: u64,
) -> RawEvent {
    RawEvent::encode_add_liquidity(
        sources.address(pool),
        block,
        log_index,
        user,
        U256::from(u128::from(amount_a) * E18),
        U256::from(u128::from(amount_b) * E18),
        U256::from(E18),
    )
}

/// Position with fixed amounts, for session-level tests.
pub(crate) fn position(pool: PoolId, block: u64, log_index: u64) -> Position {
    Position::from_event(
        EventKey {
            pool,
            block_number: block,
            log_index,
        },
        BASE_TIMESTAMP,
        ether(10),
        ether(20),
        ether(1),
    )
    .unwrap()
}

pub(crate) fn ether(whole: u64) -> Amount {
    to_amount(U256::from(u128::from(whole) * E18))
}

/// Notifier recording everything it receives.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notes: Mutex<Vec<(NotificationKind, String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn count(&self, kind: NotificationKind) -> usize {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    pub(crate) fn titles(&self) -> Vec<String> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, title, _)| title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        self.notes
            .lock()
            .unwrap()
            .push((kind, title.to_string(), message.to_string()));
    }
}

/// Wallet in front of a [`StaticWallet`] whose connection can be cut.
pub(crate) struct FlakyWallet {
    inner: Arc<StaticWallet>,
    failing: AtomicBool,
}

impl FlakyWallet {
    pub(crate) fn new(inner: Arc<StaticWallet>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for FlakyWallet {
    async fn active_accounts(&self) -> Result<Vec<Address>, ChainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("wallet disconnected".into()));
        }
        self.inner.active_accounts().await
    }

    fn accounts_changed(&self) -> Option<broadcast::Receiver<Vec<Address>>> {
        self.inner.accounts_changed()
    }
}

/// Wired tracker over fakes, with the live feed disabled.
pub(crate) struct Harness {
    pub(crate) chain: Arc<FakeChain>,
    pub(crate) wallet: Arc<StaticWallet>,
    /// Connection the tracker reads `wallet` through.
    pub(crate) wallet_link: Arc<FlakyWallet>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) sources: PoolSources,
    pub(crate) tracker: PositionTracker,
}

impl Harness {
    pub(crate) fn new(head: u64, wallet_account: Option<Address>) -> Self {
        Self::with_config(
            head,
            wallet_account,
            TrackerConfig {
                live_feed: LiveFeedConfig {
                    enabled: false,
                    ..LiveFeedConfig::default()
                },
                ..TrackerConfig::default()
            },
        )
    }

    pub(crate) fn with_config(
        head: u64,
        wallet_account: Option<Address>,
        config: TrackerConfig,
    ) -> Self {
        let chain = Arc::new(FakeChain::new(head));
        let wallet = Arc::new(StaticWallet::new(wallet_account.into_iter().collect()));
        let wallet_link = Arc::new(FlakyWallet::new(wallet.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let sources = PoolSources::default();
        let tracker = PositionTracker::new(
            chain.clone() as Arc<dyn ChainReader>,
            wallet_link.clone() as Arc<dyn WalletProvider>,
            notifier.clone(),
            sources,
            config,
        );
        Self {
            chain,
            wallet,
            wallet_link,
            notifier,
            sources,
            tracker,
        }
    }
}
