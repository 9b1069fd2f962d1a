//! Active account observation.

use crate::config::AccountWatcherConfig;
use crate::errors::TrackerError;
use crate::store::{KeyValueStore, SELECTED_POOL_KEY, stored_account};
use crate::tracker::{Activation, PositionTracker};
use alloy::primitives::Address;
use himera_chain::WalletProvider;
use himera_chain::errors::ChainError;
use himera_domain::PoolId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Feeds account changes into a [`PositionTracker`].
///
/// Accounts come from two places: pushes from the wallet and the address
/// persisted in the store by the wallet connector. When a store is attached
/// it wins: a stored address that differs from the last seen one is
/// activated, and a missing one clears the tracker.
pub struct AccountWatcher {
    tracker: PositionTracker,
    wallet: Arc<dyn WalletProvider>,
    store: Option<Arc<dyn KeyValueStore>>,
    config: AccountWatcherConfig,
    last_account: Mutex<Option<Address>>,
    running: AtomicBool,
    stop_requested: AtomicBool,
}

impl AccountWatcher {
    pub fn new(
        tracker: PositionTracker,
        wallet: Arc<dyn WalletProvider>,
        config: AccountWatcherConfig,
    ) -> Self {
        Self {
            tracker,
            wallet,
            store: None,
            config,
            last_account: Mutex::new(None),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Attaches the persisted store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Activates the wallet's current account.
    pub async fn initialize(&self) -> Result<Activation, TrackerError> {
        let account = match self.tracker.timed(self.wallet.current_account()).await {
            Ok(account) => account,
            Err(ChainError::ProviderUnavailable) => {
                warn!("No wallet provider available");
                None
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(store) = &self.store {
            self.sync_selected_pool(store.as_ref()).await?;
        }
        Ok(self.switch_to(account).await)
    }

    /// Handles an `accountsChanged` push. The first account becomes active.
    pub async fn apply_wallet_accounts(&self, accounts: &[Address]) -> Activation {
        debug!(accounts = accounts.len(), "Wallet accounts changed");
        self.switch_to(accounts.first().copied()).await
    }

    /// Polls the store once. Returns the activation if the account changed.
    pub async fn reconcile(&self) -> Result<Option<Activation>, TrackerError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let stored = stored_account(store.as_ref()).await?;
        self.sync_selected_pool(store.as_ref()).await?;

        let last = *self.last_account.lock().await;
        match stored {
            Some(account) if last != Some(account) => {
                info!(account = %account, "Stored account changed");
                Ok(Some(self.switch_to(Some(account)).await))
            }
            None if last.is_some() => {
                info!("Stored account removed");
                Ok(Some(self.switch_to(None).await))
            }
            _ => Ok(None),
        }
    }

    /// Watches wallet pushes and polls the store until [`stop`](Self::stop).
    /// Returns at once if `stop` was already called.
    pub async fn run(&self) {
        if self.stop_requested.load(Ordering::SeqCst) {
            debug!("Account watcher stopped before start");
            return;
        }
        self.running.store(true, Ordering::SeqCst);
        let mut changes = self.wallet.accounts_changed();
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            poll_interval_ms = self.config.poll_interval_ms,
            push = changes.is_some(),
            "Account watcher started"
        );

        while !self.stop_requested.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.reconcile().await {
                        warn!(error = %e, "Store poll failed");
                    }
                }
                accounts = next_change(&mut changes) => {
                    self.apply_wallet_accounts(&accounts).await;
                }
            }
        }
        self.running.store(false, Ordering::SeqCst);
        info!("Account watcher stopped");
    }

    /// Ends [`run`](Self::run) at its next wake-up. Final: a stopped watcher
    /// does not run again.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn switch_to(&self, account: Option<Address>) -> Activation {
        *self.last_account.lock().await = account;
        self.tracker.activate(account).await
    }

    async fn sync_selected_pool(&self, store: &dyn KeyValueStore) -> Result<(), TrackerError> {
        let Some(value) = store.get(SELECTED_POOL_KEY).await? else {
            return Ok(());
        };
        match value.parse::<PoolId>() {
            Ok(pool) => self.tracker.set_selected_pool(pool).await,
            Err(e) => warn!(error = %e, "Ignoring stored pool selection"),
        }
        Ok(())
    }
}

/// Next account list pushed by the wallet. Pending forever once the channel
/// is gone.
async fn next_change(changes: &mut Option<broadcast::Receiver<Vec<Address>>>) -> Vec<Address> {
    loop {
        let Some(receiver) = changes else {
            return std::future::pending().await;
        };
        match receiver.recv().await {
            Ok(accounts) => return accounts,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Wallet updates lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                *changes = None;
            }
        }
    }
}
