use crate::WalletProvider;
use crate::errors::ChainError;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Wallet holding an explicit account list, with change notifications.
pub struct StaticWallet {
    accounts: Mutex<Vec<Address>>,
    changes: broadcast::Sender<Vec<Address>>,
}

impl StaticWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(accounts),
            changes,
        }
    }

    /// Wallet exposing a single account.
    pub fn with_account(account: Address) -> Self {
        Self::new(vec![account])
    }

    /// Replaces the account list and notifies subscribers.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self
            .accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = accounts.clone();
        // No subscribers is fine.
        let receivers = self.changes.send(accounts).unwrap_or(0);
        debug!(receivers, "Wallet accounts changed");
    }
}

impl Default for StaticWallet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn active_accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self
            .accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn accounts_changed(&self) -> Option<broadcast::Receiver<Vec<Address>>> {
        Some(self.changes.subscribe())
    }
}
