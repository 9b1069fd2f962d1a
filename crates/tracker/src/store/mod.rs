//! Persisted key-value store shared with the wallet connector.
//!
//! The connector writes the connected account under [`WALLET_ADDRESS_KEY`]
//! and the pool picked in the UI under [`SELECTED_POOL_KEY`]. The tracker
//! only ever polls these values.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::errors::TrackerError;
use alloy::primitives::Address;
use async_trait::async_trait;
use himera_chain::WalletProvider;
use himera_chain::errors::ChainError;
use std::sync::Arc;
use tracing::warn;

/// Key holding the connected wallet address.
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";
/// Key holding the selected pool name.
pub const SELECTED_POOL_KEY: &str = "selectedPool";

/// String key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>, TrackerError>;

    /// Writes a value, removing the key when `value` is `None`.
    async fn set(&self, key: &str, value: Option<String>) -> Result<(), TrackerError>;
}

/// Reads the stored wallet address. Unparseable values count as no account.
pub async fn stored_account(store: &dyn KeyValueStore) -> Result<Option<Address>, TrackerError> {
    let Some(value) = store.get(WALLET_ADDRESS_KEY).await? else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<Address>() {
        Ok(address) => Ok(Some(address)),
        Err(e) => {
            warn!(value, error = %e, "Ignoring malformed stored wallet address");
            Ok(None)
        }
    }
}

/// Wallet whose active account is the one persisted by the wallet connector.
pub struct StoreWallet {
    store: Arc<dyn KeyValueStore>,
}

impl StoreWallet {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WalletProvider for StoreWallet {
    async fn active_accounts(&self) -> Result<Vec<Address>, ChainError> {
        match stored_account(self.store.as_ref()).await {
            Ok(account) => Ok(account.into_iter().collect()),
            Err(e) => {
                warn!(error = %e, "Store unavailable");
                Err(ChainError::ProviderUnavailable)
            }
        }
    }
}
