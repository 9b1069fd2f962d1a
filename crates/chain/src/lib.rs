//! Chain access for the position tracker.
//!
//! This crate defines the two collaborators the tracker talks to and their
//! alloy-backed implementations:
//! - [`ChainReader`]: block height, filtered log queries, block timestamps
//! - [`WalletProvider`]: the accounts currently exposed by a wallet
//!
//! It also owns the `AddLiquidity` event ABI and its decoding.

/// Error types.
pub mod errors;
/// `AddLiquidity` event ABI and decoding.
pub mod events;
/// Prelude module for convenient imports.
pub mod prelude;
/// Raw log records and filters.
pub mod raw_event;
/// JSON-RPC backed implementations.
pub mod rpc;
/// The two tracked pool addresses.
pub mod sources;
/// In-process wallet.
pub mod wallet;

use alloy::primitives::Address;
use async_trait::async_trait;
use errors::ChainError;
use himera_domain::BlockRange;
use raw_event::{EventFilter, RawEvent};
use tokio::sync::broadcast;

/// Read access to chain data.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current head block height.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Logs emitted by `source` matching `filter` within the inclusive `range`.
    async fn query_events(
        &self,
        source: Address,
        filter: &EventFilter,
        range: BlockRange,
    ) -> Result<Vec<RawEvent>, ChainError>;

    /// Unix timestamp (seconds) of the given block.
    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError>;
}

/// Source of the accounts a wallet currently exposes.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts exposed by the wallet, active account first.
    async fn active_accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Push notifications of account changes, if the wallet emits them.
    fn accounts_changed(&self) -> Option<broadcast::Receiver<Vec<Address>>> {
        None
    }

    /// The active account, if any.
    async fn current_account(&self) -> Result<Option<Address>, ChainError> {
        Ok(self.active_accounts().await?.first().copied())
    }
}
