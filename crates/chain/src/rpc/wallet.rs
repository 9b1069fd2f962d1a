use crate::WalletProvider;
use crate::errors::ChainError;
use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;

/// Wallet backed by the node's `eth_accounts`.
#[derive(Debug, Clone)]
pub struct RpcWallet<P> {
    provider: P,
}

impl<P> RpcWallet<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> WalletProvider for RpcWallet<P>
where
    P: Provider + Send + Sync,
{
    async fn active_accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))
    }
}
