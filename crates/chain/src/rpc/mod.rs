//! JSON-RPC backed collaborators built on an alloy `Provider`.

mod reader;
mod wallet;

pub use reader::RpcChainReader;
pub use wallet::RpcWallet;

use crate::errors::ChainError;
use alloy::providers::{Provider, ProviderBuilder};

/// Connects an HTTP provider to `url`.
pub fn connect_http(url: &str) -> Result<impl Provider + Clone + use<>, ChainError> {
    let url = url
        .parse()
        .map_err(|e| ChainError::Transport(format!("invalid rpc url {url}: {e}")))?;
    Ok(ProviderBuilder::new().connect_http(url))
}
