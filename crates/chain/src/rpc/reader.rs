use crate::ChainReader;
use crate::errors::ChainError;
use crate::raw_event::{EventFilter, RawEvent};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::rpc::types::Filter;
use async_trait::async_trait;
use himera_domain::BlockRange;
use tracing::{debug, warn};

/// [`ChainReader`] over any alloy provider.
#[derive(Debug, Clone)]
pub struct RpcChainReader<P> {
    provider: P,
}

impl<P> RpcChainReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

fn transport(e: impl std::fmt::Display) -> ChainError {
    ChainError::Transport(e.to_string())
}

#[async_trait]
impl<P> ChainReader for RpcChainReader<P>
where
    P: Provider + Send + Sync,
{
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(transport)
    }

    async fn query_events(
        &self,
        source: Address,
        filter: &EventFilter,
        range: BlockRange,
    ) -> Result<Vec<RawEvent>, ChainError> {
        let mut log_filter = Filter::new()
            .address(source)
            .event_signature(filter.signature)
            .from_block(range.from)
            .to_block(range.to);
        if let Some(user) = filter.user {
            log_filter = log_filter.topic1(user.into_word());
        }

        debug!(source = %source, range = %range, "Querying logs");
        let logs = self.provider.get_logs(&log_filter).await.map_err(transport)?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            match RawEvent::try_from(log) {
                Ok(event) => events.push(event),
                Err(e) => warn!(source = %source, error = %e, "Skipping pending log"),
            }
        }
        Ok(events)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError> {
        let header = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block))
            .await
            .map_err(transport)?
            .ok_or(ChainError::MissingBlock(block))?
            .header;
        Ok(header.timestamp)
    }
}
