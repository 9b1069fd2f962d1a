use crate::errors::ChainError;
use crate::events::LiquidityPool::AddLiquidity;
use alloy::primitives::{Address, B256, Bytes, LogData, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

/// An undecoded log as returned by a chain query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Emitting contract.
    pub address: Address,
    /// Block containing the log.
    pub block_number: u64,
    /// Index of the log within its block.
    pub log_index: u64,
    /// Indexed topics, signature first.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields.
    pub data: Bytes,
}

impl RawEvent {
    pub fn log_data(&self) -> LogData {
        LogData::new_unchecked(self.topics.clone(), self.data.clone())
    }

    /// Encodes an `AddLiquidity` log as a pool would emit it.
    pub fn encode_add_liquidity(
        address: Address,
        block_number: u64,
        log_index: u64,
        user: Address,
        amount_a: U256,
        amount_b: U256,
        shares_to_mint: U256,
    ) -> Self {
        let log = AddLiquidity {
            user,
            amountA: amount_a,
            amountB: amount_b,
            sharesToMint: shares_to_mint,
        }
        .encode_log_data();

        Self {
            address,
            block_number,
            log_index,
            topics: log.topics().to_vec(),
            data: log.data,
        }
    }
}

impl TryFrom<Log> for RawEvent {
    type Error = ChainError;

    fn try_from(log: Log) -> Result<Self, Self::Error> {
        let block_number = log
            .block_number
            .ok_or(ChainError::MissingLogMetadata("block number"))?;
        let log_index = log
            .log_index
            .ok_or(ChainError::MissingLogMetadata("log index"))?;

        Ok(Self {
            address: log.inner.address,
            block_number,
            log_index,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data,
        })
    }
}

/// Log filter on event signature and, optionally, the indexed `user` topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFilter {
    pub signature: B256,
    pub user: Option<Address>,
}

impl EventFilter {
    /// `AddLiquidity` events, restricted to `user` when given.
    pub fn add_liquidity(user: Option<Address>) -> Self {
        Self {
            signature: AddLiquidity::SIGNATURE_HASH,
            user,
        }
    }

    pub fn matches(&self, event: &RawEvent) -> bool {
        if event.topics.first() != Some(&self.signature) {
            return false;
        }
        match self.user {
            Some(user) => event.topics.get(1) == Some(&user.into_word()),
            None => true,
        }
    }
}
