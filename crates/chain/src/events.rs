use crate::errors::ChainError;
use crate::raw_event::RawEvent;
use crate::sources::PoolSources;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use himera_domain::{Amount, EventKey};

sol!(
    #[derive(Debug)]
    contract LiquidityPool {
        event AddLiquidity(
            address indexed user,
            uint256 amountA,
            uint256 amountB,
            uint256 sharesToMint
        );
    }
);

/// A decoded `AddLiquidity` event tagged with the pool that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAdded {
    pub key: EventKey,
    pub user: Address,
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub shares_minted: Amount,
}

impl LiquidityAdded {
    /// Decodes a raw log. Fails if the payload does not match the event ABI or
    /// if the log was not emitted by one of the tracked pools.
    pub fn decode(raw: &RawEvent, sources: &PoolSources) -> Result<Self, ChainError> {
        let pool = sources
            .pool_of(raw.address)
            .ok_or_else(|| ChainError::UnknownSource(raw.address.to_string()))?;

        let event = LiquidityPool::AddLiquidity::decode_log_data(&raw.log_data())
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        Ok(Self {
            key: EventKey {
                pool,
                block_number: raw.block_number,
                log_index: raw.log_index,
            },
            user: event.user,
            amount_a: to_amount(event.amountA),
            amount_b: to_amount(event.amountB),
            shares_minted: to_amount(event.sharesToMint),
        })
    }
}

/// 18-decimal fixed point amount from an ABI `uint256`.
pub fn to_amount(value: U256) -> Amount {
    Amount::ether(primitive_types::U256::from_big_endian(
        &value.to_be_bytes::<32>(),
    ))
}
