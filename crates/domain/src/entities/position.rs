use crate::enums::PoolId;
use crate::errors::DomainError;
use crate::value_objects::amount::Amount;
use chrono::{DateTime, Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Stable identity of an `AddLiquidity` log: the emitting pool plus its
/// position in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub pool: PoolId,
    pub block_number: u64,
    pub log_index: u64,
}

/// One liquidity provision made by the tracked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pool: PoolId,
    pub block_number: u64,
    pub log_index: u64,
    pub occurred_at: NaiveDate,
    pub token_a_amount: Decimal,
    pub token_b_amount: Decimal,
    pub shares_minted: Decimal,
    pub total_value: Decimal,
}

impl Position {
    /// Builds a position from the raw fixed-point amounts of the event.
    pub fn from_event(
        key: EventKey,
        block_timestamp: u64,
        amount_a: Amount,
        amount_b: Amount,
        shares_minted: Amount,
    ) -> Result<Self, DomainError> {
        let token_a_amount = amount_a.to_decimal()?;
        let token_b_amount = amount_b.to_decimal()?;
        let shares_minted = shares_minted.to_decimal()?;

        let total_value = token_a_amount
            .checked_add(token_b_amount)
            .map(|sum| sum / Decimal::ONE_HUNDRED)
            .ok_or_else(|| DomainError::AmountOverflow {
                raw: format!("{token_a_amount} + {token_b_amount}"),
                decimals: amount_a.decimals,
            })?;

        Ok(Self {
            pool: key.pool,
            block_number: key.block_number,
            log_index: key.log_index,
            occurred_at: date_from_timestamp(block_timestamp)?,
            token_a_amount,
            token_b_amount,
            shares_minted,
            total_value,
        })
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            pool: self.pool,
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }

    pub fn row(&self, symbols: &TokenSymbols) -> PositionRow {
        PositionRow {
            pool: self.pool.to_string(),
            date: format!(
                "{}/{}/{}",
                self.occurred_at.day(),
                self.occurred_at.month(),
                self.occurred_at.year()
            ),
            price: format!(
                "{} {} / {} {}",
                self.token_a_amount, symbols.token_a, self.token_b_amount, symbols.token_b
            ),
            shares: self.shares_minted.to_string(),
            value: format!(
                "{:.2} {}",
                self.total_value
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                symbols.value_unit
            ),
        }
    }
}

/// Calendar date (UTC) of a unix timestamp in seconds.
pub fn date_from_timestamp(secs: u64) -> Result<NaiveDate, DomainError> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.date_naive())
        .ok_or(DomainError::InvalidTimestamp(secs))
}

/// Symbols shown next to the amounts of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSymbols {
    pub token_a: String,
    pub token_b: String,
    pub value_unit: String,
}

impl Default for TokenSymbols {
    fn default() -> Self {
        Self {
            token_a: "CRASH".to_string(),
            token_b: "BURN".to_string(),
            value_unit: "TEST".to_string(),
        }
    }
}

/// Display form of a position, one string per table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRow {
    pub pool: String,
    pub date: String,
    pub price: String,
    pub shares: String,
    pub value: String,
}
