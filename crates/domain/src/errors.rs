use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("amount {raw} with {decimals} decimals does not fit a decimal")]
    AmountOverflow { raw: String, decimals: u8 },
    #[error("block timestamp {0} is out of range")]
    InvalidTimestamp(u64),
    #[error("unknown pool: {0}")]
    UnknownPool(String),
}
