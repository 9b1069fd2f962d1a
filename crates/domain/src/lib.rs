//! Core types for the Himera position history tracker.
//!
//! Everything in this crate is pure: fixed-point amounts, block windows and
//! the position records the tracker publishes. Chain access lives in
//! `himera-chain`, orchestration in `himera-tracker`.

pub mod entities;
pub mod enums;
pub mod errors;
pub mod value_objects;

pub use entities::{EventKey, Position, PositionRow, TokenSymbols};
pub use enums::PoolId;
pub use errors::DomainError;
pub use value_objects::{amount::Amount, block_range::BlockRange};
