pub mod amount;
pub mod block_range;

pub use amount::{Amount, ETHER_DECIMALS};
pub use block_range::BlockRange;
