//! Prelude module for convenient imports.
//!
//! ```rust
//! use himera_chain::prelude::*;
//! ```

pub use crate::errors::ChainError;
pub use crate::events::{LiquidityAdded, LiquidityPool, to_amount};
pub use crate::raw_event::{EventFilter, RawEvent};
pub use crate::rpc::{RpcChainReader, RpcWallet, connect_http};
pub use crate::sources::PoolSources;
pub use crate::wallet::StaticWallet;
pub use crate::{ChainReader, WalletProvider};
