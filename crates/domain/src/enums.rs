use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two liquidity pools the dashboard tracks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PoolId {
    #[default]
    Pool1,
    Pool2,
}

impl PoolId {
    pub const ALL: [PoolId; 2] = [PoolId::Pool1, PoolId::Pool2];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolId::Pool1 => "Pool1",
            PoolId::Pool2 => "Pool2",
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pool1" | "pool1" => Ok(PoolId::Pool1),
            "Pool2" | "pool2" => Ok(PoolId::Pool2),
            other => Err(DomainError::UnknownPool(other.to_string())),
        }
    }
}
