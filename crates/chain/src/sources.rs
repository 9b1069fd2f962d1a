use alloy::primitives::{Address, address};
use himera_domain::PoolId;

/// Addresses of the two pools whose `AddLiquidity` events are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSources {
    pub pool1: Address,
    pub pool2: Address,
}

impl PoolSources {
    pub fn new(pool1: Address, pool2: Address) -> Self {
        Self { pool1, pool2 }
    }

    pub fn address(&self, pool: PoolId) -> Address {
        match pool {
            PoolId::Pool1 => self.pool1,
            PoolId::Pool2 => self.pool2,
        }
    }

    /// Which pool an event came from, by its emitting address.
    pub fn pool_of(&self, emitter: Address) -> Option<PoolId> {
        PoolId::ALL
            .into_iter()
            .find(|pool| self.address(*pool) == emitter)
    }

    /// Pools in query order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, Address)> + '_ {
        PoolId::ALL.into_iter().map(|pool| (pool, self.address(pool)))
    }
}

impl Default for PoolSources {
    fn default() -> Self {
        Self {
            pool1: address!("e7db23d728395873b2e1b848ed1564bbf3ddb4e9"),
            pool2: address!("6667076cd871b663726927304d8712be1bf8bace"),
        }
    }
}
