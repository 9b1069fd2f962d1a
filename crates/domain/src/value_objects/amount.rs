use crate::errors::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Decimals used by every amount emitted by the pools.
pub const ETHER_DECIMALS: u8 = 18;

// Largest mantissa a `Decimal` can hold (2^96 - 1).
const MAX_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;
const MAX_SCALE: u32 = 28;

/// Fixed-point on-chain integer together with its decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn ether(raw: U256) -> Self {
        Self::new(raw, ETHER_DECIMALS)
    }

    pub fn from_decimal(d: Decimal, decimals: u8) -> Result<Self, DomainError> {
        let overflow = || DomainError::AmountOverflow {
            raw: d.to_string(),
            decimals,
        };
        let multiplier = 10u64
            .checked_pow(u32::from(decimals))
            .map(Decimal::from)
            .ok_or_else(overflow)?;
        let raw = d
            .checked_mul(multiplier)
            .and_then(|v| v.trunc().to_u128())
            .ok_or_else(overflow)?;
        Ok(Self {
            raw: U256::from(raw),
            decimals,
        })
    }

    /// Converts to a decimal, dropping the least significant digits when the
    /// raw value exceeds what a `Decimal` mantissa can carry.
    pub fn to_decimal(&self) -> Result<Decimal, DomainError> {
        let mut raw = self.raw;
        let mut scale = u32::from(self.decimals);
        let ten = U256::from(10u8);

        while raw > U256::from(MAX_MANTISSA) || scale > MAX_SCALE {
            if scale == 0 {
                return Err(DomainError::AmountOverflow {
                    raw: self.raw.to_string(),
                    decimals: self.decimals,
                });
            }
            raw /= ten;
            scale -= 1;
        }

        let mantissa = i128::try_from(raw.as_u128()).map_err(|_| DomainError::AmountOverflow {
            raw: self.raw.to_string(),
            decimals: self.decimals,
        })?;

        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map(|d| d.normalize())
            .map_err(|_| DomainError::AmountOverflow {
                raw: self.raw.to_string(),
                decimals: self.decimals,
            })
    }
}
