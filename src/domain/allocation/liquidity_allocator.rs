//! Pro-rata allocation of pool vault balances to liquidity positions

use crate::math::mul_div_floor;
use crate::shared::errors::AllocationError;

/// Fixed-point scale for liquidity shares (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Token amounts attributed to one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allocation {
    pub base: u64,
    pub quote: u64,
}

/// Vault balances and total liquidity of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub total_liquidity: u128,
    pub base_vault_balance: u64,
    pub quote_vault_balance: u64,
}

/// `liquidity * PRECISION / total_liquidity`, floored.
///
/// `Ok(None)` for a pool with zero total liquidity.
pub fn liquidity_share(liquidity: u128, total_liquidity: u128) -> Result<Option<u128>, AllocationError> {
    if total_liquidity == 0 {
        return Ok(None);
    }
    if liquidity > total_liquidity {
        return Err(AllocationError::LiquidityExceedsTotal {
            liquidity,
            total: total_liquidity,
        });
    }
    mul_div_floor(liquidity, PRECISION, total_liquidity)
        .map(Some)
        .ok_or(AllocationError::Overflow)
}

/// `vault_balance * share / PRECISION`, floored. Never exceeds `vault_balance`
/// for a share of at most `PRECISION`.
pub fn allocate_vault(vault_balance: u64, share: u128) -> Result<u64, AllocationError> {
    let allocated = mul_div_floor(vault_balance as u128, share, PRECISION)
        .ok_or(AllocationError::Overflow)?;
    u64::try_from(allocated).map_err(|_| AllocationError::Overflow)
}

impl PoolSnapshot {
    /// Split both vaults for a position holding `liquidity`.
    ///
    /// `Ok(None)` when the pool has no liquidity; such pools contribute nothing.
    pub fn allocate(&self, liquidity: u128) -> Result<Option<Allocation>, AllocationError> {
        let share = match liquidity_share(liquidity, self.total_liquidity)? {
            Some(share) => share,
            None => return Ok(None),
        };

        Ok(Some(Allocation {
            base: allocate_vault(self.base_vault_balance, share)?,
            quote: allocate_vault(self.quote_vault_balance, share)?,
        }))
    }
}
