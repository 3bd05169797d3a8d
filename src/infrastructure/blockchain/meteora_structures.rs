//! Meteora DAMM v2 (cp-amm) position and pool views
//!
//! Only the fields needed for a withdraw quote are read, at fixed offsets.
//! Prices are Q64.64 square roots; liquidity carries 64 fractional bits.

use solana_sdk::pubkey::Pubkey;
use crate::math::{mul_div_floor, mul_shr_128};
use crate::shared::errors::DecodeError;
use super::account_reader::AccountReader;
use super::futarchy_structures::{account_discriminator, has_discriminator};

const POSITION_POOL_OFFSET: usize = 8;
const POSITION_NFT_MINT_OFFSET: usize = 40;
const POSITION_UNLOCKED_LIQUIDITY_OFFSET: usize = 152;

const POOL_TOKEN_A_MINT_OFFSET: usize = 168;
const POOL_TOKEN_B_MINT_OFFSET: usize = 200;
const POOL_SQRT_MIN_PRICE_OFFSET: usize = 424;
const POOL_SQRT_MAX_PRICE_OFFSET: usize = 440;
const POOL_SQRT_PRICE_OFFSET: usize = 456;

/// LP position owned through a position NFT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DammPosition {
    pub pool: Pubkey,
    pub nft_mint: Pubkey,
    pub unlocked_liquidity: u128,
}

impl DammPosition {
    pub fn try_decode(data: &[u8]) -> Result<Option<Self>, DecodeError> {
        if !has_discriminator(data, &account_discriminator("Position")) {
            return Ok(None);
        }
        Ok(Some(Self {
            pool: AccountReader::at(data, POSITION_POOL_OFFSET).read_pubkey()?,
            nft_mint: AccountReader::at(data, POSITION_NFT_MINT_OFFSET).read_pubkey()?,
            unlocked_liquidity: AccountReader::at(data, POSITION_UNLOCKED_LIQUIDITY_OFFSET).read_u128_le()?,
        }))
    }
}

/// Pool mints and price range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DammPool {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub sqrt_min_price: u128,
    pub sqrt_max_price: u128,
    pub sqrt_price: u128,
}

/// Token amounts released by withdrawing liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawQuote {
    pub amount_a: u64,
    pub amount_b: u64,
}

impl DammPool {
    pub fn try_decode(data: &[u8]) -> Result<Option<Self>, DecodeError> {
        if !has_discriminator(data, &account_discriminator("Pool")) {
            return Ok(None);
        }
        Ok(Some(Self {
            token_a_mint: AccountReader::at(data, POOL_TOKEN_A_MINT_OFFSET).read_pubkey()?,
            token_b_mint: AccountReader::at(data, POOL_TOKEN_B_MINT_OFFSET).read_pubkey()?,
            sqrt_min_price: AccountReader::at(data, POOL_SQRT_MIN_PRICE_OFFSET).read_u128_le()?,
            sqrt_max_price: AccountReader::at(data, POOL_SQRT_MAX_PRICE_OFFSET).read_u128_le()?,
            sqrt_price: AccountReader::at(data, POOL_SQRT_PRICE_OFFSET).read_u128_le()?,
        }))
    }

    /// Amounts out for removing `liquidity`, rounded down.
    ///
    /// `a = L * (sqrt_max - sqrt_p) / (sqrt_p * sqrt_max)`,
    /// `b = L * (sqrt_p - sqrt_min) >> 128`. `None` on a degenerate price
    /// or an amount that does not fit in u64.
    pub fn withdraw_quote(&self, liquidity: u128) -> Option<WithdrawQuote> {
        if self.sqrt_price == 0 || self.sqrt_max_price == 0 {
            return None;
        }
        let upper_delta = self.sqrt_max_price.saturating_sub(self.sqrt_price);
        let lower_delta = self.sqrt_price.saturating_sub(self.sqrt_min_price);

        // floor(floor(x / m) / p) == floor(x / (m * p))
        let amount_a = mul_div_floor(liquidity, upper_delta, self.sqrt_max_price)? / self.sqrt_price;
        let amount_b = mul_shr_128(liquidity, lower_delta);

        Some(WithdrawQuote {
            amount_a: u64::try_from(amount_a).ok()?,
            amount_b: u64::try_from(amount_b).ok()?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_decode_position_and_pool() {
        let pool_key = Pubkey::new_unique();
        let nft_mint = Pubkey::new_unique();
        let position = DammPosition::try_decode(&position_buffer(&pool_key, &nft_mint, 77)).unwrap().unwrap();
        assert_eq!(position, DammPosition { pool: pool_key, nft_mint, unlocked_liquidity: 77 });

        let pool = unit_price_pool();
        assert_eq!(DammPool::try_decode(&pool_buffer(&pool)).unwrap(), Some(pool));
    }

    #[test]
    fn test_other_account_types_are_not_decoded() {
        let pool = unit_price_pool();
        assert_eq!(DammPosition::try_decode(&pool_buffer(&pool)), Ok(None));
        assert_eq!(DammPool::try_decode(&[0u8; 4]), Ok(None));
    }

    #[test]
    fn test_truncated_pool_is_an_error() {
        let data = pool_buffer(&unit_price_pool());
        assert!(DammPool::try_decode(&data[..400]).is_err());
    }

    #[test]
    fn test_withdraw_quote_at_unit_price() {
        let pool = unit_price_pool();
        // 1000 units of liquidity with 64 fractional bits
        let liquidity = 1000u128 << 64;
        let quote = pool.withdraw_quote(liquidity).unwrap();
        assert_eq!(quote, WithdrawQuote { amount_a: 500, amount_b: 500 });
    }

    #[test]
    fn test_withdraw_quote_at_range_edges() {
        let mut pool = unit_price_pool();
        let liquidity = 1000u128 << 64;

        pool.sqrt_price = pool.sqrt_max_price;
        assert_eq!(pool.withdraw_quote(liquidity).unwrap().amount_a, 0);

        pool.sqrt_price = pool.sqrt_min_price;
        assert_eq!(pool.withdraw_quote(liquidity).unwrap().amount_b, 0);

        pool.sqrt_price = 0;
        assert!(pool.withdraw_quote(liquidity).is_none());
    }
}
