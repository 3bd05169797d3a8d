//! Meteora DAMM v2 LP positions valued by their withdraw quote

use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use crate::domain::accounts::AccountSource;
use crate::infrastructure::blockchain::{DammPool, DammPosition};
use crate::shared::errors::BlockchainError;
use crate::shared::types::BalanceMap;
use crate::shared::utils::dedupe_in_order;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeteoraTvl {
    pub balances: BalanceMap,
    pub positions_valued: usize,
    /// Candidates that are not live DAMM v2 positions or could not be valued
    pub skipped_positions: Vec<Pubkey>,
}

pub struct MeteoraValuer<'a, S: AccountSource + ?Sized> {
    source: &'a S,
    program_id: Pubkey,
}

impl<'a, S: AccountSource + ?Sized> MeteoraValuer<'a, S> {
    pub fn new(source: &'a S, program_id: Pubkey) -> Self {
        Self { source, program_id }
    }

    /// Value every position account in `positions`. A position that fails
    /// to load, decode or quote is skipped.
    pub async fn value(&self, positions: &[Pubkey]) -> Result<MeteoraTvl, BlockchainError> {
        let positions = dedupe_in_order(positions.iter().copied());
        let mut tvl = MeteoraTvl::default();
        if positions.is_empty() {
            return Ok(tvl);
        }

        let infos = self.source.get_multiple_accounts_chunked(&positions).await?;
        let mut decoded = Vec::new();
        for (address, info) in positions.iter().zip(&infos) {
            match self.decode_position(address, info.as_ref()) {
                Some(position) => decoded.push((*address, position)),
                None => tvl.skipped_positions.push(*address),
            }
        }
        info!("Decoded DAMM v2 positions: {} of {}", decoded.len(), positions.len());

        let pools = self.fetch_pools(&decoded).await?;
        for (address, position) in decoded {
            let pool = match pools.get(&position.pool) {
                Some(pool) => pool,
                None => {
                    warn!("Position {}: pool {} unavailable", address, position.pool);
                    tvl.skipped_positions.push(address);
                    continue;
                }
            };
            let quote = match pool.withdraw_quote(position.unlocked_liquidity) {
                Some(quote) => quote,
                None => {
                    warn!("Position {}: withdraw quote out of range", address);
                    tvl.skipped_positions.push(address);
                    continue;
                }
            };

            debug!(
                "Position {}: {} of {}, {} of {}",
                address, quote.amount_a, pool.token_a_mint, quote.amount_b, pool.token_b_mint
            );
            tvl.balances.add(&pool.token_a_mint, quote.amount_a as u128);
            tvl.balances.add(&pool.token_b_mint, quote.amount_b as u128);
            tvl.positions_valued += 1;
        }

        info!("Meteora tokens discovered: {}", tvl.balances.len());
        Ok(tvl)
    }

    fn decode_position(&self, address: &Pubkey, info: Option<&Account>) -> Option<DammPosition> {
        let account = match info {
            Some(account) => account,
            None => {
                debug!("Position account {} not found", address);
                return None;
            }
        };
        if account.owner != self.program_id {
            debug!("Account {} is not owned by DAMM v2", address);
            return None;
        }
        match DammPosition::try_decode(&account.data) {
            Ok(Some(position)) => Some(position),
            Ok(None) => {
                debug!("Account {} is not a DAMM v2 position", address);
                None
            }
            Err(e) => {
                warn!("Decode error: {} {}", address, e);
                None
            }
        }
    }

    async fn fetch_pools(
        &self,
        positions: &[(Pubkey, DammPosition)],
    ) -> Result<HashMap<Pubkey, DammPool>, BlockchainError> {
        let keys = dedupe_in_order(positions.iter().map(|(_, position)| position.pool));
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let infos = self.source.get_multiple_accounts_chunked(&keys).await?;
        let mut pools = HashMap::new();
        for (key, info) in keys.into_iter().zip(infos) {
            let account = match info.filter(|account| account.owner == self.program_id) {
                Some(account) => account,
                None => continue,
            };
            match DammPool::try_decode(&account.data) {
                Ok(Some(pool)) => {
                    pools.insert(key, pool);
                }
                Ok(None) => debug!("Account {} is not a DAMM v2 pool", key),
                Err(e) => warn!("Decode error: {} {}", key, e),
            }
        }
        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::memory_source::InMemoryAccountSource;
    use crate::infrastructure::blockchain::meteora_structures::fixtures::{pool_buffer, position_buffer, unit_price_pool};

    #[tokio::test]
    async fn test_values_positions_sharing_a_pool() {
        let program = Pubkey::new_unique();
        let pool_key = Pubkey::new_unique();
        let pool = unit_price_pool();

        let mut source = InMemoryAccountSource::new();
        source.insert_data(pool_key, program, pool_buffer(&pool));
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        source.insert_data(first, program, position_buffer(&pool_key, &Pubkey::new_unique(), 1000 << 64));
        source.insert_data(second, program, position_buffer(&pool_key, &Pubkey::new_unique(), 200 << 64));

        let tvl = MeteoraValuer::new(&source, program)
            .value(&[first, second, first])
            .await
            .unwrap();

        assert_eq!(tvl.positions_valued, 2);
        assert_eq!(tvl.balances.get_mint(&pool.token_a_mint), 600);
        assert_eq!(tvl.balances.get_mint(&pool.token_b_mint), 600);
        assert!(tvl.skipped_positions.is_empty());
        // one batch for positions, one for the shared pool
        assert_eq!(source.multiple_accounts_calls(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_skips_missing_foreign_and_poolless_positions() {
        let program = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();

        let missing = Pubkey::new_unique();
        let foreign = Pubkey::new_unique();
        source.insert_data(
            foreign,
            Pubkey::new_unique(),
            position_buffer(&Pubkey::new_unique(), &Pubkey::new_unique(), 1 << 64),
        );
        let poolless = Pubkey::new_unique();
        source.insert_data(poolless, program, position_buffer(&Pubkey::new_unique(), &Pubkey::new_unique(), 1 << 64));

        let tvl = MeteoraValuer::new(&source, program)
            .value(&[missing, foreign, poolless])
            .await
            .unwrap();

        assert_eq!(tvl.positions_valued, 0);
        assert!(tvl.balances.is_empty());
        assert_eq!(tvl.skipped_positions, vec![missing, foreign, poolless]);
    }

    #[tokio::test]
    async fn test_no_positions_makes_no_requests() {
        let source = InMemoryAccountSource::new();
        let tvl = MeteoraValuer::new(&source, Pubkey::new_unique()).value(&[]).await.unwrap();
        assert_eq!(tvl, MeteoraTvl::default());
        assert!(source.multiple_accounts_calls().is_empty());
    }
}
