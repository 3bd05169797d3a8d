//! DAO-owned liquidity in the Futarchy AMM
//!
//! Every `AmmPosition` of a known DAO is valued pro rata against the DAO's
//! live vault balances.

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use crate::domain::accounts::{AccountFilter, AccountSource};
use crate::domain::allocation::PoolSnapshot;
use crate::infrastructure::blockchain::futarchy_structures::{amm_position_discriminator, dao_discriminator};
use crate::infrastructure::blockchain::{AmmPosition, Dao, VaultReader};
use crate::shared::errors::BlockchainError;
use crate::shared::types::BalanceMap;
use crate::shared::utils::short_address;

/// Decoded DAO with its address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDao {
    pub address: Pubkey,
    pub dao: Dao,
}

/// Scan and decode every DAO of the program. Accounts that fail to decode
/// are logged and left out.
pub async fn scan_daos<S: AccountSource + ?Sized>(
    source: &S,
    program_id: &Pubkey,
) -> Result<Vec<DecodedDao>, BlockchainError> {
    let discriminator = dao_discriminator();
    debug!("Scanning {} for Dao accounts ({})", program_id, hex::encode(discriminator));
    let accounts = source
        .get_program_accounts(program_id, &[AccountFilter::memcmp(0, discriminator)])
        .await?;
    info!("Found DAO accounts: {}", accounts.len());

    let mut daos = Vec::with_capacity(accounts.len());
    for keyed in accounts {
        match Dao::try_decode(&keyed.account.data) {
            Ok(Some(dao)) => daos.push(DecodedDao { address: keyed.pubkey, dao }),
            Ok(None) => debug!("Account {} is not a DAO", keyed.pubkey),
            Err(e) => warn!("Failed to decode DAO {}: {}", keyed.pubkey, e),
        }
    }

    info!("Decoded DAOs: {}", daos.len());
    Ok(daos)
}

/// Balances held through DAO-owned AMM positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaoLpTvl {
    pub balances: BalanceMap,
    pub positions_valued: usize,
    /// DAOs whose vault balances could not be read
    pub skipped_daos: Vec<Pubkey>,
}

/// Values AMM positions held in decoded DAOs
pub struct DaoLpValuer<'a, S: AccountSource + ?Sized> {
    source: &'a S,
    program_id: Pubkey,
}

impl<'a, S: AccountSource + ?Sized> DaoLpValuer<'a, S> {
    pub fn new(source: &'a S, program_id: Pubkey) -> Self {
        Self { source, program_id }
    }

    pub async fn value(&self, daos: &[DecodedDao]) -> Result<DaoLpTvl, BlockchainError> {
        let discriminator = amm_position_discriminator();
        debug!("Scanning {} for AmmPosition accounts ({})", self.program_id, hex::encode(discriminator));
        let accounts = self
            .source
            .get_program_accounts(&self.program_id, &[AccountFilter::memcmp(0, discriminator)])
            .await?;
        info!("Found AmmPosition accounts: {}", accounts.len());

        let mut by_dao: HashMap<Pubkey, Vec<AmmPosition>> = HashMap::new();
        for keyed in &accounts {
            match AmmPosition::try_decode(&keyed.account.data) {
                Ok(Some(position)) => by_dao.entry(position.dao).or_default().push(position),
                Ok(None) => {}
                Err(e) => warn!("Failed to decode AmmPosition {}: {}", keyed.pubkey, e),
            }
        }

        let owned: usize = daos
            .iter()
            .filter_map(|dao| by_dao.get(&dao.address))
            .map(Vec::len)
            .sum();
        info!("DAO-owned LP positions: {}", owned);

        let reader = VaultReader::new(self.source);
        let mut tvl = DaoLpTvl::default();
        for decoded in daos {
            let positions = match by_dao.get(&decoded.address) {
                Some(positions) => positions,
                None => continue,
            };
            let amm = &decoded.dao.amm;
            if amm.total_liquidity == 0 {
                debug!("DAO {}: zero total liquidity", short_address(&decoded.address));
                continue;
            }

            let (base_balance, quote_balance) = match reader
                .get_pool_vault_balances(&amm.amm_base_vault, &amm.amm_quote_vault)
                .await
            {
                Ok(balances) => balances,
                Err(e) => {
                    warn!("Skipping DAO {} due to vault error: {}", decoded.address, e);
                    tvl.skipped_daos.push(decoded.address);
                    continue;
                }
            };

            let snapshot = PoolSnapshot {
                total_liquidity: amm.total_liquidity,
                base_vault_balance: base_balance,
                quote_vault_balance: quote_balance,
            };
            for position in positions {
                match snapshot.allocate(position.liquidity) {
                    Ok(Some(allocation)) => {
                        tvl.balances.add(&amm.base_mint, allocation.base as u128);
                        tvl.balances.add(&amm.quote_mint, allocation.quote as u128);
                        tvl.positions_valued += 1;
                    }
                    Ok(None) => {}
                    Err(e) => warn!(
                        "DAO {}: skipping position of {}: {}",
                        decoded.address, position.position_authority, e
                    ),
                }
            }
        }

        info!("Futarchy AMM tokens discovered: {}", tvl.balances.len());
        Ok(tvl)
    }
}
