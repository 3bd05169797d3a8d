//! Futarchy AMM vault TVL: every DAO's base and quote vault balance

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};
use crate::domain::accounts::{AccountFilter, AccountSource, KeyedAccount};
use crate::domain::discovery::{VaultOffsets, VaultResolver};
use crate::infrastructure::blockchain::VaultReader;
use crate::shared::errors::BlockchainError;
use crate::shared::types::BalanceMap;

/// DAO with known vaults, used to learn vault offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDao {
    pub dao: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmVaultSettings {
    pub program_id: Pubkey,
    pub dao_account_size: u64,
    pub reference: ReferenceDao,
}

/// Result of the AMM vault pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmmVaultTvl {
    pub dao_count: usize,
    /// Vaults that passed final validation
    pub token_accounts: Vec<Pubkey>,
    pub balances: BalanceMap,
    /// DAOs resolved by the heuristic buffer scan
    pub fallback_daos: Vec<Pubkey>,
    /// DAOs with fewer than two valid vaults
    pub skipped_daos: Vec<Pubkey>,
}

/// Collects vault balances for every DAO of the AMM program
pub struct AmmVaultCollector<'a, S: AccountSource + ?Sized> {
    source: &'a S,
    settings: &'a AmmVaultSettings,
}

impl<'a, S: AccountSource + ?Sized> AmmVaultCollector<'a, S> {
    pub fn new(source: &'a S, settings: &'a AmmVaultSettings) -> Self {
        Self { source, settings }
    }

    pub async fn collect(&self) -> Result<AmmVaultTvl, BlockchainError> {
        info!("Fetching DAO accounts of {} bytes", self.settings.dao_account_size);
        let daos = self
            .source
            .get_program_accounts(
                &self.settings.program_id,
                &[AccountFilter::DataSize(self.settings.dao_account_size)],
            )
            .await?;
        info!("Found DAO accounts: {}", daos.len());

        let offsets = self.learn_offsets(&daos);
        if offsets.is_none() {
            warn!("Vault offsets unknown, every DAO goes through the buffer scan");
        }

        let resolution = VaultResolver::new(self.source)
            .resolve(&daos, offsets.as_ref())
            .await?;

        let vaults = resolution.unique_vaults();
        info!("Unique vault accounts: {}", vaults.len());

        let totals = if vaults.is_empty() {
            warn!("No valid vault accounts found");
            Default::default()
        } else {
            VaultReader::new(self.source).sum_token_accounts(&vaults).await?
        };

        Ok(AmmVaultTvl {
            dao_count: daos.len(),
            token_accounts: totals.token_accounts,
            balances: totals.balances,
            fallback_daos: resolution.fallback_daos(),
            skipped_daos: resolution.skipped,
        })
    }

    fn learn_offsets(&self, daos: &[KeyedAccount]) -> Option<VaultOffsets> {
        let reference = &self.settings.reference;
        let account = match daos.iter().find(|dao| dao.pubkey == reference.dao) {
            Some(account) => account,
            None => {
                warn!("Reference DAO {} not found in scan", reference.dao);
                return None;
            }
        };

        let offsets = VaultOffsets::learn(&account.account.data, &reference.base_vault, &reference.quote_vault);
        match offsets {
            Some(offsets) => info!("Base vault offset: {}, quote vault offset: {}", offsets.base, offsets.quote),
            None => warn!("Reference vaults not present in DAO {} data", reference.dao),
        }
        offsets
    }
}
