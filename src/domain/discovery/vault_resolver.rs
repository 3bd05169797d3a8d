//! Per-DAO vault resolution: learned offsets first, buffer scan as fallback

use serde::Serialize;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use crate::domain::accounts::{AccountSource, KeyedAccount};
use crate::infrastructure::blockchain::token_account::is_valid_token_account;
use crate::shared::errors::BlockchainError;
use crate::shared::utils::{dedupe_in_order, short_address};
use super::fallback_scan::{scan_vaults, MAX_FALLBACK_VAULTS};
use super::vault_offsets::{VaultOffsets, VaultPair};

/// How a DAO's vaults were found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultSource {
    Offsets,
    /// Heuristic buffer scan; flagged for audit
    FallbackScan,
}

/// Validated vaults of one DAO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaoVaults {
    pub dao: Pubkey,
    pub vaults: VaultPair,
    pub source: VaultSource,
}

/// Outcome of resolving a batch of DAOs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultResolution {
    pub resolved: Vec<DaoVaults>,
    /// DAOs with fewer than two valid vaults under both strategies
    pub skipped: Vec<Pubkey>,
}

impl VaultResolution {
    /// Unique vault addresses across all resolved DAOs, base before quote
    pub fn unique_vaults(&self) -> Vec<Pubkey> {
        dedupe_in_order(
            self.resolved
                .iter()
                .flat_map(|dao| [dao.vaults.base, dao.vaults.quote]),
        )
    }

    pub fn fallback_daos(&self) -> Vec<Pubkey> {
        self.resolved
            .iter()
            .filter(|dao| dao.source == VaultSource::FallbackScan)
            .map(|dao| dao.dao)
            .collect()
    }
}

/// Resolves DAO vaults against an account source
pub struct VaultResolver<'a, S: AccountSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AccountSource + ?Sized> VaultResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve every DAO independently.
    ///
    /// Offset candidates for all DAOs are validated in one batched fetch.
    /// A DAO whose offset vaults fail validation is rescanned on its own; a
    /// failure there only skips that DAO.
    pub async fn resolve(
        &self,
        daos: &[KeyedAccount],
        offsets: Option<&VaultOffsets>,
    ) -> Result<VaultResolution, BlockchainError> {
        let candidates: Vec<(Pubkey, Option<VaultPair>)> = daos
            .iter()
            .map(|dao| {
                let pair = offsets.and_then(|offsets| offsets.extract(&dao.account.data));
                if let Some(pair) = pair {
                    debug!(
                        "DAO {}: offset-derived base {} quote {}",
                        short_address(&dao.pubkey),
                        pair.base,
                        pair.quote
                    );
                }
                (dao.pubkey, pair)
            })
            .collect();

        let infos = self.fetch_candidate_infos(&candidates).await?;
        info!("Validated {} offset-derived vault candidates", infos.len());

        let mut resolution = VaultResolution::default();
        for (&(dao, offset_pair), account) in candidates.iter().zip(daos) {
            let valid = |key: &Pubkey| is_valid_token_account(infos.get(key).and_then(|info| info.as_ref()));
            if let Some(pair) = offset_pair.filter(|pair| valid(&pair.base) && valid(&pair.quote)) {
                debug!("DAO {}: using offset-derived vaults", short_address(&dao));
                resolution.resolved.push(DaoVaults { dao, vaults: pair, source: VaultSource::Offsets });
                continue;
            }

            warn!("DAO {}: offset vaults invalid, falling back to buffer scan", dao);
            match scan_vaults(self.source, &account.account.data).await {
                Ok(found) if found.len() >= MAX_FALLBACK_VAULTS => {
                    let vaults = VaultPair { base: found[0], quote: found[1] };
                    warn!(
                        "DAO {}: fallback vaults base {} quote {} (needs audit)",
                        dao, vaults.base, vaults.quote
                    );
                    resolution.resolved.push(DaoVaults { dao, vaults, source: VaultSource::FallbackScan });
                }
                Ok(found) => {
                    warn!("DAO {}: found {} valid vaults, skipping", dao, found.len());
                    resolution.skipped.push(dao);
                }
                Err(e) => {
                    warn!("DAO {}: fallback scan failed, skipping: {}", dao, e);
                    resolution.skipped.push(dao);
                }
            }
        }

        Ok(resolution)
    }

    async fn fetch_candidate_infos(
        &self,
        candidates: &[(Pubkey, Option<VaultPair>)],
    ) -> Result<HashMap<Pubkey, Option<Account>>, BlockchainError> {
        let keys = dedupe_in_order(
            candidates
                .iter()
                .filter_map(|(_, pair)| *pair)
                .flat_map(|pair| [pair.base, pair.quote]),
        );
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let infos = self.source.get_multiple_accounts_chunked(&keys).await?;
        Ok(keys.into_iter().zip(infos).collect())
    }
}
