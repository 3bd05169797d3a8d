//! Brute-force vault discovery inside a raw account buffer
//!
//! Every 32-byte window is treated as a candidate address and kept if it
//! resolves to a live SPL token account. This is a heuristic: it finds token
//! accounts referenced by the buffer, not necessarily the AMM vaults, so DAOs
//! resolved this way are reported for audit.

use solana_sdk::pubkey::Pubkey;
use tracing::debug;
use crate::domain::accounts::AccountSource;
use crate::infrastructure::blockchain::token_account::is_valid_token_account;
use crate::shared::errors::BlockchainError;
use crate::shared::utils::dedupe_in_order;
use super::vault_offsets::PUBKEY_LEN;

/// Most vaults a fallback scan returns: one base, one quote
pub const MAX_FALLBACK_VAULTS: usize = 2;

/// Every 32-byte window as a key, deduplicated in scan order
pub fn candidate_keys(data: &[u8]) -> Vec<Pubkey> {
    dedupe_in_order(data.windows(PUBKEY_LEN).map(|window| {
        let mut bytes = [0u8; PUBKEY_LEN];
        bytes.copy_from_slice(window);
        Pubkey::new_from_array(bytes)
    }))
}

/// The first two candidates that are genuine SPL token accounts, in scan order
pub async fn scan_vaults<S>(source: &S, data: &[u8]) -> Result<Vec<Pubkey>, BlockchainError>
where
    S: AccountSource + ?Sized,
{
    let candidates = candidate_keys(data);
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    debug!("Fallback scan: {} candidate keys", candidates.len());

    let infos = source.get_multiple_accounts_chunked(&candidates).await?;
    Ok(candidates
        .into_iter()
        .zip(infos)
        .filter(|(_, info)| is_valid_token_account(info.as_ref()))
        .map(|(key, _)| key)
        .take(MAX_FALLBACK_VAULTS)
        .collect())
}
