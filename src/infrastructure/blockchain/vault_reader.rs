//! Vault balance reader for real token reserves

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};
use crate::domain::accounts::AccountSource;
use crate::shared::errors::BlockchainError;
use crate::shared::types::BalanceMap;
use super::token_account::{is_valid_token_account, token_amount, TokenAccountView};

/// Token balances summed from a set of SPL token accounts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAccountTotals {
    /// Accounts that passed validation, in input order
    pub token_accounts: Vec<Pubkey>,
    pub balances: BalanceMap,
}

/// Service for reading real vault balances
pub struct VaultReader<'a, S: AccountSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: AccountSource + ?Sized> VaultReader<'a, S> {
    /// Create new vault reader
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Get token account balance; a missing account reads as zero
    pub async fn get_token_account_balance(&self, token_account: &Pubkey) -> Result<u64, BlockchainError> {
        let account = self.source.get_account(token_account).await?;
        Ok(token_amount(account.as_ref()))
    }

    /// Get vault balances for a pool
    pub async fn get_pool_vault_balances(
        &self,
        base_vault: &Pubkey,
        quote_vault: &Pubkey,
    ) -> Result<(u64, u64), BlockchainError> {
        let accounts = self
            .source
            .get_multiple_accounts(&[*base_vault, *quote_vault])
            .await?;
        let base = token_amount(accounts.first().and_then(|account| account.as_ref()));
        let quote = token_amount(accounts.get(1).and_then(|account| account.as_ref()));
        Ok((base, quote))
    }

    /// Re-validate `vaults` as SPL token accounts and sum their balances per mint
    pub async fn sum_token_accounts(&self, vaults: &[Pubkey]) -> Result<TokenAccountTotals, BlockchainError> {
        let infos = self.source.get_multiple_accounts_chunked(vaults).await?;

        let mut totals = TokenAccountTotals::default();
        for (vault, info) in vaults.iter().zip(&infos) {
            let account = match info.as_ref().filter(|account| is_valid_token_account(Some(*account))) {
                Some(account) => account,
                None => {
                    debug!("Vault {} failed final validation", vault);
                    continue;
                }
            };
            match TokenAccountView::unpack_spl(&account.data) {
                Ok(view) => {
                    totals.balances.add(&view.mint, view.amount as u128);
                    totals.token_accounts.push(*vault);
                }
                Err(e) => debug!("Vault {} is not an initialized token account: {}", vault, e),
            }
        }

        info!(
            "Valid token vaults: {}, skipped after final filter: {}",
            totals.token_accounts.len(),
            vaults.len() - totals.token_accounts.len()
        );
        Ok(totals)
    }
}
