//! Account source interface

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use crate::shared::errors::BlockchainError;

/// Max keys per `getMultipleAccounts` request
pub const MULTIPLE_ACCOUNTS_CHUNK: usize = 100;

/// Server-side filter for program account scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Exact account data length
    DataSize(u64),
    /// Bytes that must appear at `offset`
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        AccountFilter::Memcmp { offset, bytes: bytes.into() }
    }

    /// Whether account data passes this filter
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            AccountFilter::DataSize(size) => data.len() as u64 == *size,
            AccountFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .map_or(false, |window| window == bytes.as_slice()),
        }
    }
}

/// Account paired with its address
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedAccount {
    pub pubkey: Pubkey,
    pub account: Account,
}

/// Read-only view of ledger accounts
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// All accounts owned by `program_id` passing every filter
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<KeyedAccount>, BlockchainError>;

    /// One entry per requested key, `None` where the account does not exist
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, BlockchainError>;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, BlockchainError> {
        let mut accounts = self.get_multiple_accounts(std::slice::from_ref(address)).await?;
        Ok(accounts.pop().flatten())
    }

    /// `get_multiple_accounts` split into request-sized chunks
    async fn get_multiple_accounts_chunked(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, BlockchainError> {
        let mut results = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MULTIPLE_ACCOUNTS_CHUNK) {
            let mut accounts = self.get_multiple_accounts(chunk).await?;
            // keep positional alignment even if a node returns a short page
            accounts.resize(chunk.len(), None);
            results.extend(accounts);
        }
        Ok(results)
    }
}
