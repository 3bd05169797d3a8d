//! In-memory account source for tests

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Mutex;
use crate::shared::errors::BlockchainError;
use super::account_source::{AccountFilter, AccountSource, KeyedAccount};

/// Accounts held in a map, filtered the way an RPC node filters them
#[derive(Default)]
pub struct InMemoryAccountSource {
    accounts: Vec<KeyedAccount>,
    failing_programs: Vec<Pubkey>,
    failing_memcmp_offsets: Vec<usize>,
    multiple_accounts_calls: Mutex<Vec<usize>>,
}

impl InMemoryAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pubkey: Pubkey, account: Account) {
        self.accounts.retain(|keyed| keyed.pubkey != pubkey);
        self.accounts.push(KeyedAccount { pubkey, account });
    }

    /// Account with `data` owned by `owner`
    pub fn insert_data(&mut self, pubkey: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.insert(
            pubkey,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Make program scans for `program_id` fail
    pub fn fail_program(&mut self, program_id: Pubkey) {
        self.failing_programs.push(program_id);
    }

    /// Make program scans carrying a memcmp filter at `offset` fail
    pub fn fail_memcmp_at(&mut self, offset: usize) {
        self.failing_memcmp_offsets.push(offset);
    }

    /// Sizes of every `get_multiple_accounts` request seen so far
    pub fn multiple_accounts_calls(&self) -> Vec<usize> {
        self.multiple_accounts_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn index(&self) -> HashMap<Pubkey, &Account> {
        self.accounts
            .iter()
            .map(|keyed| (keyed.pubkey, &keyed.account))
            .collect()
    }
}

#[async_trait]
impl AccountSource for InMemoryAccountSource {
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<KeyedAccount>, BlockchainError> {
        if self.failing_programs.contains(program_id) {
            return Err(BlockchainError::Rpc(format!("scan of {} failed", program_id)));
        }
        let memcmp_fails = filters.iter().any(|filter| {
            matches!(filter, AccountFilter::Memcmp { offset, .. } if self.failing_memcmp_offsets.contains(offset))
        });
        if memcmp_fails {
            return Err(BlockchainError::Rpc("timeout".to_string()));
        }

        Ok(self
            .accounts
            .iter()
            .filter(|keyed| keyed.account.owner == *program_id)
            .filter(|keyed| filters.iter().all(|filter| filter.matches(&keyed.account.data)))
            .cloned()
            .collect())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, BlockchainError> {
        if let Ok(mut calls) = self.multiple_accounts_calls.lock() {
            calls.push(addresses.len());
        }
        let index = self.index();
        Ok(addresses
            .iter()
            .map(|address| index.get(address).map(|account| (*account).clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_program_scan_applies_owner_and_filters() {
        let program = Pubkey::new_unique();
        let other_program = Pubkey::new_unique();
        let matching = Pubkey::new_unique();

        let mut source = InMemoryAccountSource::new();
        source.insert_data(matching, program, vec![7, 7, 1]);
        source.insert_data(Pubkey::new_unique(), program, vec![8, 7, 1]);
        source.insert_data(Pubkey::new_unique(), other_program, vec![7, 7, 1]);

        let found = source
            .get_program_accounts(&program, &[AccountFilter::memcmp(0, vec![7])])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pubkey, matching);
    }

    #[tokio::test]
    async fn test_failing_memcmp_offset_only_hits_matching_scans() {
        let program = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();
        source.insert_data(Pubkey::new_unique(), program, vec![7, 7, 1]);
        source.fail_memcmp_at(0);

        assert!(source
            .get_program_accounts(&program, &[AccountFilter::memcmp(0, vec![7])])
            .await
            .is_err());
        let found = source
            .get_program_accounts(&program, &[AccountFilter::memcmp(1, vec![7]), AccountFilter::DataSize(3)])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_chunked_fetch_keeps_alignment() {
        let owner = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();
        let keys: Vec<Pubkey> = (0..250).map(|_| Pubkey::new_unique()).collect();
        for key in keys.iter().step_by(2) {
            source.insert_data(*key, owner, key.to_bytes().to_vec());
        }

        let accounts = source.get_multiple_accounts_chunked(&keys).await.unwrap();
        assert_eq!(accounts.len(), 250);
        for (i, (key, account)) in keys.iter().zip(&accounts).enumerate() {
            match account {
                Some(account) => {
                    assert_eq!(i % 2, 0);
                    assert_eq!(account.data, key.to_bytes().to_vec());
                }
                None => assert_eq!(i % 2, 1),
            }
        }
        assert_eq!(source.multiple_accounts_calls(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_get_account() {
        let key = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();
        source.insert_data(key, Pubkey::new_unique(), vec![1]);

        assert!(source.get_account(&key).await.unwrap().is_some());
        assert!(source.get_account(&Pubkey::new_unique()).await.unwrap().is_none());
    }
}
