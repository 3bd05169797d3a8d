//! Vault addresses at learned byte offsets

use solana_sdk::pubkey::Pubkey;
use crate::infrastructure::blockchain::account_reader::AccountReader;

pub const PUBKEY_LEN: usize = 32;

/// First byte offset where `key` appears in `data`
pub fn find_pubkey_offset(data: &[u8], key: &Pubkey) -> Option<usize> {
    data.windows(PUBKEY_LEN).position(|window| window == key.as_ref())
}

/// Base and quote vault of one DAO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultPair {
    pub base: Pubkey,
    pub quote: Pubkey,
}

/// Byte offsets of the base and quote vault inside a DAO account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultOffsets {
    pub base: usize,
    pub quote: usize,
}

impl VaultOffsets {
    /// Locate both known vaults inside a reference account.
    /// `None` unless both are present.
    pub fn learn(reference: &[u8], base_vault: &Pubkey, quote_vault: &Pubkey) -> Option<Self> {
        Some(Self {
            base: find_pubkey_offset(reference, base_vault)?,
            quote: find_pubkey_offset(reference, quote_vault)?,
        })
    }

    /// Read the vault pair of another account of the same layout.
    /// `None` when the account is too short for either offset.
    pub fn extract(&self, data: &[u8]) -> Option<VaultPair> {
        Some(VaultPair {
            base: AccountReader::at(data, self.base).read_pubkey().ok()?,
            quote: AccountReader::at(data, self.quote).read_pubkey().ok()?,
        })
    }
}
