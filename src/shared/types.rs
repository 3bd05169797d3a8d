//! Common types used across the application

use serde::ser::{Serialize, SerializeMap, Serializer};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;

/// Chain prefix used in asset identifiers
pub const SOLANA_CHAIN: &str = "solana";

/// Chain-qualified asset identifier, `"<chain>:<mint>"`
pub fn asset_key(chain: &str, mint: &Pubkey) -> String {
    format!("{}:{}", chain, mint)
}

/// Aggregated raw token amounts keyed by asset identifier.
///
/// Amounts are raw base units (no decimals applied). Serializes as a map of
/// decimal strings so 128-bit totals survive JSON consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceMap {
    balances: BTreeMap<String, u128>,
}

impl BalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` of `mint` on Solana
    pub fn add(&mut self, mint: &Pubkey, amount: u128) {
        self.add_key(asset_key(SOLANA_CHAIN, mint), amount);
    }

    /// Add to an already formatted asset key
    pub fn add_key(&mut self, key: String, amount: u128) {
        let entry = self.balances.entry(key).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Fold another map into this one
    pub fn merge(&mut self, other: &BalanceMap) {
        for (key, amount) in &other.balances {
            self.add_key(key.clone(), *amount);
        }
    }

    pub fn get(&self, key: &str) -> Option<u128> {
        self.balances.get(key).copied()
    }

    pub fn get_mint(&self, mint: &Pubkey) -> u128 {
        self.get(&asset_key(SOLANA_CHAIN, mint)).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u128)> {
        self.balances.iter()
    }
}

impl Serialize for BalanceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.balances.len()))?;
        for (key, amount) in &self.balances {
            map.serialize_entry(key, &amount.to_string())?;
        }
        map.end()
    }
}
