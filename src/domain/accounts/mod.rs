//! Ledger account access

pub mod account_source;
#[cfg(test)]
pub mod memory_source;

pub use account_source::{AccountFilter, AccountSource, KeyedAccount, MULTIPLE_ACCOUNTS_CHUNK};
