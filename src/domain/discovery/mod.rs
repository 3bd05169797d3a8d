//! Vault discovery inside DAO account buffers

pub mod fallback_scan;
pub mod vault_offsets;
pub mod vault_resolver;

pub use vault_offsets::{find_pubkey_offset, VaultOffsets, VaultPair};
pub use vault_resolver::{DaoVaults, VaultResolution, VaultResolver, VaultSource};
