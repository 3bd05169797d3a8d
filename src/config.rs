use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use crate::infrastructure::blockchain::RetryPolicy;
use crate::shared::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: String,
    /// processed | confirmed | finalized
    pub commitment: String,
    /// Pause before every RPC request. The public mainnet endpoint needs
    /// seconds between calls; set 0 for a private node.
    pub request_delay_ms: u64,
    pub retry: RetryPolicy,
}

pub const DEFAULT_REQUEST_DELAY_MS: u64 = 5_000;

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramsCfg {
    pub futarchy: String,
    pub damm_v2: String,
}

impl Default for ProgramsCfg {
    fn default() -> Self {
        Self {
            futarchy: "FUTARELBfJfQ8RDGhg1wdhddq1odMAJUePHFuBYfUxKq".to_string(),
            damm_v2: "cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG".to_string(),
        }
    }
}

/// Vault discovery for the AMM vault adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmCfg {
    /// Data size filter for DAO account scans
    pub dao_account_size: u64,
    /// DAO whose vaults are known, used to learn vault offsets
    pub reference_dao: String,
    pub reference_base_vault: String,
    pub reference_quote_vault: String,
}

impl Default for AmmCfg {
    fn default() -> Self {
        Self {
            dao_account_size: 1129,
            reference_dao: "BLkBSE96kQys7SrMioKxeMiVbeo4Ckk2Y4n1JphKxYnv".to_string(),
            reference_base_vault: "71naRuPZLV3T6BSk4YpNYhyb2kKWbrefDMFu2Q49e9yd".to_string(),
            reference_quote_vault: "4zpwwXCcYrFivt57esQdbLfx1mAPRyDrG7Sf2RgRVc8b".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryCfg {
    /// Treasury owners not discoverable from DAO accounts
    pub extra_owners: Vec<String>,
    /// DAMM v2 position accounts valued in addition to NFT-discovered ones
    pub static_positions: Vec<String>,
}

impl Default for TreasuryCfg {
    fn default() -> Self {
        Self {
            // MetaDAO treasury
            extra_owners: vec!["BxgkvRwqzYFWuDbRjfTYfgTtb41NaFw1aQ3129F79eBT".to_string()],
            static_positions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcCfg,
    pub programs: ProgramsCfg,
    pub amm: AmmCfg,
    pub treasury: TreasuryCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
