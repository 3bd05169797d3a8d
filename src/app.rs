// src/app.rs
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::{Adapter, AmmVaultSettings, ReferenceDao, TreasurySettings, TvlService, TvlSettings};
use crate::config::Config;
use crate::infrastructure::blockchain::{RetryPolicy, SolanaRpcClient};
use crate::report::TvlReport;
use crate::shared::errors::{AppError, ConfigError};

/// Runtime settings with every address parsed
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub request_delay: Duration,
    pub retry: RetryPolicy,
    pub tvl: TvlSettings,
    /// Report destination; stdout when unset
    pub output: Option<PathBuf>,
}

fn parse_address(field: &str, value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value.trim()).map_err(|_| ConfigError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_addresses(field: &str, values: &[String]) -> Result<Vec<Pubkey>, ConfigError> {
    values.iter().map(|value| parse_address(field, value)).collect()
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Result<Self, ConfigError> {
        let commitment = CommitmentConfig::from_str(&cfg.rpc.commitment)
            .map_err(|_| ConfigError::InvalidCommitment(cfg.rpc.commitment.clone()))?;
        let futarchy = parse_address("programs.futarchy", &cfg.programs.futarchy)?;

        Ok(Self {
            rpc_url: cfg.rpc.url,
            commitment,
            request_delay: Duration::from_millis(cfg.rpc.request_delay_ms),
            retry: cfg.rpc.retry,
            tvl: TvlSettings {
                amm: AmmVaultSettings {
                    program_id: futarchy,
                    dao_account_size: cfg.amm.dao_account_size,
                    reference: ReferenceDao {
                        dao: parse_address("amm.reference_dao", &cfg.amm.reference_dao)?,
                        base_vault: parse_address("amm.reference_base_vault", &cfg.amm.reference_base_vault)?,
                        quote_vault: parse_address("amm.reference_quote_vault", &cfg.amm.reference_quote_vault)?,
                    },
                },
                treasury: TreasurySettings {
                    program_id: futarchy,
                    damm_v2_program: parse_address("programs.damm_v2", &cfg.programs.damm_v2)?,
                    extra_owners: parse_addresses("treasury.extra_owners", &cfg.treasury.extra_owners)?,
                    static_positions: parse_addresses("treasury.static_positions", &cfg.treasury.static_positions)?,
                },
            },
            output: None,
        })
    }
}

/// Run `adapter` and emit the report. Fails only when no selected adapter
/// produced a result.
pub async fn run(app_cfg: AppCfg, adapter: Adapter) -> Result<(), AppError> {
    info!("Starting futarchy TVL run: {:?}", adapter);
    info!("RPC: {} ({:?})", app_cfg.rpc_url, app_cfg.commitment.commitment);

    let client = SolanaRpcClient::new(
        app_cfg.rpc_url.clone(),
        app_cfg.commitment,
        app_cfg.retry.clone(),
        app_cfg.request_delay,
    );

    let tvl = TvlService::new(&client, &app_cfg.tvl)
        .run(adapter)
        .await?;
    for failure in &tvl.failures {
        warn!("Report will not include {}: {}", failure.adapter, failure.error);
    }

    let report = TvlReport::from_run(&tvl);
    let json = report.to_json()?;

    match &app_cfg.output {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| AppError::WriteReport {
                path: path.display().to_string(),
                source,
            })?;
            info!("Report {} written to {}", report.run_id, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_converts() {
        let app_cfg = AppCfg::from_config(Config::default()).unwrap();
        assert_eq!(app_cfg.commitment, CommitmentConfig::confirmed());
        assert_eq!(app_cfg.request_delay, Duration::from_secs(5));
        assert_eq!(app_cfg.tvl.amm.program_id, app_cfg.tvl.treasury.program_id);
        assert_eq!(
            app_cfg.tvl.amm.reference.dao.to_string(),
            "BLkBSE96kQys7SrMioKxeMiVbeo4Ckk2Y4n1JphKxYnv"
        );
        assert_eq!(app_cfg.tvl.treasury.damm_v2_program, crate::infrastructure::blockchain::DAMM_V2_PROGRAM_ID);
        assert_eq!(app_cfg.tvl.treasury.extra_owners.len(), 1);
    }

    #[test]
    fn test_invalid_address_names_the_field() {
        let mut cfg = Config::default();
        cfg.treasury.static_positions = vec!["not-a-key".to_string()];
        match AppCfg::from_config(cfg) {
            Err(ConfigError::InvalidAddress { field, value }) => {
                assert_eq!(field, "treasury.static_positions");
                assert_eq!(value, "not-a-key");
            }
            other => panic!("expected invalid address, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_commitment() {
        let mut cfg = Config::default();
        cfg.rpc.commitment = "eventually".to_string();
        assert!(matches!(AppCfg::from_config(cfg), Err(ConfigError::InvalidCommitment(_))));
    }
}
