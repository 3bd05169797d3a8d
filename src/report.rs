// src/report.rs
use serde::Serialize;
use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;
use crate::application::{AdapterFailure, AmmVaultTvl, TreasuryTvl, TvlRun, AMM_ADAPTER, TREASURY_ADAPTER};
use crate::shared::types::{BalanceMap, SOLANA_CHAIN};
use crate::shared::utils::generate_id;

#[derive(Debug, Serialize)]
pub struct TvlReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub chain: String,
    pub adapters: Vec<AdapterReport>,

    /// DAO-owned Futarchy AMM liquidity, counted by both adapters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<BalanceMap>,

    pub audit: AuditDetails,
}

#[derive(Debug, Serialize)]
pub struct AdapterReport {
    pub adapter: String,
    pub methodology: String,
    pub token_accounts: Vec<String>,
    /// Balances computed off token accounts (LP valuations)
    pub balances: BalanceMap,
    /// Token account balances plus `balances`
    pub total: BalanceMap,
}

/// Entities that need a human look
#[derive(Debug, Default, Serialize)]
pub struct AuditDetails {
    /// DAOs whose vaults came from the heuristic buffer scan
    pub fallback_daos: Vec<String>,
    /// DAOs left out of the AMM vault total
    pub skipped_daos: Vec<String>,
    /// DAOs whose AMM vaults could not be read for LP valuation
    pub lp_skipped_daos: Vec<String>,
    /// Position candidates that could not be valued
    pub skipped_positions: Vec<String>,
    /// Adapters missing from `adapters` because their run failed
    pub failed_adapters: Vec<AdapterFailure>,
}

fn to_strings(keys: &[Pubkey]) -> Vec<String> {
    keys.iter().map(Pubkey::to_string).collect()
}

impl AdapterReport {
    pub fn from_amm(amm: &AmmVaultTvl) -> Self {
        Self {
            adapter: AMM_ADAPTER.to_string(),
            methodology: "Sum of all SPL token balances held by Futarchy AMM base and quote vaults, discovered per DAO from raw account data and validated as SPL token accounts.".to_string(),
            token_accounts: to_strings(&amm.token_accounts),
            balances: BalanceMap::new(),
            total: amm.balances.clone(),
        }
    }

    pub fn from_treasuries(treasuries: &TreasuryTvl) -> Self {
        Self {
            adapter: TREASURY_ADAPTER.to_string(),
            methodology: "Sum of Futarchy DAO Squads multisig vault token balances, value of DAO-owned Meteora DAMM v2 LP positions, and DAO-owned Futarchy AMM LP positions.".to_string(),
            token_accounts: to_strings(&treasuries.token_accounts),
            balances: treasuries.lp_balances(),
            total: treasuries.total(),
        }
    }
}

impl TvlReport {
    pub fn from_run(run: &TvlRun) -> Self {
        let mut adapters = Vec::new();
        let mut audit = AuditDetails {
            failed_adapters: run.failures.clone(),
            ..Default::default()
        };

        if let Some(amm) = &run.amm {
            adapters.push(AdapterReport::from_amm(amm));
            audit.fallback_daos = to_strings(&amm.fallback_daos);
            audit.skipped_daos = to_strings(&amm.skipped_daos);
        }
        if let Some(treasuries) = &run.treasuries {
            adapters.push(AdapterReport::from_treasuries(treasuries));
            audit.lp_skipped_daos = to_strings(&treasuries.dao_lp.skipped_daos);
            audit.skipped_positions = to_strings(&treasuries.meteora.skipped_positions);
        }

        Self {
            run_id: generate_id(),
            generated_at: Utc::now(),
            chain: SOLANA_CHAIN.to_string(),
            adapters,
            overlap: run.treasuries.as_ref().map(|treasuries| treasuries.dao_lp.balances.clone()),
            audit,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
