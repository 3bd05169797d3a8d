//! TVL service combining the adapters

use serde::Serialize;
use tracing::{error, info};
use crate::domain::accounts::AccountSource;
use crate::shared::errors::BlockchainError;
use super::amm_vaults::{AmmVaultCollector, AmmVaultSettings, AmmVaultTvl};
use super::treasuries::{TreasuryCollector, TreasurySettings, TreasuryTvl};

/// Which adapters to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Amm,
    Treasuries,
    All,
}

impl Adapter {
    pub fn includes_amm(self) -> bool {
        matches!(self, Adapter::Amm | Adapter::All)
    }

    pub fn includes_treasuries(self) -> bool {
        matches!(self, Adapter::Treasuries | Adapter::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvlSettings {
    pub amm: AmmVaultSettings,
    pub treasury: TreasurySettings,
}

pub const AMM_ADAPTER: &str = "futarchy-amm";
pub const TREASURY_ADAPTER: &str = "futarchy-treasuries";

/// Adapter that stopped on an RPC error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterFailure {
    pub adapter: &'static str,
    pub error: String,
}

/// Adapter results of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TvlRun {
    pub amm: Option<AmmVaultTvl>,
    pub treasuries: Option<TreasuryTvl>,
    pub failures: Vec<AdapterFailure>,
}

impl TvlRun {
    fn record_failure(&mut self, adapter: &'static str, e: &BlockchainError) {
        error!("{} adapter failed: {}", adapter, e);
        self.failures.push(AdapterFailure {
            adapter,
            error: e.to_string(),
        });
    }
}

pub struct TvlService<'a, S: AccountSource + ?Sized> {
    source: &'a S,
    settings: &'a TvlSettings,
}

impl<'a, S: AccountSource + ?Sized> TvlService<'a, S> {
    pub fn new(source: &'a S, settings: &'a TvlSettings) -> Self {
        Self { source, settings }
    }

    /// Run the selected adapters independently. Fails only when every
    /// selected adapter failed; otherwise failures are kept in the run.
    pub async fn run(&self, adapter: Adapter) -> Result<TvlRun, BlockchainError> {
        let mut run = TvlRun::default();
        let mut last_error = None;

        if adapter.includes_amm() {
            info!("Running {} adapter", AMM_ADAPTER);
            match AmmVaultCollector::new(self.source, &self.settings.amm).collect().await {
                Ok(amm) => {
                    info!(
                        "{}: {} DAOs, {} vaults, {} tokens",
                        AMM_ADAPTER,
                        amm.dao_count,
                        amm.token_accounts.len(),
                        amm.balances.len()
                    );
                    run.amm = Some(amm);
                }
                Err(e) => {
                    run.record_failure(AMM_ADAPTER, &e);
                    last_error = Some(e);
                }
            }
        }

        if adapter.includes_treasuries() {
            info!("Running {} adapter", TREASURY_ADAPTER);
            match TreasuryCollector::new(self.source, &self.settings.treasury).collect().await {
                Ok(treasuries) => {
                    info!(
                        "{}: {} owners, {} token accounts, {} LP tokens",
                        TREASURY_ADAPTER,
                        treasuries.owners.len(),
                        treasuries.token_accounts.len(),
                        treasuries.lp_balances().len()
                    );
                    run.treasuries = Some(treasuries);
                }
                Err(e) => {
                    run.record_failure(TREASURY_ADAPTER, &e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if run.amm.is_none() && run.treasuries.is_none() => Err(e),
            _ => Ok(run),
        }
    }
}
