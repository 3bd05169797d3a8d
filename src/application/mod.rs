//! Application layer - TVL adapters and the service running them

pub mod amm_vaults;
pub mod dao_positions;
pub mod meteora_positions;
pub mod services;
pub mod treasuries;

pub use amm_vaults::{AmmVaultCollector, AmmVaultSettings, AmmVaultTvl, ReferenceDao};
pub use dao_positions::{DaoLpTvl, DaoLpValuer, DecodedDao};
pub use meteora_positions::{MeteoraTvl, MeteoraValuer};
pub use services::{Adapter, AdapterFailure, TvlRun, TvlService, TvlSettings, AMM_ADAPTER, TREASURY_ADAPTER};
pub use treasuries::{TreasuryCollector, TreasurySettings, TreasuryTvl};
