//! Futarchy DAO treasuries: Squads vault holdings, DAO-owned AMM liquidity
//! and Meteora DAMM v2 LP positions held as NFTs

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};
use crate::domain::accounts::{AccountFilter, AccountSource};
use crate::infrastructure::blockchain::pda::derive_position_pda_with_bump;
use crate::infrastructure::blockchain::token_account::{token_program_ids, TOKEN_ACCOUNT_LEN};
use crate::infrastructure::blockchain::TokenAccountView;
use crate::shared::errors::BlockchainError;
use crate::shared::types::BalanceMap;
use crate::shared::utils::{dedupe_in_order, short_address};
use super::dao_positions::{scan_daos, DaoLpTvl, DaoLpValuer, DecodedDao};
use super::meteora_positions::{MeteoraTvl, MeteoraValuer};

/// Offset of the owner field in a token account
const TOKEN_OWNER_OFFSET: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasurySettings {
    pub program_id: Pubkey,
    pub damm_v2_program: Pubkey,
    pub extra_owners: Vec<Pubkey>,
    pub static_positions: Vec<Pubkey>,
}

/// Result of the treasury pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreasuryTvl {
    pub dao_count: usize,
    pub owners: Vec<Pubkey>,
    /// Every token account held by a treasury owner
    pub token_accounts: Vec<Pubkey>,
    /// Balances of `token_accounts`
    pub holdings: BalanceMap,
    pub dao_lp: DaoLpTvl,
    pub meteora: MeteoraTvl,
}

impl TreasuryTvl {
    /// LP balances: DAO-owned AMM liquidity plus Meteora positions
    pub fn lp_balances(&self) -> BalanceMap {
        let mut balances = self.dao_lp.balances.clone();
        balances.merge(&self.meteora.balances);
        balances
    }

    /// Holdings plus LP balances
    pub fn total(&self) -> BalanceMap {
        let mut total = self.holdings.clone();
        total.merge(&self.lp_balances());
        total
    }
}

/// Token holdings of a set of owners
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Holdings {
    token_accounts: Vec<Pubkey>,
    balances: BalanceMap,
    /// Mints held in exactly one unit: LP position NFT candidates
    nft_mints: Vec<Pubkey>,
}

pub struct TreasuryCollector<'a, S: AccountSource + ?Sized> {
    source: &'a S,
    settings: &'a TreasurySettings,
}

impl<'a, S: AccountSource + ?Sized> TreasuryCollector<'a, S> {
    pub fn new(source: &'a S, settings: &'a TreasurySettings) -> Self {
        Self { source, settings }
    }

    pub async fn collect(&self) -> Result<TreasuryTvl, BlockchainError> {
        info!("=== Futarchy AMM LP Positions ===");
        let daos = scan_daos(self.source, &self.settings.program_id).await?;
        let dao_lp = DaoLpValuer::new(self.source, self.settings.program_id)
            .value(&daos)
            .await?;

        info!("== Double Counted TVL ==");
        for (asset, amount) in dao_lp.balances.iter() {
            info!("{} {}", asset, amount);
        }

        info!("=== Futarchy Vaults & Meteora ===");
        let owners = self.treasury_owners(&daos);
        info!("Treasury owners: {}", owners.len());

        let holdings = self.scan_holdings(&owners).await;
        info!("Total Futarchy token accounts: {}", holdings.token_accounts.len());
        info!("Discovered Meteora NFT mints: {}", holdings.nft_mints.len());

        let positions = self.position_candidates(&holdings.nft_mints);
        info!("Position candidates: {}", positions.len());

        let meteora = match MeteoraValuer::new(self.source, self.settings.damm_v2_program)
            .value(&positions)
            .await
        {
            Ok(meteora) => meteora,
            Err(e) => {
                warn!("Meteora valuation failed: {}", e);
                MeteoraTvl::default()
            }
        };

        let tvl = TreasuryTvl {
            dao_count: daos.len(),
            owners,
            token_accounts: holdings.token_accounts,
            holdings: holdings.balances,
            dao_lp,
            meteora,
        };
        info!("Total unique tokens: {}", tvl.total().len());
        Ok(tvl)
    }

    /// Squads vault of every DAO that has one, then the configured owners
    fn treasury_owners(&self, daos: &[DecodedDao]) -> Vec<Pubkey> {
        let vaults = daos
            .iter()
            .filter_map(|decoded| decoded.dao.treasury.as_ref())
            .map(|treasury| treasury.squads_multisig_vault)
            .filter(|vault| *vault != Pubkey::default());
        dedupe_in_order(vaults.chain(self.settings.extra_owners.iter().copied()))
    }

    /// Token accounts of every owner under both token programs. A failed
    /// scan only loses that owner and program.
    async fn scan_holdings(&self, owners: &[Pubkey]) -> Holdings {
        let mut holdings = Holdings::default();
        for owner in owners {
            for program in token_program_ids() {
                let mut filters = vec![AccountFilter::memcmp(TOKEN_OWNER_OFFSET, owner.to_bytes())];
                if program == spl_token::id() {
                    filters.push(AccountFilter::DataSize(TOKEN_ACCOUNT_LEN as u64));
                }

                let accounts = match self.source.get_program_accounts(&program, &filters).await {
                    Ok(accounts) => accounts,
                    Err(e) => {
                        warn!("Vault fetch error: {} {}", owner, e);
                        continue;
                    }
                };
                debug!("Owner {}: {} accounts under {}", short_address(owner), accounts.len(), program);

                for keyed in accounts {
                    let view = match TokenAccountView::decode(&keyed.account.data) {
                        Ok(view) => view,
                        Err(e) => {
                            warn!("Token account {}: {}", keyed.pubkey, e);
                            continue;
                        }
                    };
                    holdings.token_accounts.push(keyed.pubkey);
                    holdings.balances.add(&view.mint, view.amount as u128);
                    if view.amount == 1 {
                        holdings.nft_mints.push(view.mint);
                    }
                }
            }
        }
        holdings.nft_mints = dedupe_in_order(holdings.nft_mints);
        holdings
    }

    /// Position PDAs of the NFT mints, then the configured static positions
    fn position_candidates(&self, nft_mints: &[Pubkey]) -> Vec<Pubkey> {
        let derived = nft_mints
            .iter()
            .map(|mint| derive_position_pda_with_bump(mint, &self.settings.damm_v2_program).0);
        dedupe_in_order(derived.chain(self.settings.static_positions.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::memory_source::InMemoryAccountSource;
    use crate::infrastructure::blockchain::futarchy_structures::fixtures::{amm_position_buffer, DaoFixture};
    use crate::infrastructure::blockchain::meteora_structures::fixtures::{pool_buffer, position_buffer, unit_price_pool};
    use crate::infrastructure::blockchain::pda::DAMM_V2_PROGRAM_ID;
    use crate::infrastructure::blockchain::token_account::fixtures::{spl_token_account, token_account_data};
    use crate::infrastructure::blockchain::token_account::TOKEN_2022_PROGRAM_ID;

    fn settings(program_id: Pubkey, extra_owners: Vec<Pubkey>) -> TreasurySettings {
        TreasurySettings {
            program_id,
            damm_v2_program: DAMM_V2_PROGRAM_ID,
            extra_owners,
            static_positions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_full_treasury_pipeline() {
        let program = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();

        // DAO with a Squads vault and one AMM position owning all liquidity
        let squads_vault = Pubkey::new_unique();
        let fixture = DaoFixture {
            squads_multisig_vault: Some(squads_vault),
            ..DaoFixture::new(0)
        };
        let dao = Pubkey::new_unique();
        source.insert_data(dao, program, fixture.encode());
        source.insert(fixture.base_vault, spl_token_account(&fixture.base_mint, &dao, 1_000_000));
        source.insert(fixture.quote_vault, spl_token_account(&fixture.quote_mint, &dao, 2_000_000));
        source.insert_data(
            Pubkey::new_unique(),
            program,
            amm_position_buffer(&dao, &squads_vault, fixture.total_liquidity),
        );

        // Treasury holdings: plain tokens plus a DAMM v2 position NFT
        let usdc = Pubkey::new_unique();
        let usdc_account = Pubkey::new_unique();
        source.insert(usdc_account, spl_token_account(&usdc, &squads_vault, 5_000));
        let nft_mint = Pubkey::new_unique();
        source.insert(Pubkey::new_unique(), spl_token_account(&nft_mint, &squads_vault, 1));
        let token_2022_mint = Pubkey::new_unique();
        let mut extended = token_account_data(&token_2022_mint, &squads_vault, 42);
        extended.extend_from_slice(&[0u8; 17]);
        source.insert_data(Pubkey::new_unique(), TOKEN_2022_PROGRAM_ID, extended);

        let pool_key = Pubkey::new_unique();
        let pool = unit_price_pool();
        source.insert_data(pool_key, DAMM_V2_PROGRAM_ID, pool_buffer(&pool));
        let (position_pda, _) = derive_position_pda_with_bump(&nft_mint, &DAMM_V2_PROGRAM_ID);
        source.insert_data(position_pda, DAMM_V2_PROGRAM_ID, position_buffer(&pool_key, &nft_mint, 1000 << 64));

        let settings = settings(program, vec![]);
        let tvl = TreasuryCollector::new(&source, &settings).collect().await.unwrap();

        assert_eq!(tvl.dao_count, 1);
        assert_eq!(tvl.owners, vec![squads_vault]);
        assert_eq!(tvl.token_accounts.len(), 3);
        assert_eq!(tvl.holdings.get_mint(&usdc), 5_000);
        assert_eq!(tvl.holdings.get_mint(&token_2022_mint), 42);

        assert_eq!(tvl.dao_lp.balances.get_mint(&fixture.base_mint), 1_000_000);
        assert_eq!(tvl.dao_lp.balances.get_mint(&fixture.quote_mint), 2_000_000);
        assert_eq!(tvl.meteora.positions_valued, 1);

        let lp = tvl.lp_balances();
        assert_eq!(lp.get_mint(&pool.token_a_mint), 500);
        assert_eq!(lp.get_mint(&fixture.base_mint), 1_000_000);
        assert_eq!(lp.get_mint(&usdc), 0);

        let total = tvl.total();
        assert_eq!(total.get_mint(&usdc), 5_000);
        assert_eq!(total.get_mint(&nft_mint), 1);
        assert_eq!(total.get_mint(&pool.token_b_mint), 500);
    }

    #[tokio::test]
    async fn test_owner_failure_is_isolated() {
        let program = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();
        source.insert(Pubkey::new_unique(), spl_token_account(&mint, &owner, 9));
        source.fail_program(TOKEN_2022_PROGRAM_ID);

        let settings = settings(program, vec![owner, owner]);
        let tvl = TreasuryCollector::new(&source, &settings).collect().await.unwrap();

        assert_eq!(tvl.dao_count, 0);
        assert_eq!(tvl.owners, vec![owner]);
        assert_eq!(tvl.holdings.get_mint(&mint), 9);
        assert!(tvl.lp_balances().is_empty());
    }

    #[tokio::test]
    async fn test_static_positions_are_valued() {
        let program = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();

        let pool_key = Pubkey::new_unique();
        let pool = unit_price_pool();
        source.insert_data(pool_key, DAMM_V2_PROGRAM_ID, pool_buffer(&pool));
        let static_position = Pubkey::new_unique();
        source.insert_data(
            static_position,
            DAMM_V2_PROGRAM_ID,
            position_buffer(&pool_key, &Pubkey::new_unique(), 2000 << 64),
        );

        let settings = TreasurySettings {
            static_positions: vec![static_position],
            ..settings(program, vec![])
        };
        let tvl = TreasuryCollector::new(&source, &settings).collect().await.unwrap();

        assert!(tvl.token_accounts.is_empty());
        assert_eq!(tvl.meteora.positions_valued, 1);
        assert_eq!(tvl.total().get_mint(&pool.token_a_mint), 1_000);
    }

    #[tokio::test]
    async fn test_dao_scan_failure_propagates() {
        let program = Pubkey::new_unique();
        let mut source = InMemoryAccountSource::new();
        source.fail_program(program);

        let settings = settings(program, vec![]);
        assert!(TreasuryCollector::new(&source, &settings).collect().await.is_err());
    }
}
