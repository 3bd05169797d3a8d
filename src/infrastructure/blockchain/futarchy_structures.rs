//! Futarchy program account structures
//!
//! Layouts are Anchor/Borsh encoded: an 8-byte discriminator followed by the
//! fields in declaration order with no padding.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use crate::shared::errors::DecodeError;
use super::account_reader::AccountReader;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Serialized size of a `TwapOracle`. Not decoded, only skipped.
pub const TWAP_ORACLE_LEN: usize = 100;

/// Serialized size of a `Pool`: oracle plus four u64 balances
pub const POOL_LEN: usize = TWAP_ORACLE_LEN + 4 * 8;

pub const POOL_STATE_SPOT_TAG: u8 = 0;
pub const POOL_STATE_FUTARCHY_TAG: u8 = 1;

/// Anchor account discriminator: first 8 bytes of `sha256("account:<name>")`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("account:{}", name).as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    discriminator
}

pub fn dao_discriminator() -> [u8; 8] {
    account_discriminator("Dao")
}

pub fn amm_position_discriminator() -> [u8; 8] {
    account_discriminator("AmmPosition")
}

/// True when `data` starts with `discriminator`. Short buffers never match.
pub fn has_discriminator(data: &[u8], discriminator: &[u8; 8]) -> bool {
    data.len() >= DISCRIMINATOR_LEN && data[..DISCRIMINATOR_LEN] == discriminator[..]
}

/// One constant-product pool inside the DAO's AMM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Raw TWAP oracle state
    pub oracle: [u8; TWAP_ORACLE_LEN],
    pub quote_reserves: u64,
    pub base_reserves: u64,
    pub quote_protocol_fee_balance: u64,
    pub base_protocol_fee_balance: u64,
}

impl Pool {
    fn read(reader: &mut AccountReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            oracle: reader.read_fixed_bytes::<TWAP_ORACLE_LEN>()?,
            quote_reserves: reader.read_u64_le()?,
            base_reserves: reader.read_u64_le()?,
            quote_protocol_fee_balance: reader.read_u64_le()?,
            base_protocol_fee_balance: reader.read_u64_le()?,
        })
    }
}

/// AMM pool state. A spot-only AMM holds one pool; while a proposal is live
/// the AMM is split into spot, pass and fail pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolState {
    Spot { spot: Pool },
    Futarchy { spot: Pool, pass: Pool, fail: Pool },
}

impl PoolState {
    fn read(reader: &mut AccountReader<'_>) -> Result<Self, DecodeError> {
        match reader.read_u8()? {
            POOL_STATE_SPOT_TAG => Ok(PoolState::Spot {
                spot: Pool::read(reader)?,
            }),
            POOL_STATE_FUTARCHY_TAG => Ok(PoolState::Futarchy {
                spot: Pool::read(reader)?,
                pass: Pool::read(reader)?,
                fail: Pool::read(reader)?,
            }),
            tag => Err(DecodeError::UnknownPoolStateTag(tag)),
        }
    }

    pub fn spot(&self) -> &Pool {
        match self {
            PoolState::Spot { spot } | PoolState::Futarchy { spot, .. } => spot,
        }
    }
}

/// The AMM embedded at the start of every DAO account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoAmm {
    pub state: PoolState,
    pub total_liquidity: u128,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub amm_base_vault: Pubkey,
    pub amm_quote_vault: Pubkey,
}

impl DaoAmm {
    fn read(reader: &mut AccountReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            state: PoolState::read(reader)?,
            total_liquidity: reader.read_u128_le()?,
            base_mint: reader.read_pubkey()?,
            quote_mint: reader.read_pubkey()?,
            amm_base_vault: reader.read_pubkey()?,
            amm_quote_vault: reader.read_pubkey()?,
        })
    }
}

/// Governance fields following the AMM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoTreasury {
    pub nonce: u64,
    pub dao_creator: Pubkey,
    pub pda_bump: u8,
    pub squads_multisig: Pubkey,
    /// Squads vault holding the DAO treasury
    pub squads_multisig_vault: Pubkey,
}

impl DaoTreasury {
    fn read(reader: &mut AccountReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            nonce: reader.read_u64_le()?,
            dao_creator: reader.read_pubkey()?,
            pda_bump: reader.read_u8()?,
            squads_multisig: reader.read_pubkey()?,
            squads_multisig_vault: reader.read_pubkey()?,
        })
    }
}

/// Decoded DAO account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dao {
    pub amm: DaoAmm,
    /// `None` when the buffer ends before the governance fields
    pub treasury: Option<DaoTreasury>,
    /// Bytes consumed by the discriminator and AMM section
    pub amm_len: usize,
}

impl Dao {
    pub fn is_dao(data: &[u8]) -> bool {
        has_discriminator(data, &dao_discriminator())
    }

    /// Decode a DAO account. `Ok(None)` for any other account type.
    pub fn try_decode(data: &[u8]) -> Result<Option<Self>, DecodeError> {
        if !Self::is_dao(data) {
            return Ok(None);
        }

        let mut reader = AccountReader::at(data, DISCRIMINATOR_LEN);
        let amm = DaoAmm::read(&mut reader)?;
        let amm_len = reader.offset();

        let mut tail = reader.clone();
        let treasury = DaoTreasury::read(&mut tail).ok();

        Ok(Some(Self { amm, treasury, amm_len }))
    }
}

/// Liquidity position in a DAO's AMM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmPosition {
    pub dao: Pubkey,
    pub position_authority: Pubkey,
    pub liquidity: u128,
}

impl AmmPosition {
    pub fn is_amm_position(data: &[u8]) -> bool {
        has_discriminator(data, &amm_position_discriminator())
    }

    /// Decode an AMM position. `Ok(None)` for any other account type.
    pub fn try_decode(data: &[u8]) -> Result<Option<Self>, DecodeError> {
        if !Self::is_amm_position(data) {
            return Ok(None);
        }

        let mut reader = AccountReader::at(data, DISCRIMINATOR_LEN);
        Ok(Some(Self {
            dao: reader.read_pubkey()?,
            position_authority: reader.read_pubkey()?,
            liquidity: reader.read_u128_le()?,
        }))
    }
}
