//! SPL token account view
//!
//! SPL accounts are unpacked with `spl_token`. For Token-2022 holdings only
//! the shared base prefix is read: mint, owner and amount.

use solana_sdk::account::Account;
use solana_sdk::program_error::ProgramError;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Account as SplAccount;
use crate::shared::errors::DecodeError;
use super::account_reader::AccountReader;

/// Size of an SPL token account without extensions
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Offset of the u64 amount inside a token account
pub const TOKEN_AMOUNT_OFFSET: usize = 64;

/// Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Token programs whose accounts count toward treasury balances
pub fn token_program_ids() -> [Pubkey; 2] {
    [spl_token::id(), TOKEN_2022_PROGRAM_ID]
}

/// Mint, owner and balance of a token account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountView {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenAccountView {
    /// Full SPL unpack; rejects wrong lengths and uninitialized accounts
    pub fn unpack_spl(data: &[u8]) -> Result<Self, ProgramError> {
        let account = SplAccount::unpack(data)?;
        Ok(Self {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
        })
    }

    /// Base-layout read, used for Token-2022 accounts with extensions
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = AccountReader::new(data);
        let mint = reader.read_pubkey()?;
        let owner = reader.read_pubkey()?;
        let amount = reader.read_u64_le()?;
        Ok(Self { mint, owner, amount })
    }
}

/// A genuine SPL token account: exact base length, owned by the SPL token program
pub fn is_valid_token_account(account: Option<&Account>) -> bool {
    match account {
        Some(account) => {
            account.data.len() == TOKEN_ACCOUNT_LEN && account.owner == spl_token::id()
        }
        None => false,
    }
}

/// Balance of a token account; absent or malformed data reads as zero
pub fn token_amount(account: Option<&Account>) -> u64 {
    account
        .and_then(|account| AccountReader::at(&account.data, TOKEN_AMOUNT_OFFSET).read_u64_le().ok())
        .unwrap_or(0)
}
