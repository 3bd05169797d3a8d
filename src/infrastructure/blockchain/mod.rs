//! Direct blockchain reading for Solana account data

pub mod account_reader;
pub mod futarchy_structures;
pub mod meteora_structures;
pub mod pda;
pub mod retry;
pub mod rpc_client;
pub mod token_account;
pub mod vault_reader;

pub use account_reader::AccountReader;
pub use futarchy_structures::{AmmPosition, Dao, DaoAmm, DaoTreasury, Pool, PoolState};
pub use meteora_structures::{DammPool, DammPosition, WithdrawQuote};
pub use pda::{derive_position_pda, DAMM_V2_PROGRAM_ID};
pub use retry::RetryPolicy;
pub use rpc_client::SolanaRpcClient;
pub use token_account::TokenAccountView;
pub use vault_reader::{TokenAccountTotals, VaultReader};
