//! Futarchy TVL - AMM vault and DAO treasury balances read straight from Solana accounts
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod math;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::{Adapter, TvlService, TvlSettings};
pub use domain::accounts::AccountSource;
pub use infrastructure::blockchain::SolanaRpcClient;
pub use report::TvlReport;
