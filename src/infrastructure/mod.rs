//! Infrastructure layer - Solana RPC access and on-chain account layouts

pub mod blockchain;
