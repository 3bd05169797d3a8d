//! Error handling for the application

use thiserror::Error;

/// Account buffer decoding errors
///
/// A discriminator mismatch is not an error: decoders return `Ok(None)` for
/// buffers of another account type. These variants are fatal for the single
/// account being decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read of {needed} bytes at offset {offset} runs past buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("unknown PoolState tag: {0}")]
    UnknownPoolStateTag(u8),
}

/// Liquidity allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("position liquidity {liquidity} exceeds pool total liquidity {total}")]
    LiquidityExceedsTotal { liquidity: u128, total: u128 },

    #[error("allocation overflowed 128 bits")]
    Overflow,
}

/// RPC boundary errors
#[derive(Error, Debug, Clone)]
pub enum BlockchainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("RPC rate limited: {0}")]
    RateLimited(String),
}

impl BlockchainError {
    /// Classify a raw RPC error message. Rate-limit responses become
    /// `RateLimited` so the retry policy can pick them out.
    pub fn from_rpc_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            BlockchainError::RateLimited(message)
        } else {
            BlockchainError::Rpc(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BlockchainError::RateLimited(_))
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.to_ascii_lowercase().contains("too many requests")
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {field}: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("Invalid commitment level: {0}")]
    InvalidCommitment(String),
}

/// Errors of a TVL run
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("TVL run failed: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report to {path}: {source}")]
    WriteReport {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
