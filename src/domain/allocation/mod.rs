//! Liquidity share allocation

pub mod liquidity_allocator;

pub use liquidity_allocator::{Allocation, PoolSnapshot, PRECISION};
