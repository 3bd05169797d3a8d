//! Domain layer - account access, vault discovery and liquidity allocation

pub mod accounts;
pub mod allocation;
pub mod discovery;
