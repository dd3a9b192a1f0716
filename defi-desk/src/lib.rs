//! DeFi operations desk
//!
//! This library provides wallet session management and direct pass-through
//! operations against a handful of DeFi protocols: token swaps through the
//! Uniswap universal router, Aave supply/borrow, Lido ETH staking, and
//! EigenLayer restaking. Each operation reads raw user inputs, raises an
//! ERC-20 allowance where needed, submits a transaction against a fixed
//! contract address, and reports its progress as plain status text.

pub mod error;
pub mod config;
pub mod session;
pub mod defi;
pub mod app;

// Re-export commonly used types for convenience
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
