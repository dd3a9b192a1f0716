//! DeFi operation services
//!
//! Each service binds raw user inputs to one protocol operation: it converts
//! the amount with the token's declared decimals, raises an ERC-20 allowance
//! where the protocol requires one, submits a transaction against a fixed
//! contract address, and awaits a single confirmation while reporting
//! progress as plain status text.

mod types;
mod status;
mod erc20;
mod swap;
mod aave;
mod lido;
mod eigenlayer;

pub use types::*;
pub use status::*;
pub use erc20::*;
pub use swap::*;
pub use aave::*;
pub use lido::*;
pub use eigenlayer::*;
