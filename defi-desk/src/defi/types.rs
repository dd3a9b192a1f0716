//! Common DeFi types

use serde::{Deserialize, Serialize};

/// DeFi protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Uniswap
    Uniswap,
    /// Aave
    Aave,
    /// Lido
    Lido,
    /// EigenLayer
    EigenLayer,
}

/// Swap request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Input token address
    pub token_in: String,
    /// Output token address
    pub token_out: String,
    /// Amount to swap, as a decimal string
    pub amount: String,
}

/// Swap result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapResult {
    /// Input token address
    pub token_in: String,
    /// Output token address
    pub token_out: String,
    /// Amount swapped, as a decimal string
    pub amount: String,
    /// Transaction hash
    pub transaction_hash: String,
    /// Protocol used
    pub protocol: Protocol,
    /// Fee paid
    pub fee: String,
}

/// Lending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingAction {
    /// Supply tokens as collateral
    Supply,
    /// Borrow tokens against collateral
    Borrow,
}

/// Lending request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingRequest {
    /// Token address
    pub token: String,
    /// Amount, as a decimal string
    pub amount: String,
}

/// Lending result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingResult {
    /// Action performed
    pub action: LendingAction,
    /// Transaction hash
    pub transaction_hash: String,
    /// Protocol used
    pub protocol: Protocol,
    /// Fee paid
    pub fee: String,
}

/// Aave user account data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AaveAccountData {
    /// Total collateral in base currency
    pub total_collateral_base: String,
    /// Total debt in base currency
    pub total_debt_base: String,
    /// Available borrows in base currency
    pub available_borrows_base: String,
    /// Current liquidation threshold
    pub current_liquidation_threshold: String,
    /// Loan to value ratio
    pub ltv: String,
    /// Health factor, formatted as an 18-decimal unit string
    pub health_factor: String,
}

/// Staking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeRequest {
    /// Amount of ETH to stake, as a decimal string
    pub amount: String,
    /// Referral address
    pub referral: String,
}

/// Staking result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingResult {
    /// Transaction hash
    pub transaction_hash: String,
    /// Protocol used
    pub protocol: Protocol,
    /// Fee paid
    pub fee: String,
}

/// ETH and stETH balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LidoBalances {
    /// ETH balance, formatted
    pub eth: String,
    /// stETH balance, formatted
    pub steth: String,
}

/// Restaking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestakeRequest {
    /// Asset token address
    pub asset: String,
    /// Amount, as a decimal string
    pub amount: String,
}

/// Restaking result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestakeResult {
    /// Transaction hash
    pub transaction_hash: String,
    /// Protocol used
    pub protocol: Protocol,
    /// Fee paid
    pub fee: String,
}
