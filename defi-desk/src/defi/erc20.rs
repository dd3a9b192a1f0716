//! Minimal ERC-20 surface shared by the operation services

use std::sync::Arc;

use ethers::contract::abigen;
use ethers::utils::parse_units;
use ethers_core::types::{Address, U256};

use crate::error::{Error, Result};
use crate::session::WalletClient;
use super::status::StatusLine;

// Generate type-safe bindings for the ERC-20 surface the operations need
abigen!(
    IERC20,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function decimals() external view returns (uint8)
        function balanceOf(address account) external view returns (uint256)
    ]"#,
);

/// Query a token's declared decimal precision
pub async fn token_decimals(client: Arc<WalletClient>, token: Address) -> Result<u8> {
    let erc20 = IERC20::new(token, client);

    erc20
        .decimals()
        .call()
        .await
        .map_err(|e| Error::DeFi(format!("Failed to get token decimals: {}", e)))
}

/// Convert a decimal amount string into the token's smallest unit
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = parse_units(amount, decimals as u32)
        .map_err(|e| Error::DeFi(format!("Invalid amount: {}", e)))?;

    Ok(parsed.into())
}

/// Whether the current allowance falls short of the required amount
pub fn needs_approval(current: U256, required: U256) -> bool {
    current < required
}

/// Raise the spender's allowance when the current one is insufficient
///
/// Returns whether an approval transaction was issued. The approval is
/// awaited before returning so the follow-up call sees the new allowance.
pub async fn ensure_allowance(
    client: Arc<WalletClient>,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256,
    status: &StatusLine,
) -> Result<bool> {
    let erc20 = IERC20::new(token, client);

    let current = erc20
        .allowance(owner, spender)
        .call()
        .await
        .map_err(|e| Error::DeFi(format!("Failed to get allowance: {}", e)))?;

    tracing::debug!(allowance = %current, required = %amount, "current allowance");

    if !needs_approval(current, amount) {
        return Ok(false);
    }

    status.set("Approving token...");

    let approve_call = erc20.approve(spender, amount);
    let pending = approve_call
        .send()
        .await
        .map_err(|e| Error::DeFi(format!("Failed to approve token: {}", e)))?;

    pending
        .await
        .map_err(|e| Error::DeFi(format!("Failed to get approval receipt: {}", e)))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(parse_token_amount("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(
            parse_token_amount("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(parse_token_amount("0.000001", 6).unwrap(), U256::one());

        assert!(parse_token_amount("not-a-number", 18).is_err());
    }

    #[test]
    fn test_needs_approval() {
        let required = U256::from(100u64);

        assert!(needs_approval(U256::zero(), required));
        assert!(needs_approval(U256::from(99u64), required));
        assert!(!needs_approval(required, required));
        assert!(!needs_approval(U256::from(101u64), required));
    }
}
