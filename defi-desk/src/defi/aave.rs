//! Aave lending operations

use std::ops::Mul;
use std::str::FromStr;
use std::sync::Arc;

use ethers::contract::abigen;
use ethers::prelude::*;
use ethers::utils::format_units;
use ethers_core::types::{Address, U256};

use crate::error::{Error, Result};
use crate::session::{WalletClient, WalletHandle};
use super::erc20::{ensure_allowance, parse_token_amount, token_decimals};
use super::status::StatusLine;
use super::types::{AaveAccountData, LendingAction, LendingRequest, LendingResult, Protocol};

// Generate type-safe bindings for the Aave pool
abigen!(
    IAavePool,
    r#"[
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external
        function borrow(address asset, uint256 amount, uint256 interestRateMode, uint16 referralCode, address onBehalfOf) external
        function getUserAccountData(address user) external view returns (uint256 totalCollateralBase, uint256 totalDebtBase, uint256 availableBorrowsBase, uint256 currentLiquidationThreshold, uint256 ltv, uint256 healthFactor)
    ]"#,
);

/// Aave addresses
pub struct AaveAddresses {
    /// Pool address
    pub pool: Address,
}

impl Default for AaveAddresses {
    fn default() -> Self {
        Self {
            // Aave pool on Sepolia
            pool: Address::from_str("0x6Ae43d3271ff6888e7Fc43Fd7321a503ff738951").unwrap(),
        }
    }
}

/// Variable interest rate mode
const VARIABLE_RATE_MODE: u64 = 2;

/// Referral code passed on supply and borrow
const REFERRAL_CODE: u16 = 0;

/// Aave lending service
pub struct AaveService {
    /// Signing client
    client: Arc<WalletClient>,
    /// Connected account
    account: Address,
    /// Aave addresses
    addresses: AaveAddresses,
    /// Supply progress
    supply_status: StatusLine,
    /// Borrow progress
    borrow_status: StatusLine,
    /// Account data fetch progress
    account_status: StatusLine,
}

impl AaveService {
    /// Create a new Aave service bound to a connected wallet
    pub fn new(handle: &WalletHandle) -> Self {
        Self {
            client: handle.client.clone(),
            account: handle.address,
            addresses: AaveAddresses::default(),
            supply_status: StatusLine::new(),
            borrow_status: StatusLine::new(),
            account_status: StatusLine::new(),
        }
    }

    /// Progress of the latest supply
    pub fn supply_status(&self) -> &StatusLine {
        &self.supply_status
    }

    /// Progress of the latest borrow
    pub fn borrow_status(&self) -> &StatusLine {
        &self.borrow_status
    }

    /// Progress of the latest account data fetch
    pub fn account_status(&self) -> &StatusLine {
        &self.account_status
    }

    /// Supply tokens to the pool
    pub async fn supply(&self, request: &LendingRequest) -> Result<LendingResult> {
        self.supply_status.set("Processing supply...");

        match self.execute_supply(request).await {
            Ok(result) => {
                self.supply_status.set("Supply successful!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Supply failed: {}", e);
                self.supply_status.set(format!("Supply failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute_supply(&self, request: &LendingRequest) -> Result<LendingResult> {
        let asset = Address::from_str(&request.token)
            .map_err(|e| Error::DeFi(format!("Invalid asset address: {}", e)))?;

        let decimals = token_decimals(self.client.clone(), asset).await?;
        let amount = parse_token_amount(&request.amount, decimals)?;

        // The pool pulls the tokens, so its allowance must cover the amount
        ensure_allowance(
            self.client.clone(),
            asset,
            self.account,
            self.addresses.pool,
            amount,
            &self.supply_status,
        )
        .await?;

        self.supply_status.set("Sending supply transaction...");

        let pool = IAavePool::new(self.addresses.pool, self.client.clone());
        let supply_call = pool.supply(asset, amount, self.account, REFERRAL_CODE);

        let pending = supply_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to execute supply: {}", e)))?;

        let tx_hash = pending.tx_hash();
        tracing::info!(hash = ?tx_hash, "supply transaction sent");

        self.supply_status.set("Awaiting confirmation...");

        let receipt = pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get supply receipt: {}", e)))?
            .ok_or_else(|| Error::DeFi("Transaction dropped before confirmation".to_string()))?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt.effective_gas_price.unwrap_or_default();
        let fee = gas_used.mul(gas_price);

        Ok(LendingResult {
            action: LendingAction::Supply,
            transaction_hash: format!("{:?}", tx_hash),
            protocol: Protocol::Aave,
            fee: fee.to_string(),
        })
    }

    /// Borrow tokens from the pool at the variable rate
    pub async fn borrow(&self, request: &LendingRequest) -> Result<LendingResult> {
        self.borrow_status.set("Processing borrow...");

        match self.execute_borrow(request).await {
            Ok(result) => {
                self.borrow_status.set("Borrow successful!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Borrow failed: {}", e);
                self.borrow_status.set(format!("Borrow failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute_borrow(&self, request: &LendingRequest) -> Result<LendingResult> {
        let asset = Address::from_str(&request.token)
            .map_err(|e| Error::DeFi(format!("Invalid asset address: {}", e)))?;

        let decimals = token_decimals(self.client.clone(), asset).await?;
        let amount = parse_token_amount(&request.amount, decimals)?;

        self.borrow_status.set("Sending borrow transaction...");

        let pool = IAavePool::new(self.addresses.pool, self.client.clone());
        let borrow_call = pool.borrow(
            asset,
            amount,
            U256::from(VARIABLE_RATE_MODE),
            REFERRAL_CODE,
            self.account,
        );

        let pending = borrow_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to execute borrow: {}", e)))?;

        let tx_hash = pending.tx_hash();
        tracing::info!(hash = ?tx_hash, "borrow transaction sent");

        self.borrow_status.set("Awaiting confirmation...");

        let receipt = pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get borrow receipt: {}", e)))?
            .ok_or_else(|| Error::DeFi("Transaction dropped before confirmation".to_string()))?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt.effective_gas_price.unwrap_or_default();
        let fee = gas_used.mul(gas_price);

        Ok(LendingResult {
            action: LendingAction::Borrow,
            transaction_hash: format!("{:?}", tx_hash),
            protocol: Protocol::Aave,
            fee: fee.to_string(),
        })
    }

    /// Fetch the connected account's pool position
    pub async fn user_account_data(&self) -> Result<AaveAccountData> {
        self.account_status.set("Fetching account data...");

        match self.fetch_account_data().await {
            Ok(data) => {
                self.account_status.set("Account data fetched successfully!");
                Ok(data)
            }
            Err(e) => {
                tracing::error!("Get account data failed: {}", e);
                self.account_status
                    .set(format!("Failed to fetch account data: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch_account_data(&self) -> Result<AaveAccountData> {
        let pool = IAavePool::new(self.addresses.pool, self.client.clone());

        let data = pool
            .get_user_account_data(self.account)
            .call()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get user account data: {}", e)))?;

        // The health factor is an 18-decimal fixed-point number
        let health_factor = format_units(data.5, 18u32)
            .map_err(|e| Error::DeFi(format!("Failed to format health factor: {}", e)))?;

        Ok(AaveAccountData {
            total_collateral_base: data.0.to_string(),
            total_debt_base: data.1.to_string(),
            available_borrows_base: data.2.to_string(),
            current_liquidation_threshold: data.3.to_string(),
            ltv: data.4.to_string(),
            health_factor,
        })
    }
}
