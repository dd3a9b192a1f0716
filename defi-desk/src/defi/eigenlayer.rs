//! EigenLayer restaking operations

use std::ops::Mul;
use std::str::FromStr;
use std::sync::Arc;

use ethers::contract::abigen;
use ethers::prelude::*;
use ethers_core::types::Address;

use crate::error::{Error, Result};
use crate::session::{WalletClient, WalletHandle};
use super::erc20::{parse_token_amount, token_decimals, IERC20};
use super::status::StatusLine;
use super::types::{Protocol, RestakeRequest, RestakeResult};

// Generate type-safe bindings for the strategy manager entry point
abigen!(
    IStrategyManager,
    r#"[
        function depositIntoStrategy(address strategy, address token, uint256 amount) external
    ]"#,
);

/// EigenLayer addresses
pub struct EigenLayerAddresses {
    /// Strategy manager address
    pub strategy_manager: Address,
    /// Strategy receiving the deposits
    pub strategy: Address,
}

impl Default for EigenLayerAddresses {
    fn default() -> Self {
        Self {
            // EigenLayer strategy manager on Sepolia
            strategy_manager: Address::from_str("0xdfB5f6CE42aAA7830E94ECFCcAd411beF4d4D5b6")
                .unwrap(),
            // Fixed deposit strategy
            strategy: Address::from_str("0x7D704507b76571a51d9caE8AdDAbBFd0ba0e63d3").unwrap(),
        }
    }
}

/// EigenLayer restaking service
pub struct EigenLayerService {
    /// Signing client
    client: Arc<WalletClient>,
    /// Connected account
    account: Address,
    /// EigenLayer addresses
    addresses: EigenLayerAddresses,
    /// Progress reporting
    status: StatusLine,
}

impl EigenLayerService {
    /// Create a new EigenLayer service bound to a connected wallet
    pub fn new(handle: &WalletHandle) -> Self {
        Self {
            client: handle.client.clone(),
            account: handle.address,
            addresses: EigenLayerAddresses::default(),
            status: StatusLine::new(),
        }
    }

    /// Progress of the latest restake
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Deposit an asset into the fixed strategy
    pub async fn restake(&self, request: &RestakeRequest) -> Result<RestakeResult> {
        self.status.set("Processing restake...");

        match self.execute_restake(request).await {
            Ok(result) => {
                self.status.set("Restake successful!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Restake failed: {}", e);
                self.status.set(format!("Restake failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute_restake(&self, request: &RestakeRequest) -> Result<RestakeResult> {
        let asset = Address::from_str(&request.asset)
            .map_err(|e| Error::DeFi(format!("Invalid asset address: {}", e)))?;

        let decimals = token_decimals(self.client.clone(), asset).await?;
        let amount = parse_token_amount(&request.amount, decimals)?;

        tracing::debug!(user = ?self.account, amount = %amount, "preparing restake");

        // The allowance is raised unconditionally before every deposit
        self.status.set("Approving token...");

        let token = IERC20::new(asset, self.client.clone());
        let approve_call = token.approve(self.addresses.strategy_manager, amount);

        let approve_pending = approve_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to approve token: {}", e)))?;

        approve_pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get approval receipt: {}", e)))?;

        self.status.set("Depositing into strategy...");

        let strategy_manager =
            IStrategyManager::new(self.addresses.strategy_manager, self.client.clone());
        let deposit_call =
            strategy_manager.deposit_into_strategy(self.addresses.strategy, asset, amount);

        let pending = deposit_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to deposit into strategy: {}", e)))?;

        let tx_hash = pending.tx_hash();
        tracing::info!(hash = ?tx_hash, "restake transaction sent");

        let receipt = pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get deposit receipt: {}", e)))?
            .ok_or_else(|| Error::DeFi("Transaction dropped before confirmation".to_string()))?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt.effective_gas_price.unwrap_or_default();
        let fee = gas_used.mul(gas_price);

        Ok(RestakeResult {
            transaction_hash: format!("{:?}", tx_hash),
            protocol: Protocol::EigenLayer,
            fee: fee.to_string(),
        })
    }
}
