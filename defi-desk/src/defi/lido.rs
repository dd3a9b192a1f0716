//! Lido ETH staking operations

use std::ops::Mul;
use std::str::FromStr;
use std::sync::Arc;

use ethers::contract::abigen;
use ethers::prelude::*;
use ethers::utils::format_units;
use ethers_core::types::Address;

use crate::error::{Error, Result};
use crate::session::{WalletClient, WalletHandle};
use super::erc20::parse_token_amount;
use super::status::StatusLine;
use super::types::{LidoBalances, Protocol, StakeRequest, StakingResult};

// Generate type-safe bindings for the Lido staking contract
abigen!(
    ILido,
    r#"[
        function submit(address _referral) external payable returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
    ]"#,
);

/// Lido addresses
pub struct LidoAddresses {
    /// Staking contract address
    pub lido: Address,
}

impl Default for LidoAddresses {
    fn default() -> Self {
        Self {
            // Lido staking contract on Sepolia
            lido: Address::from_str("0x3e3FE7dBc6B4C189E7128855dD526361c49b40Af").unwrap(),
        }
    }
}

/// ETH and stETH use an 18-decimal precision
const ETH_DECIMALS: u8 = 18;

/// Lido staking service
pub struct LidoService {
    /// Signing client
    client: Arc<WalletClient>,
    /// Connected account
    account: Address,
    /// Lido addresses
    addresses: LidoAddresses,
    /// Stake progress
    stake_status: StatusLine,
    /// Balance fetch progress
    balance_status: StatusLine,
}

impl LidoService {
    /// Create a new Lido service bound to a connected wallet
    pub fn new(handle: &WalletHandle) -> Self {
        Self {
            client: handle.client.clone(),
            account: handle.address,
            addresses: LidoAddresses::default(),
            stake_status: StatusLine::new(),
            balance_status: StatusLine::new(),
        }
    }

    /// Progress of the latest stake
    pub fn stake_status(&self) -> &StatusLine {
        &self.stake_status
    }

    /// Progress of the latest balance fetch
    pub fn balance_status(&self) -> &StatusLine {
        &self.balance_status
    }

    /// Stake ETH, crediting stETH to the connected account
    pub async fn stake(&self, request: &StakeRequest) -> Result<StakingResult> {
        self.stake_status.set("Processing stake...");

        match self.execute_stake(request).await {
            Ok(result) => {
                self.stake_status.set("Stake successful!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Stake failed: {}", e);
                self.stake_status.set(format!("Stake failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute_stake(&self, request: &StakeRequest) -> Result<StakingResult> {
        let referral = Address::from_str(&request.referral)
            .map_err(|e| Error::DeFi(format!("Invalid referral address: {}", e)))?;

        let amount = parse_token_amount(&request.amount, ETH_DECIMALS)?;

        let lido = ILido::new(self.addresses.lido, self.client.clone());

        // The staked ETH rides along as the transaction value
        let submit_call = lido.submit(referral).value(amount);

        let pending = submit_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to execute stake: {}", e)))?;

        let tx_hash = pending.tx_hash();
        tracing::info!(hash = ?tx_hash, "stake transaction sent");

        self.stake_status.set("Transaction sent. Awaiting confirmation...");

        let receipt = pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get stake receipt: {}", e)))?
            .ok_or_else(|| Error::DeFi("Transaction dropped before confirmation".to_string()))?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt.effective_gas_price.unwrap_or_default();
        let fee = gas_used.mul(gas_price);

        Ok(StakingResult {
            transaction_hash: format!("{:?}", tx_hash),
            protocol: Protocol::Lido,
            fee: fee.to_string(),
        })
    }

    /// Fetch the connected account's ETH and stETH balances
    pub async fn balances(&self) -> Result<LidoBalances> {
        self.balance_status.set("Fetching balances...");

        match self.fetch_balances().await {
            Ok(balances) => {
                self.balance_status.set("Balances fetched successfully!");
                Ok(balances)
            }
            Err(e) => {
                tracing::error!("Balance fetch failed: {}", e);
                self.balance_status
                    .set(format!("Failed to fetch balances: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch_balances(&self) -> Result<LidoBalances> {
        let eth_balance = self
            .client
            .get_balance(self.account, None)
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get ETH balance: {}", e)))?;

        let eth = format_units(eth_balance, ETH_DECIMALS as u32)
            .map_err(|e| Error::DeFi(format!("Failed to format ETH balance: {}", e)))?;

        let lido = ILido::new(self.addresses.lido, self.client.clone());

        let steth_balance = lido
            .balance_of(self.account)
            .call()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get stETH balance: {}", e)))?;

        // Fall back to 18 when the contract does not answer decimals()
        let decimals = match lido.decimals().call().await {
            Ok(decimals) => decimals,
            Err(_) => ETH_DECIMALS,
        };

        let steth = format_units(steth_balance, decimals as u32)
            .map_err(|e| Error::DeFi(format!("Failed to format stETH balance: {}", e)))?;

        Ok(LidoBalances { eth, steth })
    }
}
