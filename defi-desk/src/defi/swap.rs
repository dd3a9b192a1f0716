//! Token swap through the Uniswap universal router

use std::ops::Mul;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ethers::contract::abigen;
use ethers::prelude::*;
use ethers_core::abi::{encode, Token as AbiToken};
use ethers_core::types::{Address, Bytes, U256};

use crate::error::{Error, Result};
use crate::session::{WalletClient, WalletHandle};
use super::erc20::{ensure_allowance, parse_token_amount};
use super::status::StatusLine;
use super::types::{Protocol, SwapRequest, SwapResult};

// Generate type-safe bindings for the universal router entry point
abigen!(
    IUniversalRouter,
    r#"[
        function execute(bytes commands, bytes[] inputs, uint256 deadline) external payable
    ]"#,
);

/// Universal router addresses
pub struct SwapAddresses {
    /// Router address
    pub router: Address,
}

impl Default for SwapAddresses {
    fn default() -> Self {
        Self {
            // Uniswap V4 universal router on Sepolia
            router: Address::from_str("0x3a9d48ab9751398bbfa63ad67599bb04e4bdf98b").unwrap(),
        }
    }
}

/// Router command byte for SWAP_EXACT_IN_SINGLE
const SWAP_EXACT_IN_SINGLE: u8 = 0x06;

/// Swap amounts are parsed at a fixed 18-decimal precision
const SWAP_DECIMALS: u8 = 18;

/// Seconds until the router rejects the transaction
const DEADLINE_SECS: u64 = 600;

/// Token swap service
pub struct SwapService {
    /// Signing client
    client: Arc<WalletClient>,
    /// Connected account
    account: Address,
    /// Router addresses
    addresses: SwapAddresses,
    /// Progress reporting
    status: StatusLine,
}

impl SwapService {
    /// Create a new swap service bound to a connected wallet
    pub fn new(handle: &WalletHandle) -> Self {
        Self {
            client: handle.client.clone(),
            account: handle.address,
            addresses: SwapAddresses::default(),
            status: StatusLine::new(),
        }
    }

    /// Progress of the latest swap
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Swap an exact input amount of `token_in` for `token_out`
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapResult> {
        self.status.set("Processing...");

        match self.execute_swap(request).await {
            Ok(result) => {
                self.status.set("Swap successful!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Swap failed: {}", e);
                self.status.set(format!("Swap failed: {}", e));
                Err(e)
            }
        }
    }

    async fn execute_swap(&self, request: &SwapRequest) -> Result<SwapResult> {
        let token_in = Address::from_str(&request.token_in)
            .map_err(|e| Error::DeFi(format!("Invalid input token address: {}", e)))?;

        let token_out = Address::from_str(&request.token_out)
            .map_err(|e| Error::DeFi(format!("Invalid output token address: {}", e)))?;

        let amount_in = parse_token_amount(&request.amount, SWAP_DECIMALS)?;

        // No slippage guard: the minimum output is left at zero
        let amount_out_min = U256::zero();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Unknown(e.to_string()))?
            .as_secs();
        let deadline = U256::from(now + DEADLINE_SECS);

        tracing::debug!(
            user = ?self.account,
            amount_in = %amount_in,
            deadline = %deadline,
            "preparing swap"
        );

        // Raise the router's allowance on the input token if it falls short
        ensure_allowance(
            self.client.clone(),
            token_in,
            self.account,
            self.addresses.router,
            amount_in,
            &self.status,
        )
        .await?;

        let (commands, inputs) =
            encode_swap_inputs(amount_in, amount_out_min, token_in, token_out, self.account);

        self.status.set("Sending swap transaction...");

        let router = IUniversalRouter::new(self.addresses.router, self.client.clone());

        // ERC20-to-ERC20 swap, so no ETH rides along
        let execute_call = router.execute(commands, inputs, deadline).value(U256::zero());

        let pending = execute_call
            .send()
            .await
            .map_err(|e| Error::DeFi(format!("Failed to execute swap: {}", e)))?;

        let tx_hash = pending.tx_hash();
        tracing::info!(hash = ?tx_hash, "swap transaction sent");

        self.status.set("Awaiting confirmation...");

        let receipt = pending
            .await
            .map_err(|e| Error::DeFi(format!("Failed to get swap receipt: {}", e)))?
            .ok_or_else(|| Error::DeFi("Transaction dropped before confirmation".to_string()))?;

        let gas_used = receipt.gas_used.unwrap_or_default();
        let gas_price = receipt.effective_gas_price.unwrap_or_default();
        let fee = gas_used.mul(gas_price);

        Ok(SwapResult {
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            amount: request.amount.clone(),
            transaction_hash: format!("{:?}", tx_hash),
            protocol: Protocol::Uniswap,
            fee: fee.to_string(),
        })
    }
}

/// Build the router command byte and the per-parameter encoded inputs
///
/// Each parameter is ABI-encoded individually: amount in, minimum amount
/// out, input token, output token, recipient.
pub fn encode_swap_inputs(
    amount_in: U256,
    amount_out_min: U256,
    token_in: Address,
    token_out: Address,
    recipient: Address,
) -> (Bytes, Vec<Bytes>) {
    let commands = Bytes::from(vec![SWAP_EXACT_IN_SINGLE]);

    let inputs = vec![
        Bytes::from(encode(&[AbiToken::Uint(amount_in)])),
        Bytes::from(encode(&[AbiToken::Uint(amount_out_min)])),
        Bytes::from(encode(&[AbiToken::Address(token_in)])),
        Bytes::from(encode(&[AbiToken::Address(token_out)])),
        Bytes::from(encode(&[AbiToken::Address(recipient)])),
    ];

    (commands, inputs)
}
