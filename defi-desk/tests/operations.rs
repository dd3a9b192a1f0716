//! Tests for the DeFi operation services

use std::sync::Arc;

use ethers::middleware::SignerMiddleware;
use ethers_core::types::{Address, U256};
use ethers_providers::{Http, Provider};
use ethers_signers::{LocalWallet, Signer};

use defi_desk::defi::{
    encode_swap_inputs, AaveAddresses, AaveService, EigenLayerAddresses, EigenLayerService,
    LendingRequest, LidoAddresses, LidoService, Protocol, RestakeRequest, StakeRequest,
    SwapAddresses, SwapRequest, SwapService,
};
use defi_desk::session::WalletHandle;

// Well-known development key, never funded on a real network
const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

// Endpoint that refuses connections; every RPC call fails immediately
const OFFLINE_RPC: &str = "http://127.0.0.1:1";

// Sepolia token addresses used as form defaults
const USDC: &str = "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238";
const WETH: &str = "0xfff9976782d46cc05630d1f6ebab18b2324d6b14";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn offline_handle() -> WalletHandle {
    let provider = Provider::<Http>::try_from(OFFLINE_RPC).unwrap();

    let wallet = TEST_KEY
        .parse::<LocalWallet>()
        .unwrap()
        .with_chain_id(11155111u64);

    let address = wallet.address();
    let client = Arc::new(SignerMiddleware::new(provider, wallet));

    WalletHandle {
        client,
        address,
        accounts: vec![format!("{:?}", address)],
    }
}

#[test]
fn test_default_addresses_parse() {
    assert_ne!(SwapAddresses::default().router, Address::zero());
    assert_ne!(AaveAddresses::default().pool, Address::zero());
    assert_ne!(LidoAddresses::default().lido, Address::zero());

    let eigenlayer = EigenLayerAddresses::default();
    assert_ne!(eigenlayer.strategy_manager, Address::zero());
    assert_ne!(eigenlayer.strategy, Address::zero());
    assert_ne!(eigenlayer.strategy_manager, eigenlayer.strategy);
}

#[test]
fn test_encode_swap_inputs_layout() {
    let token_in: Address = USDC.parse().unwrap();
    let token_out: Address = WETH.parse().unwrap();
    let recipient: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();

    let amount_in = U256::exp10(18);
    let (commands, inputs) = encode_swap_inputs(amount_in, U256::zero(), token_in, token_out, recipient);

    // Single SWAP_EXACT_IN_SINGLE command byte
    assert_eq!(commands[..], [0x06u8]);

    // One 32-byte word per parameter
    assert_eq!(inputs.len(), 5);
    assert!(inputs.iter().all(|input| input.len() == 32));

    // Big-endian amount in the first word
    assert_eq!(
        hex::encode(&inputs[0][..]),
        "0000000000000000000000000000000000000000000000000de0b6b3a7640000"
    );

    // Zero minimum output in the second word
    assert_eq!(inputs[1][..], [0u8; 32]);

    // Left-padded addresses in the remaining words
    assert!(hex::encode(&inputs[2][..]).ends_with(&hex::encode(token_in.as_bytes())));
    assert!(hex::encode(&inputs[3][..]).ends_with(&hex::encode(token_out.as_bytes())));
    assert!(hex::encode(&inputs[4][..]).ends_with(&hex::encode(recipient.as_bytes())));
}

#[tokio::test]
async fn test_swap_error_is_surfaced_in_status() {
    init_tracing();
    let handle = offline_handle();
    let swap = SwapService::new(&handle);

    let request = SwapRequest {
        token_in: USDC.to_string(),
        token_out: WETH.to_string(),
        amount: "1".to_string(),
    };

    let err = swap.swap(&request).await.unwrap_err();

    assert_eq!(swap.status().get(), format!("Swap failed: {}", err));
}

#[tokio::test]
async fn test_supply_error_is_surfaced_in_status() {
    init_tracing();
    let handle = offline_handle();
    let aave = AaveService::new(&handle);

    let request = LendingRequest {
        token: USDC.to_string(),
        amount: "1".to_string(),
    };

    let err = aave.supply(&request).await.unwrap_err();

    assert_eq!(aave.supply_status().get(), format!("Supply failed: {}", err));

    // Each form keeps its own status
    assert_eq!(aave.borrow_status().get(), "");
    assert_eq!(aave.account_status().get(), "");
}

#[tokio::test]
async fn test_borrow_rejects_invalid_token_address() {
    let handle = offline_handle();
    let aave = AaveService::new(&handle);

    let request = LendingRequest {
        token: "not-an-address".to_string(),
        amount: "1".to_string(),
    };

    let err = aave.borrow(&request).await.unwrap_err();

    let status = aave.borrow_status().get();
    assert_eq!(status, format!("Borrow failed: {}", err));
    assert!(status.contains("Invalid asset address"));
}

#[tokio::test]
async fn test_stake_error_is_surfaced_in_status() {
    init_tracing();
    let handle = offline_handle();
    let lido = LidoService::new(&handle);

    let request = StakeRequest {
        amount: "1".to_string(),
        referral: "0x0000000000000000000000000000000000000000".to_string(),
    };

    let err = lido.stake(&request).await.unwrap_err();

    assert_eq!(lido.stake_status().get(), format!("Stake failed: {}", err));
}

#[tokio::test]
async fn test_balance_error_is_surfaced_in_status() {
    let handle = offline_handle();
    let lido = LidoService::new(&handle);

    let err = lido.balances().await.unwrap_err();

    assert_eq!(
        lido.balance_status().get(),
        format!("Failed to fetch balances: {}", err)
    );
}

#[tokio::test]
async fn test_restake_error_is_surfaced_in_status() {
    init_tracing();
    let handle = offline_handle();
    let eigenlayer = EigenLayerService::new(&handle);

    let request = RestakeRequest {
        asset: USDC.to_string(),
        amount: "1".to_string(),
    };

    let err = eigenlayer.restake(&request).await.unwrap_err();

    assert_eq!(
        eigenlayer.status().get(),
        format!("Restake failed: {}", err)
    );
}

#[tokio::test]
async fn test_invalid_amount_rejected_before_any_call() {
    let handle = offline_handle();
    let lido = LidoService::new(&handle);

    let request = StakeRequest {
        amount: "one point five".to_string(),
        referral: "0x0000000000000000000000000000000000000000".to_string(),
    };

    let err = lido.stake(&request).await.unwrap_err();

    assert!(err.to_string().contains("Invalid amount"));
}

#[test]
fn test_result_types_serialize() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_string(&Protocol::Lido)?, "\"Lido\"");

    let request = SwapRequest {
        token_in: USDC.to_string(),
        token_out: WETH.to_string(),
        amount: "1".to_string(),
    };

    let value = serde_json::to_value(&request)?;
    assert_eq!(value["token_in"], USDC);
    assert_eq!(value["amount"], "1");

    Ok(())
}
