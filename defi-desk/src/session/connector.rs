//! Wallet connector abstraction
//!
//! A connector stands in for the external wallet-selection library: it runs
//! the provider-selection flow, remembers the cached provider selection, and
//! emits account-change notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers_core::types::Address;
use ethers_providers::{Http, Provider};
use ethers_signers::{LocalWallet, Signer};
use tokio::sync::broadcast;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Signer-capable provider handle shared by every operation service
pub type WalletClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Notification emitted by the wallet library
#[derive(Debug, Clone)]
pub enum WalletEvent {
    /// The set of exposed accounts changed; an empty list means the wallet
    /// dropped the session
    AccountsChanged(Vec<String>),
}

/// A connected wallet
#[derive(Debug, Clone)]
pub struct WalletHandle {
    /// Shared signing client
    pub client: Arc<WalletClient>,
    /// Signer address
    pub address: Address,
    /// Accounts reported by the wallet
    pub accounts: Vec<String>,
}

/// Wallet connector
///
/// Implementations wrap a concrete wallet source. The session manager only
/// depends on this trait, so the selection flow itself stays external.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Run the provider-selection flow and return a connected handle
    async fn connect(&self) -> Result<WalletHandle>;

    /// Whether a previously selected provider is cached
    fn has_cached_provider(&self) -> bool;

    /// Forget the cached provider selection
    fn clear_cached_provider(&self);

    /// Subscribe to wallet notifications
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// The provider's own disconnect hook, when it has one
    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

/// Connector backed by a configured RPC endpoint and a local signing key
pub struct LocalWalletConnector {
    /// Provider configuration
    config: ProviderConfig,
    /// Hex-encoded private key
    private_key: String,
    /// Cached provider selection flag
    cached: AtomicBool,
    /// Notification channel
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWalletConnector {
    /// Create a new connector
    pub fn new(config: ProviderConfig, private_key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(16);

        Self {
            config,
            private_key: private_key.into(),
            cached: AtomicBool::new(false),
            events,
        }
    }

    /// Build a connector from `PRIVATE_KEY` and the provider environment
    pub fn from_env() -> Result<Self> {
        let config = ProviderConfig::from_env()?;
        let private_key = std::env::var("PRIVATE_KEY")
            .map_err(|_| Error::Session("PRIVATE_KEY is not set".to_string()))?;

        Ok(Self::new(config, private_key))
    }

    /// Feed an account-change notification, as the wallet library would
    pub fn push_accounts_changed(&self, accounts: Vec<String>) {
        let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
    }
}

#[async_trait]
impl WalletConnector for LocalWalletConnector {
    async fn connect(&self) -> Result<WalletHandle> {
        let provider = Provider::<Http>::try_from(self.config.url.clone())
            .map_err(|e| Error::Provider(format!("Failed to create provider: {}", e)))?;

        let wallet = self
            .private_key
            .parse::<LocalWallet>()
            .map_err(|e| Error::Session(format!("Invalid private key: {}", e)))?
            .with_chain_id(chain_id_for_url(&self.config.url));

        let address = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        self.cached.store(true, Ordering::SeqCst);

        Ok(WalletHandle {
            client,
            address,
            accounts: vec![format!("{:?}", address)],
        })
    }

    fn has_cached_provider(&self) -> bool {
        self.cached.load(Ordering::SeqCst)
    }

    fn clear_cached_provider(&self) {
        self.cached.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Determine the chain ID from the endpoint URL
fn chain_id_for_url(url: &str) -> u64 {
    match url {
        url if url.contains("mainnet") => 1,     // Mainnet
        url if url.contains("goerli") => 5,      // Goerli testnet
        url if url.contains("sepolia") => 11155111, // Sepolia testnet
        _ => 1, // Default to mainnet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key, never funded on a real network
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_chain_id_for_url() {
        assert_eq!(chain_id_for_url("https://mainnet.infura.io/v3/key"), 1);
        assert_eq!(chain_id_for_url("https://goerli.infura.io/v3/key"), 5);
        assert_eq!(chain_id_for_url("https://eth-sepolia.g.alchemy.com/v2/key"), 11155111);
        assert_eq!(chain_id_for_url("http://localhost:8545"), 1);
    }

    #[tokio::test]
    async fn test_connect_reports_signer_account() {
        let connector = LocalWalletConnector::new(
            ProviderConfig::http("https://eth-sepolia.g.alchemy.com/v2/key"),
            TEST_KEY,
        );

        assert!(!connector.has_cached_provider());

        let handle = connector.connect().await.unwrap();

        assert_eq!(handle.accounts.len(), 1);
        assert_eq!(handle.accounts[0], format!("{:?}", handle.address));
        assert!(connector.has_cached_provider());

        connector.clear_cached_provider();
        assert!(!connector.has_cached_provider());
    }
}
