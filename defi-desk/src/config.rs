//! Provider configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    /// HTTP provider
    Http,
    /// WebSocket provider
    WebSocket,
    /// IPC provider
    Ipc,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type
    pub provider_type: ProviderType,
    /// Provider URL
    pub url: String,
    /// API key (if required)
    pub api_key: Option<String>,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    /// Create an HTTP provider configuration for the given endpoint
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Http,
            url: url.into(),
            api_key: None,
            timeout: Some(30),
        }
    }

    /// Build a configuration from the environment
    ///
    /// `ETH_RPC_URL` takes precedence; otherwise `ALCHEMY_ID` is composed
    /// into an Alchemy Sepolia endpoint.
    pub fn from_env() -> Result<Self> {
        if let Ok(url) = std::env::var("ETH_RPC_URL") {
            return Ok(Self::http(url));
        }

        let api_key = std::env::var("ALCHEMY_ID").map_err(|_| {
            Error::InvalidInput("Set ETH_RPC_URL or ALCHEMY_ID to configure a provider".to_string())
        })?;

        Ok(Self {
            provider_type: ProviderType::Http,
            url: format!("https://eth-sepolia.g.alchemy.com/v2/{}", api_key),
            api_key: Some(api_key),
            timeout: Some(30),
        })
    }
}
