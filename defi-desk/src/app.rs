//! Top-level composition of the wallet session and the operation services
//!
//! Data flow is strictly top-down: the app owns the session, and the
//! operation bundle exists only while a wallet is connected. Each service
//! holds its own status state; the shared provider handle is the only thing
//! they have in common.

use std::sync::Arc;

use crate::defi::{AaveService, EigenLayerService, LidoService, SwapService};
use crate::error::Result;
use crate::session::{SessionManager, WalletConnector, WalletHandle};

/// The operation services, available while a wallet session exists
pub struct Operations {
    /// Token swap
    pub swap: SwapService,
    /// Aave supply/borrow
    pub aave: AaveService,
    /// Lido staking
    pub lido: LidoService,
    /// EigenLayer restaking
    pub eigenlayer: EigenLayerService,
}

impl Operations {
    fn new(handle: &WalletHandle) -> Self {
        Self {
            swap: SwapService::new(handle),
            aave: AaveService::new(handle),
            lido: LidoService::new(handle),
            eigenlayer: EigenLayerService::new(handle),
        }
    }
}

/// The DeFi operations desk
pub struct DeFiApp {
    /// Wallet session
    session: SessionManager,
    /// Operation bundle, present only while connected
    operations: Option<Operations>,
}

impl DeFiApp {
    /// Create a new app over the given wallet connector
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            session: SessionManager::new(connector),
            operations: None,
        }
    }

    /// Auto-connect when the connector reports a cached provider
    ///
    /// Returns whether a session was established. Failures are logged, not
    /// propagated; there is no recovery flow beyond connecting again.
    pub async fn init(&mut self) -> bool {
        match self.session.auto_connect().await {
            Ok(connected) => {
                if connected {
                    self.mount_operations();
                }
                connected
            }
            Err(e) => {
                tracing::error!("Failed to connect wallet: {}", e);
                false
            }
        }
    }

    /// Connect a wallet
    ///
    /// Returns whether a session was established. Failures are logged, not
    /// propagated.
    pub async fn connect_wallet(&mut self) -> bool {
        let result = self.session.connect().await.map(|_| ());

        match result {
            Ok(()) => {
                self.mount_operations();
                true
            }
            Err(e) => {
                tracing::error!("Failed to connect wallet: {}", e);
                false
            }
        }
    }

    /// Disconnect the wallet and drop the operation bundle
    pub async fn disconnect_wallet(&mut self) -> Result<()> {
        self.operations = None;
        self.session.disconnect().await
    }

    /// Drain pending wallet notifications and reconcile the operation bundle
    pub async fn poll_events(&mut self) -> Result<()> {
        self.session.process_events().await?;

        if !self.session.is_connected() {
            self.operations = None;
        } else if self.operations.is_none() {
            self.mount_operations();
        }

        Ok(())
    }

    fn mount_operations(&mut self) {
        if let Some(handle) = self.session.session().handle() {
            self.operations = Some(Operations::new(handle));
        }
    }

    /// The operation services, while a wallet session exists
    pub fn operations(&self) -> Option<&Operations> {
        self.operations.as_ref()
    }

    /// The connected account, while a wallet session exists
    pub fn account(&self) -> Option<&str> {
        if self.session.is_connected() {
            Some(self.session.account())
        } else {
            None
        }
    }

    /// Whether a wallet is connected
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// The wallet session manager
    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}
