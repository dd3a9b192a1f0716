//! Session state and lifecycle

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::error::Result;
use super::connector::{WalletConnector, WalletEvent, WalletHandle};

/// An active wallet session
///
/// At most one session exists per manager. Nothing here outlives the
/// process; there is no persistence.
#[derive(Debug, Default)]
pub struct Session {
    /// Whether a wallet is connected
    connected: bool,
    /// The tracked account, empty when disconnected
    account: String,
    /// The connected provider handle
    handle: Option<WalletHandle>,
}

impl Session {
    /// Whether a wallet is connected
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The tracked account
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The connected provider handle
    pub fn handle(&self) -> Option<&WalletHandle> {
        self.handle.as_ref()
    }
}

/// Wallet session manager
///
/// Owns the connector, the session state, and the subscription to
/// account-change notifications.
pub struct SessionManager {
    /// Wallet connector
    connector: Arc<dyn WalletConnector>,
    /// Current session
    session: Session,
    /// Notification receiver, present while connected
    events: Option<broadcast::Receiver<WalletEvent>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            connector,
            session: Session::default(),
            events: None,
        }
    }

    /// Connect a wallet
    ///
    /// Stores the first reported account and subscribes to account-change
    /// notifications. The session counts as connected only when the wallet
    /// reports at least one account.
    pub async fn connect(&mut self) -> Result<&Session> {
        let handle = self.connector.connect().await?;

        if let Some(first) = handle.accounts.first() {
            self.session.account = first.clone();
            self.session.connected = true;
            tracing::info!(account = %self.session.account, "wallet connected");
        }

        self.events = Some(self.connector.subscribe());
        self.session.handle = Some(handle);

        Ok(&self.session)
    }

    /// Connect only when the connector reports a cached provider
    ///
    /// Returns whether a connection was made.
    pub async fn auto_connect(&mut self) -> Result<bool> {
        if !self.connector.has_cached_provider() {
            return Ok(false);
        }

        self.connect().await?;
        Ok(true)
    }

    /// Disconnect the wallet
    ///
    /// Invokes the provider's own disconnect hook when a session exists,
    /// clears the cached provider selection, and resets the session.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.session.handle.is_some() {
            self.connector.disconnect().await?;
        }

        self.connector.clear_cached_provider();
        self.session = Session::default();
        self.events = None;

        tracing::info!("wallet disconnected");
        Ok(())
    }

    /// Drain pending wallet notifications and apply them
    pub async fn process_events(&mut self) -> Result<()> {
        let mut pending = Vec::new();

        if let Some(events) = self.events.as_mut() {
            loop {
                match events.try_recv() {
                    Ok(event) => pending.push(event),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        for event in pending {
            match event {
                WalletEvent::AccountsChanged(accounts) => {
                    self.apply_accounts_changed(&accounts).await?;
                }
            }
        }

        Ok(())
    }

    /// Apply an account-change notification
    ///
    /// A non-empty list replaces the tracked account; an empty list triggers
    /// the same teardown as `disconnect`.
    pub async fn apply_accounts_changed(&mut self, accounts: &[String]) -> Result<()> {
        match accounts.first() {
            Some(first) => {
                self.session.account = first.clone();
                self.session.connected = true;
                tracing::info!(account = %self.session.account, "account changed");
            }
            None => {
                self.disconnect().await?;
            }
        }

        Ok(())
    }

    /// The current session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether a wallet is connected
    pub fn is_connected(&self) -> bool {
        self.session.connected
    }

    /// The tracked account
    pub fn account(&self) -> &str {
        &self.session.account
    }
}
