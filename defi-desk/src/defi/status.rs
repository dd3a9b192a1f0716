//! Plain-text operation status

use std::sync::Arc;

use tokio::sync::watch;

/// A status line replaced wholesale on each operation step
///
/// The text is arbitrary; there is no state machine behind it. Observers see
/// the latest value only.
#[derive(Clone)]
pub struct StatusLine {
    inner: Arc<watch::Sender<String>>,
}

impl StatusLine {
    /// Create an empty status line
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { inner: Arc::new(tx) }
    }

    /// Replace the status text
    pub fn set(&self, status: impl Into<String>) {
        let text = status.into();
        tracing::debug!(status = %text, "status update");
        self.inner.send_replace(text);
    }

    /// The current status text
    pub fn get(&self) -> String {
        self.inner.borrow().clone()
    }

    /// Observe status changes
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.subscribe()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}
