//! Shutdown coordination for the proxy.
//!
//! The signal listener triggers; the HTTP server waits on
//! [`Shutdown::signalled`], stops accepting, and lets in-flight forwards
//! finish streaming before `run` returns.

use std::future::Future;

use tokio::sync::broadcast;

/// Handle shared by everything that can stop the proxy or must react to it.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Ask the server to stop accepting and drain.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Future that resolves once shutdown is triggered.
    ///
    /// The subscription is taken when this is called, not when the future is
    /// first polled, so a trigger between the two is not lost. Dropping every
    /// `Shutdown` handle also resolves it.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
            tracing::info!("Shutdown signal received, draining connections");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
