//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
///
/// The server and any background task subscribe; whoever decides the process
/// should stop (a signal, a test) calls [`Shutdown::trigger`].
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown when the process receives SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
