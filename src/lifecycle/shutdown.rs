//! Shutdown coordination.
//!
//! One `Shutdown` per process. Long-running tasks hold a receiver from
//! [`Shutdown::subscribe`]; the binary decides when to fire it.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

/// Broadcasts a single stop notification to every subscriber.
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

    /// Notify subscribers. A no-op when nobody is listening.
    pub fn trigger(&self) {
        tracing::info!(subscribers = self.receiver_count(), "Shutdown triggered");
        let _ = self.tx.send(());
    }

    /// Tasks still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Wait for `task` to finish or for `signal`, whichever comes first.
    ///
    /// On `signal` the shutdown is triggered and the task is awaited so it
    /// can drain. A task that ends on its own is returned without triggering.
    pub async fn run_until<T, S>(
        &self,
        mut task: JoinHandle<T>,
        signal: S,
    ) -> Result<T, JoinError>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            result = &mut task => {
                tracing::warn!("Task exited before a shutdown signal");
                result
            }
            _ = signal => {
                self.trigger();
                task.await
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
