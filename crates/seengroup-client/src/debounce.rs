//! Trailing-edge debounce: a value is emitted once the input has been quiet
//! for the configured period, and only the latest value is emitted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Quiet period for the job board search box.
pub const JOBS_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Quiet period for the product search box.
pub const PRODUCTS_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Sending side. Dropping it flushes nothing: a pending value is discarded.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Returns the input handle and the receiver of settled values.
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, mut input) = mpsc::unbounded_channel::<T>();
        let (settled_tx, settled) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(mut latest) = input.recv().await {
                loop {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(v) => latest = v,
                            None => return,
                        },
                        _ = sleep(quiet) => {
                            if settled_tx.send(latest).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { tx, task }, settled)
    }

    pub fn push(&self, value: T) {
        // Receiver gone means the debouncer is shutting down.
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
