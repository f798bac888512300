//! Subscription handles for live snapshot feeds.

use super::Snapshot;
use tokio::sync::mpsc;

/// A live feed of snapshots for one collection.
///
/// The first snapshot is delivered immediately on subscribe; every commit
/// that touches the collection delivers the full matching set again.
/// Dropping the subscription releases the store-side listener.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Subscription { rx }
    }

    /// Wait for the next snapshot. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Drain without waiting, returning the most recent snapshot delivered
    /// since the last call, if any. Intermediate snapshots are discarded:
    /// every snapshot is a full replacement, so only the latest matters.
    pub fn try_latest(&mut self) -> Option<Snapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.rx.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}
