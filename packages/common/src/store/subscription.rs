use std::fmt;

use tokio::sync::mpsc;

use super::error::StoreError;
use crate::models::SiteRequest;

/// One delivery of a live query: the full matching set, or the failure that ended it.
pub type Snapshot = Result<Vec<SiteRequest>, StoreError>;

/// Handle to a live query.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) releases the
/// observer registered in the store.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Build a handle from the snapshot channel and the store's release hook.
    pub fn new(
        rx: mpsc::UnboundedReceiver<Snapshot>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            rx,
            release: Some(Box::new(release)),
        }
    }

    /// Wait for the next snapshot. `None` once the store has closed the query.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Release the observer now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
