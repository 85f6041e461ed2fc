use async_trait::async_trait;

use super::error::StoreError;
use super::subscription::Subscription;
use crate::models::{NewDeletionRequest, NewSiteRequest};

/// Persistent document collections backing the request flow.
///
/// Creation timestamps are resolved by the store at write time.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a site request and return its assigned id.
    async fn insert_request(&self, request: NewSiteRequest) -> Result<String, StoreError>;

    /// Insert a deletion request and return its assigned id.
    async fn insert_deletion_request(
        &self,
        request: NewDeletionRequest,
    ) -> Result<String, StoreError>;

    /// Open a live view of every site request owned by `user_id`.
    ///
    /// The first snapshot is the current matching set; each later snapshot is
    /// the full set again after a change.
    async fn subscribe_requests(&self, user_id: &str) -> Result<Subscription, StoreError>;
}
