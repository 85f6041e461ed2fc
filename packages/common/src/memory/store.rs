use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{DeletionRequest, NewDeletionRequest, NewSiteRequest, SiteRequest};
use crate::request_status::RequestStatus;
use crate::store::{DocumentStore, Snapshot, StoreError, Subscription};

struct Observer {
    user_id: String,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct Inner {
    requests: DashMap<String, SiteRequest>,
    deletions: DashMap<String, DeletionRequest>,
    observers: DashMap<u64, Observer>,
    next_observer: AtomicU64,
    unavailable: AtomicBool,
    /// Held while a snapshot is taken and sent, so observers receive
    /// snapshots in the order the writes happened.
    publish: Mutex<()>,
}

impl Inner {
    fn snapshot_for(&self, user_id: &str) -> Vec<SiteRequest> {
        self.requests
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn publish_lock(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push the owner's full request set to each of their observers.
    fn notify(&self, user_id: &str) {
        let _publishing = self.publish_lock();
        let snapshot = self.snapshot_for(user_id);
        let mut closed = Vec::new();

        for observer in self.observers.iter() {
            if observer.user_id == user_id && observer.tx.send(Ok(snapshot.clone())).is_err() {
                closed.push(*observer.key());
            }
        }

        for id in closed {
            self.observers.remove(&id);
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            Err(StoreError::Unavailable("store is offline".into()))
        } else {
            Ok(())
        }
    }
}

/// Document store held entirely in memory.
///
/// Cloning is cheap and every clone sees the same documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::Release);
    }

    /// Insert a fully formed document, bypassing id and timestamp assignment.
    pub fn seed_request(&self, request: SiteRequest) {
        let user_id = request.user_id.clone();
        self.inner.requests.insert(request.id.clone(), request);
        self.inner.notify(&user_id);
    }

    /// Moderator action: change the stored status.
    pub fn set_status(&self, request_id: &str, status: RequestStatus) -> Result<(), StoreError> {
        let user_id = {
            let mut request = self
                .inner
                .requests
                .get_mut(request_id)
                .ok_or_else(|| StoreError::Rejected(format!("no request {request_id}")))?;
            request.status = status;
            request.user_id.clone()
        };
        self.inner.notify(&user_id);
        Ok(())
    }

    /// Moderator action: attach the published URL.
    pub fn set_url(&self, request_id: &str, url: &str) -> Result<(), StoreError> {
        let user_id = {
            let mut request = self
                .inner
                .requests
                .get_mut(request_id)
                .ok_or_else(|| StoreError::Rejected(format!("no request {request_id}")))?;
            request.url = url.to_string();
            request.user_id.clone()
        };
        self.inner.notify(&user_id);
        Ok(())
    }

    /// End every live query of `user_id` with an error.
    pub fn fail_subscriptions(&self, user_id: &str, reason: &str) {
        let _publishing = self.inner.publish_lock();
        for observer in self.inner.observers.iter() {
            if observer.user_id == user_id {
                let _ = observer
                    .tx
                    .send(Err(StoreError::Subscription(reason.to_string())));
            }
        }
    }

    pub fn requests(&self) -> Vec<SiteRequest> {
        self.inner
            .requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn deletion_requests(&self) -> Vec<DeletionRequest> {
        self.inner
            .deletions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live queries currently registered.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_request(&self, request: NewSiteRequest) -> Result<String, StoreError> {
        self.inner.check_available()?;

        let id = Uuid::now_v7().to_string();
        let user_id = request.user_id.clone();
        let document = SiteRequest {
            id: id.clone(),
            name: request.name,
            description: request.description,
            created_at: Some(Utc::now()),
            user_id: request.user_id,
            user_email: request.user_email,
            status: request.status,
            url: request.url,
            files: request.files,
        };

        self.inner.requests.insert(id.clone(), document);
        debug!(request_id = %id, "site request stored");
        self.inner.notify(&user_id);
        Ok(id)
    }

    async fn insert_deletion_request(
        &self,
        request: NewDeletionRequest,
    ) -> Result<String, StoreError> {
        self.inner.check_available()?;

        let id = Uuid::now_v7().to_string();
        let document = DeletionRequest {
            id: id.clone(),
            original_request_id: request.original_request_id,
            site_name: request.site_name,
            user_id: request.user_id,
            user_email: request.user_email,
            requested_at: Utc::now(),
            status: request.status,
        };

        self.inner.deletions.insert(id.clone(), document);
        debug!(deletion_id = %id, "deletion request stored");
        Ok(id)
    }

    async fn subscribe_requests(&self, user_id: &str) -> Result<Subscription, StoreError> {
        self.inner.check_available()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let observer_id = self.inner.next_observer.fetch_add(1, Ordering::Relaxed);
        {
            // Registering and sending the first snapshot under the publish lock
            // means a concurrent write is either in that snapshot or notified after it.
            let _publishing = self.inner.publish_lock();
            let _ = tx.send(Ok(self.inner.snapshot_for(user_id)));
            self.inner.observers.insert(
                observer_id,
                Observer {
                    user_id: user_id.to_string(),
                    tx,
                },
            );
        }

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(rx, move || {
            if let Some(inner) = inner.upgrade() {
                inner.observers.remove(&observer_id);
            }
        }))
    }
}
