//! Live, newest-first view of a user's site requests.
//!
//! Each snapshot delivered by the store replaces the whole list; there is no
//! incremental merge and the last snapshot received wins.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use htmlive_common::{
    DocumentStore, EffectiveStatus, Identity, NewDeletionRequest, RequestStatus, SiteRequest,
    StoreError, Subscription,
};
use serde::Serialize;
use tracing::{error, info, instrument};

/// Shown in place of an empty description.
pub const DEFAULT_DESCRIPTION: &str = "Awaiting moderator approval";

/// A site request as shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ProjectedRequest {
    #[schema(example = "0195f3c2-8d1e-7a4b-9c1d-2e3f4a5b6c7d")]
    pub id: String,
    #[schema(example = "My landing page")]
    pub name: String,
    #[schema(example = "A page about my cat")]
    pub description: String,
    pub status: EffectiveStatus,
    #[schema(example = "cat.example.com")]
    pub url: String,
    /// `null` while the store has not resolved the timestamp yet.
    #[schema(example = "2026-10-01T14:30:00Z")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = 3)]
    pub file_count: usize,
}

impl ProjectedRequest {
    pub fn from_request(request: &SiteRequest) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            status: request.effective_status(),
            url: request.url.clone(),
            created_at: request.created_at,
            file_count: request.files.len(),
        }
    }

    /// Link to the published site, if any. Bare hosts get an `https://` prefix.
    pub fn site_link(&self) -> Option<String> {
        if !self.status.is_live() {
            return None;
        }
        let url = self.url.trim();
        if url.is_empty() {
            None
        } else if url.starts_with("http") {
            Some(url.to_string())
        } else {
            Some(format!("https://{url}"))
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            EffectiveStatus::Live => "LIVE",
            EffectiveStatus::Pending => "WAITING",
        }
    }

    pub fn description_or_default(&self) -> &str {
        if self.description.is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            &self.description
        }
    }
}

/// Order requests newest first. Requests without a timestamp sort as oldest.
///
/// Timestamps compare at full precision; exact ties keep the store's order.
pub fn project(requests: Vec<SiteRequest>) -> Vec<ProjectedRequest> {
    let mut projected: Vec<ProjectedRequest> =
        requests.iter().map(ProjectedRequest::from_request).collect();
    // `None` orders below every timestamp.
    projected.sort_by_key(|r| Reverse(r.created_at));
    projected
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    /// No snapshot received yet.
    Loading,
    Ready(Vec<ProjectedRequest>),
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectorError {
    #[error("failed to send the deletion request: {0}")]
    Store(#[from] StoreError),
}

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation given up front, e.g. as a flag in an API call.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed(pub bool);

#[async_trait]
impl Confirm for Confirmed {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The user declined; nothing was written.
    Cancelled,
    Requested { deletion_id: String },
}

pub fn deletion_prompt(site_name: &str) -> String {
    format!("Do you really want to request deletion of project \"{site_name}\"?")
}

/// Ask moderators to take a site down.
///
/// The original request is left untouched; a separate deletion request is
/// recorded instead, after the user confirms.
#[instrument(skip(store, identity, confirm), fields(user_id = %identity.id))]
pub async fn request_deletion(
    store: &dyn DocumentStore,
    identity: &Identity,
    request_id: &str,
    site_name: &str,
    confirm: &dyn Confirm,
) -> Result<DeletionOutcome, ProjectorError> {
    if !confirm.confirm(&deletion_prompt(site_name)).await {
        return Ok(DeletionOutcome::Cancelled);
    }

    let deletion_id = store
        .insert_deletion_request(NewDeletionRequest {
            original_request_id: request_id.to_string(),
            site_name: site_name.to_string(),
            user_id: identity.id.clone(),
            user_email: identity.email.clone(),
            status: RequestStatus::Pending,
        })
        .await?;

    info!(deletion_id = %deletion_id, "deletion requested");
    Ok(DeletionOutcome::Requested { deletion_id })
}

/// The request list of one identity, kept current by a live subscription.
pub struct RequestHistory {
    identity: Identity,
    store: Arc<dyn DocumentStore>,
    subscription: Option<Subscription>,
    state: ListState,
}

impl RequestHistory {
    /// Subscribe to the identity's requests.
    ///
    /// A failed subscription is logged and leaves an empty, inactive view.
    pub async fn open(store: Arc<dyn DocumentStore>, identity: Identity) -> Self {
        let (subscription, state) = match store.subscribe_requests(&identity.id).await {
            Ok(subscription) => (Some(subscription), ListState::Loading),
            Err(e) => {
                error!(error = %e, user_id = %identity.id, "request subscription failed");
                (None, ListState::Ready(Vec::new()))
            }
        };

        Self {
            identity,
            store,
            subscription,
            state,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Current list; empty while loading.
    pub fn requests(&self) -> &[ProjectedRequest] {
        match &self.state {
            ListState::Loading => &[],
            ListState::Ready(list) => list,
        }
    }

    /// Whether the subscription is still open.
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Wait for the next snapshot and replace the list with it.
    ///
    /// Returns `None` once the view is closed or the subscription has ended.
    pub async fn next_update(&mut self) -> Option<&ListState> {
        let subscription = self.subscription.as_mut()?;

        match subscription.next().await {
            Some(Ok(requests)) => {
                self.state = ListState::Ready(project(requests));
                Some(&self.state)
            }
            Some(Err(e)) => {
                error!(error = %e, user_id = %self.identity.id, "request subscription failed");
                self.subscription = None;
                self.state = ListState::Ready(Vec::new());
                Some(&self.state)
            }
            None => {
                self.subscription = None;
                if self.state == ListState::Loading {
                    self.state = ListState::Ready(Vec::new());
                }
                None
            }
        }
    }

    /// Release the subscription. The last list stays readable.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub async fn request_deletion(
        &self,
        request: &ProjectedRequest,
        confirm: &dyn Confirm,
    ) -> Result<DeletionOutcome, ProjectorError> {
        request_deletion(
            self.store.as_ref(),
            &self.identity,
            &request.id,
            &request.name,
            confirm,
        )
        .await
    }
}
