use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request_status::{EffectiveStatus, RequestStatus};

/// A single file of a site bundle, read fully into memory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadedFile {
    /// Flat filename (e.g., "index.html", "style.css").
    #[schema(example = "index.html")]
    pub name: String,
    /// Textual content of the file.
    #[schema(example = "<h1>Hello</h1>")]
    pub content: String,
    /// Declared or guessed MIME type.
    #[serde(rename = "type")]
    #[schema(example = "text/html")]
    pub mime_type: String,
}

/// The files of one bundle, in upload order.
///
/// Shared rather than copied between the stored request, live snapshots and
/// the local preview.
pub type Bundle = Arc<Vec<UploadedFile>>;

/// An authenticated user principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Identity {
    #[schema(example = "0195f3c2-8d1e-7a4b-9c1d-2e3f4a5b6c7d")]
    pub id: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
}

/// A persisted site request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRequest {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Server-assigned. `None` until the store has resolved the timestamp.
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub user_email: String,
    pub status: RequestStatus,
    pub url: String,
    pub files: Bundle,
}

impl SiteRequest {
    pub fn effective_status(&self) -> EffectiveStatus {
        EffectiveStatus::derive(self.status, &self.url)
    }
}

/// Document written when a user submits a site request.
///
/// The store assigns the id and the creation timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSiteRequest {
    pub name: String,
    pub description: String,
    pub user_id: String,
    pub user_email: String,
    pub status: RequestStatus,
    pub url: String,
    pub files: Bundle,
}

/// A user's request to take a site down. Read only by moderators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    pub id: String,
    pub original_request_id: String,
    pub site_name: String,
    pub user_id: String,
    pub user_email: String,
    pub requested_at: DateTime<Utc>,
    pub status: RequestStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeletionRequest {
    pub original_request_id: String,
    pub site_name: String,
    pub user_id: String,
    pub user_email: String,
    pub status: RequestStatus,
}

/// Locally held copy of a just-submitted request, used for previewing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectState {
    pub id: String,
    pub name: String,
    pub description: String,
    pub files: Bundle,
    pub created_at: DateTime<Utc>,
    pub url: String,
}
