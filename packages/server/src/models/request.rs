use serde::{Deserialize, Serialize};

use crate::projector::ProjectedRequest;

/// Returned after a site request was stored.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateRequestResponse {
    #[schema(example = "0195f3c2-8d1e-7a4b-9c1d-2e3f4a5b6c7d")]
    pub id: String,
    /// Number of files in the stored bundle.
    #[schema(example = 2)]
    pub file_count: usize,
}

/// The caller's site requests, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<ProjectedRequest>,
}

/// Body of a deletion request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct DeletionBody {
    /// Must be `true`; anything else is rejected without writing.
    #[serde(default)]
    #[schema(example = true)]
    pub confirm: bool,
}

/// Returned once a deletion request was recorded.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeletionResponse {
    #[schema(example = "0195f3c2-9a0b-7c1d-8e2f-3a4b5c6d7e8f")]
    pub id: String,
    #[schema(example = "0195f3c2-8d1e-7a4b-9c1d-2e3f4a5b6c7d")]
    pub original_request_id: String,
    #[schema(example = "My landing page")]
    pub site_name: String,
}
