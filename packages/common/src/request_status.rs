use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a site request as written by moderators.
///
/// Submissions always start as `Pending`. Only the external moderation
/// process moves a request to `Live`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Live,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Live => "live",
        })
    }
}

/// Status shown to the owner of a request.
///
/// Computed at read time and never persisted: a request counts as live once a
/// moderator has either flipped its status or attached a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Pending,
    Live,
}

impl EffectiveStatus {
    pub fn derive(status: RequestStatus, url: &str) -> Self {
        if status == RequestStatus::Live || !url.trim().is_empty() {
            Self::Live
        } else {
            Self::Pending
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}
