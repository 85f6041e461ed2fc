//! Packaging a file selection into a site request and writing it to the store.

use std::sync::Arc;

use chrono::Utc;
use htmlive_common::upload::{self, validate_selection};
use htmlive_common::{
    DocumentStore, Identity, NewSiteRequest, ProjectState, RawFile, RequestStatus, StoreError,
    UploadError, UploadLimits,
};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Progress reported once the submission has been accepted for processing.
pub const PROGRESS_STARTED: u8 = 10;
/// Progress reported after every file has been read.
pub const PROGRESS_FILES_READ: u8 = 60;
/// Progress reported after the store confirmed the write.
pub const PROGRESS_DONE: u8 = 100;

/// Monotonic percentage shown while a submission is in flight.
///
/// Purely cosmetic: the values are not checkpoints and nothing resumes from them.
#[derive(Debug)]
pub struct Progress {
    tx: watch::Sender<u8>,
}

impl Progress {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Move forward to `percent`. Values at or below the current one are ignored.
    pub fn advance(&self, percent: u8) {
        let percent = percent.min(100);
        self.tx.send_if_modified(|current| {
            if percent > *current {
                *current = percent;
                true
            } else {
                false
            }
        });
    }

    pub fn get(&self) -> u8 {
        *self.tx.borrow()
    }

    /// Back to zero for the next submission.
    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.tx.subscribe()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Text inputs of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub name: String,
    pub description: String,
}

impl SubmissionForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Nobody is signed in; the caller should open the sign-in prompt.
    #[error("sign-in required")]
    SignInRequired,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("failed to store the request: {0}")]
    Store(#[from] StoreError),
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub request_id: String,
    /// Local copy of what was sent, for previewing.
    pub project: ProjectState,
}

/// Writes new site requests on behalf of the signed-in user.
///
/// Every call performs at most one insert. There is no idempotency key, so
/// submitting the same form twice creates two requests.
#[derive(Clone)]
pub struct RequestSubmitter {
    store: Arc<dyn DocumentStore>,
    limits: UploadLimits,
}

impl RequestSubmitter {
    pub fn new(store: Arc<dyn DocumentStore>, limits: UploadLimits) -> Self {
        Self { store, limits }
    }

    #[instrument(skip_all, fields(name = %form.name, files = files.len()))]
    pub async fn submit(
        &self,
        identity: Option<&Identity>,
        form: &SubmissionForm,
        files: Vec<RawFile>,
        progress: &Progress,
    ) -> Result<SubmitReceipt, SubmitError> {
        let identity = identity.ok_or(SubmitError::SignInRequired)?;
        validate_selection(&form.name, files.len())?;

        progress.advance(PROGRESS_STARTED);
        let files = Arc::new(upload::assemble(files, &self.limits).await?);
        progress.advance(PROGRESS_FILES_READ);

        let name = form.name.trim().to_string();
        let document = NewSiteRequest {
            name: name.clone(),
            description: form.description.clone(),
            user_id: identity.id.clone(),
            user_email: identity.email.clone(),
            status: RequestStatus::Pending,
            url: String::new(),
            files: Arc::clone(&files),
        };

        let request_id = self.store.insert_request(document).await.map_err(|e| {
            warn!(error = %e, "site request insert failed");
            e
        })?;
        progress.advance(PROGRESS_DONE);

        info!(request_id = %request_id, user_id = %identity.id, "site request submitted");

        Ok(SubmitReceipt {
            request_id: request_id.clone(),
            project: ProjectState {
                id: request_id,
                name,
                description: form.description.clone(),
                files,
                created_at: Utc::now(),
                url: String::new(),
            },
        })
    }
}
