//! Client-side orchestration of the submit, history and preview flows.
//!
//! A [`Controller`] is owned by one client. Every piece of state the flows
//! need (identity, view mode, form, progress, the last project) lives on it
//! explicitly, so several clients never share anything but the collaborators.

use std::sync::Arc;

use htmlive_common::upload::validate_selection;
use htmlive_common::{DocumentStore, Identity, ProjectState, RawFile, UploadLimits};
use tracing::{error, info, instrument, warn};

use crate::messages::{Locale, auth_message};
use crate::preview::{EntryPointCache, render_preview};
use crate::projector::{Confirm, DeletionOutcome, ProjectedRequest, RequestHistory};
use crate::session::Session;
use crate::submitter::{Progress, RequestSubmitter, SubmissionForm, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Home,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Assembling,
    Submitting,
}

/// Feedback for the user, drained by the UI with [`Controller::take_notices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The sign-in prompt should open.
    SignInRequired,
    Submitted { request_id: String },
    DeletionRequested { site_name: String },
    Error(String),
}

/// A file picked by the user. The bytes stay around so a failed submission
/// can be retried with the same selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            data: data.into(),
        }
    }

    fn to_raw(&self) -> RawFile {
        RawFile::from_bytes(self.name.clone(), self.mime_type.clone(), self.data.clone())
    }
}

pub struct Controller {
    session: Session,
    store: Arc<dyn DocumentStore>,
    submitter: RequestSubmitter,
    locale: Locale,
    identity: Option<Identity>,
    view: ViewMode,
    phase: Phase,
    form: SubmissionForm,
    selection: Vec<SelectedFile>,
    progress: Progress,
    project: Option<ProjectState>,
    entry_cache: EntryPointCache,
    history: Option<RequestHistory>,
    notices: Vec<Notice>,
}

impl Controller {
    pub fn new(session: Session, store: Arc<dyn DocumentStore>, limits: UploadLimits) -> Self {
        let identity = session.current();
        Self {
            session,
            submitter: RequestSubmitter::new(store.clone(), limits),
            store,
            locale: Locale::default(),
            identity,
            view: ViewMode::Home,
            phase: Phase::Idle,
            form: SubmissionForm::default(),
            selection: Vec::new(),
            progress: Progress::new(),
            project: None,
            entry_cache: EntryPointCache::default(),
            history: None,
            notices: Vec::new(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &SubmissionForm {
        &self.form
    }

    pub fn selection(&self) -> &[SelectedFile] {
        &self.selection
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Project kept from the last successful submission.
    pub fn project(&self) -> Option<&ProjectState> {
        self.project.as_ref()
    }

    pub fn history(&self) -> Option<&RequestHistory> {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> Option<&mut RequestHistory> {
        self.history.as_mut()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    pub fn select_files(&mut self, files: Vec<SelectedFile>) {
        self.selection = files;
    }

    /// Sign in. On failure the localized message is returned and the session
    /// stays as it was.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), &'static str> {
        let result = self.session.sign_in(email, password).await;
        self.finish_auth(result).await
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<(), &'static str> {
        let result = self.session.sign_up(email, password).await;
        self.finish_auth(result).await
    }

    async fn finish_auth(
        &mut self,
        result: Result<Identity, htmlive_common::AuthError>,
    ) -> Result<(), &'static str> {
        match result {
            Ok(identity) => {
                self.set_identity(Some(identity)).await;
                Ok(())
            }
            Err(e) => Err(auth_message(&e, self.locale)),
        }
    }

    pub async fn sign_out(&mut self) {
        self.session.sign_out();
        self.set_identity(None).await;
    }

    /// React to an identity change reported by the session.
    ///
    /// The open history belongs to the previous identity and is always closed.
    /// A still signed-in user keeps the history view, now for the new account.
    pub async fn set_identity(&mut self, identity: Option<Identity>) {
        if self.identity == identity {
            return;
        }
        self.identity = identity;
        if let Some(mut history) = self.history.take() {
            history.close();
        }

        match &self.identity {
            None => self.view = ViewMode::Home,
            Some(identity) if self.view == ViewMode::History => {
                self.history = Some(RequestHistory::open(self.store.clone(), identity.clone()).await);
            }
            Some(_) => {}
        }
    }

    /// Switch between the form and the request history.
    pub async fn toggle_history(&mut self) {
        match self.view {
            ViewMode::History => self.show_home(),
            ViewMode::Home => self.show_history().await,
        }
    }

    pub fn show_home(&mut self) {
        if let Some(mut history) = self.history.take() {
            history.close();
        }
        self.view = ViewMode::Home;
    }

    pub async fn show_history(&mut self) {
        let Some(identity) = self.identity.clone() else {
            self.notices.push(Notice::SignInRequired);
            return;
        };
        if self.history.is_none() {
            self.history = Some(RequestHistory::open(self.store.clone(), identity).await);
        }
        self.view = ViewMode::History;
    }

    /// Submit the current form and selection.
    #[instrument(skip(self), fields(name = %self.form.name, files = self.selection.len()))]
    pub async fn submit(&mut self) {
        let Some(identity) = self.identity.clone() else {
            self.notices.push(Notice::SignInRequired);
            return;
        };

        self.phase = Phase::Assembling;
        if let Err(e) = validate_selection(&self.form.name, self.selection.len()) {
            self.phase = Phase::Idle;
            self.notices.push(Notice::Error(e.to_string()));
            return;
        }

        self.phase = Phase::Submitting;
        self.progress.reset();
        let files = self.selection.iter().map(SelectedFile::to_raw).collect();
        let result = self
            .submitter
            .submit(Some(&identity), &self.form, files, &self.progress)
            .await;
        self.phase = Phase::Idle;

        match result {
            Ok(receipt) => {
                self.form = SubmissionForm::default();
                self.selection.clear();
                self.progress.reset();
                self.project = Some(receipt.project);
                self.notices.push(Notice::Submitted {
                    request_id: receipt.request_id,
                });
                self.show_history().await;
            }
            Err(SubmitError::SignInRequired) => self.notices.push(Notice::SignInRequired),
            Err(SubmitError::Store(e)) => {
                warn!(error = %e, "submission failed");
                self.progress.reset();
                self.notices.push(Notice::Error(
                    "Failed to send the request. Please try again.".into(),
                ));
            }
            Err(SubmitError::Upload(e)) => {
                self.progress.reset();
                self.notices.push(Notice::Error(e.to_string()));
            }
        }
    }

    /// Ask for a site from the open history to be taken down.
    pub async fn request_deletion(&mut self, request: &ProjectedRequest, confirm: &dyn Confirm) {
        let Some(history) = &self.history else {
            return;
        };
        let result = history.request_deletion(request, confirm).await;
        match result {
            Ok(DeletionOutcome::Requested { .. }) => {
                self.notices.push(Notice::DeletionRequested {
                    site_name: request.name.clone(),
                });
            }
            Ok(DeletionOutcome::Cancelled) => {}
            Err(e) => {
                warn!(error = %e, request_id = %request.id, "deletion request failed");
                self.notices.push(Notice::Error(
                    "Failed to send the deletion request.".into(),
                ));
            }
        }
    }

    /// Render the kept project, if there is one.
    pub fn open_preview(&mut self) -> Option<String> {
        let project = self.project.as_ref()?;
        let entry = self.entry_cache.resolve(&project.files);
        let entry_name = entry.and_then(|i| project.files.get(i)).map(|f| f.name.as_str());
        info!(project_id = %project.id, entry = entry_name, "preview opened");
        match render_preview(project, entry) {
            Ok(html) => Some(html),
            Err(e) => {
                error!(error = %e, project_id = %project.id, "preview rendering failed");
                self.notices
                    .push(Notice::Error("Failed to open the preview.".into()));
                None
            }
        }
    }

    pub fn close_preview(&mut self) {
        self.project = None;
    }
}
