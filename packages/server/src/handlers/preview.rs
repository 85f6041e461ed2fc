use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::Html,
};
use chrono::Utc;
use htmlive_common::{ProjectState, upload};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::preview::{render_preview, resolve_entry};
use crate::state::AppState;

use super::bundle::read_bundle_form;

#[utoipa::path(
    post,
    path = "/",
    tag = "Preview",
    operation_id = "renderPreview",
    summary = "Preview a bundle",
    description = "Renders the preview page for the uploaded files without storing anything. \
        The entry is `index.html` (any case), else the first `.html` file. Its content runs in a \
        sandboxed frame that may execute scripts but gets no same-origin access.",
    request_body(content_type = "multipart/form-data", description = "Optional name and description, plus files"),
    responses(
        (status = 200, description = "Preview page", content_type = "text/html", body = String),
        (status = 400, description = "No files, bad filename or bundle too large (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn preview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let form = read_bundle_form(multipart).await?;
    let files = upload::assemble(form.files, &state.config.upload.limits()).await?;

    let project = ProjectState {
        id: uuid::Uuid::new_v4().to_string(),
        name: form.name.trim().to_string(),
        description: form.description,
        files: Arc::new(files),
        created_at: Utc::now(),
        url: String::new(),
    };
    let entry = resolve_entry(&project.files);
    tracing::debug!(
        entry = entry.and_then(|i| project.files.get(i)).map(|f| f.name.as_str()),
        "rendering preview"
    );

    let html = render_preview(&project, entry).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Html(html))
}
