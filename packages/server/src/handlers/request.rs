use std::convert::Infallible;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, stream};
use htmlive_common::SiteRequest;
use tracing::{error, info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::request::{
    CreateRequestResponse, DeletionBody, DeletionResponse, RequestListResponse,
};
use crate::projector::{
    self, Confirmed, DeletionOutcome, ProjectedRequest, RequestHistory, project,
};
use crate::state::AppState;
use crate::submitter::{Progress, SubmissionForm};

use super::bundle::read_bundle_form;

/// Current snapshot of the user's requests, in store order.
async fn fetch_requests(state: &AppState, user_id: &str) -> Result<Vec<SiteRequest>, AppError> {
    let mut subscription = state.store.subscribe_requests(user_id).await?;
    let snapshot = subscription
        .next()
        .await
        .ok_or_else(|| AppError::Store("subscription closed before the first snapshot".into()))?;
    subscription.unsubscribe();
    Ok(snapshot?)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Requests",
    operation_id = "createRequest",
    summary = "Submit a site request",
    description = "Packages the uploaded files into one pending site request. Fields: `name` (required), \
        `description` (optional) and one `file` part per file, in display order. \
        Nothing is stored when validation fails.",
    request_body(content_type = "multipart/form-data", description = "Site name, description and files"),
    responses(
        (status = 201, description = "Request stored", body = CreateRequestResponse),
        (status = 400, description = "No files, no name, bad filename or bundle too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 503, description = "Store rejected the write (STORE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.0.id))]
pub async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_bundle_form(multipart).await?;
    let progress = Progress::new();

    let receipt = state
        .submitter()
        .submit(
            Some(&auth_user.0),
            &SubmissionForm::new(form.name, form.description),
            form.files,
            &progress,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRequestResponse {
            id: receipt.request_id,
            file_count: receipt.project.files.len(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Requests",
    operation_id = "listRequests",
    summary = "List own site requests",
    description = "Newest first. Requests without a timestamp come last. \
        `status` is `live` once a moderator approved the request or attached a URL.",
    responses(
        (status = 200, description = "The caller's requests", body = RequestListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 503, description = "Store unavailable (STORE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn list_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<RequestListResponse>, AppError> {
    let requests = fetch_requests(&state, &auth_user.0.id).await?;
    Ok(Json(RequestListResponse {
        data: project(requests),
    }))
}

fn list_event(requests: &[ProjectedRequest]) -> Event {
    Event::default()
        .event("requests")
        .json_data(requests)
        .unwrap_or_else(|e| {
            error!(error = %e, "failed to encode request list");
            Event::default().event("error")
        })
}

#[utoipa::path(
    get,
    path = "/stream",
    tag = "Requests",
    operation_id = "streamRequests",
    summary = "Follow own site requests",
    description = "Server-sent events. Every `requests` event carries the complete list, newest first, \
        and replaces the previous one. If the store stops the feed, one empty list is sent and the \
        stream ends.",
    responses(
        (status = 200, description = "Event stream of request lists", content_type = "text/event-stream", body = [ProjectedRequest]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.id))]
pub async fn stream_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let history = RequestHistory::open(state.store.clone(), auth_user.0).await;

    // The subscription lives inside the stream and is released when the
    // client disconnects.
    let events = stream::unfold(Some(history), |history| async move {
        let mut history = history?;
        if history.is_active() {
            history.next_update().await?;
        }
        let event = list_event(history.requests());
        let history = history.is_active().then_some(history);
        Some((Ok(event), history))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[utoipa::path(
    post,
    path = "/{id}/deletion",
    tag = "Requests",
    operation_id = "requestDeletion",
    summary = "Ask for a site to be taken down",
    description = "Records a pending deletion request for moderators. The site request itself is not \
        modified. The body must confirm the action with `\"confirm\": true`.",
    params(("id" = String, Path, description = "Site request ID")),
    request_body = DeletionBody,
    responses(
        (status = 202, description = "Deletion requested", body = DeletionResponse),
        (status = 400, description = "Not confirmed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No such request owned by the caller (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Store rejected the write (STORE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, body), fields(user_id = %auth_user.0.id))]
pub async fn request_deletion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<DeletionBody>,
) -> Result<impl IntoResponse, AppError> {
    if !body.confirm {
        return Err(AppError::Validation(
            "Deletion must be confirmed with \"confirm\": true".into(),
        ));
    }

    let requests = fetch_requests(&state, &auth_user.0.id).await?;
    let request = requests
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Request {id} not found")))?;

    let outcome = projector::request_deletion(
        state.store.as_ref(),
        &auth_user.0,
        &request.id,
        &request.name,
        &Confirmed(body.confirm),
    )
    .await?;

    match outcome {
        DeletionOutcome::Requested { deletion_id } => {
            info!(deletion_id = %deletion_id, request_id = %id, "deletion requested via API");
            Ok((
                StatusCode::ACCEPTED,
                Json(DeletionResponse {
                    id: deletion_id,
                    original_request_id: request.id.clone(),
                    site_name: request.name.clone(),
                }),
            ))
        }
        DeletionOutcome::Cancelled => Err(AppError::Validation("Deletion was cancelled".into())),
    }
}
