use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/requests", request_routes(config))
        .nest("/preview", preview_routes(config))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn request_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(
            handlers::request::create_request,
            handlers::request::list_requests
        ))
        .layer(handlers::bundle_body_limit(&config.upload));

    upload
        .routes(routes!(handlers::request::stream_requests))
        .routes(routes!(handlers::request::request_deletion))
}

fn preview_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::preview::preview))
        .layer(handlers::bundle_body_limit(&config.upload))
}
