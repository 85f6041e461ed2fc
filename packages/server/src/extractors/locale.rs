use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::messages::Locale;

/// Message locale negotiated from `Accept-Language`. Never rejects.
pub struct AcceptLocale(pub Locale);

impl<S> FromRequestParts<S> for AcceptLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default();
        Ok(AcceptLocale(locale))
    }
}
