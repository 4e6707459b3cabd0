//! Session extractor for axum handlers

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use super::Session;

/// Extractor for the current [`Session`]
///
/// Requires [`SessionLayer`](super::SessionLayer) on the router.
///
/// ```rust,ignore
/// use formmail::session::SessionExtractor;
///
/// async fn handler(SessionExtractor(session): SessionExtractor) -> String {
///     session.id().to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionExtractor(pub Session);

impl<S> FromRequestParts<S> for SessionExtractor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session not initialized"))
    }
}
