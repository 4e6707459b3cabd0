//! Message body composition

use axum::http::{header::HOST, HeaderMap, Uri};

/// Greeting used when the originating host is unknown
pub const GENERIC_GREETING: &str = "You have received a new message from your website";

/// Request metadata the composed body refers to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Host the form was served from
    pub host: Option<String>,
    /// Request URI (path and query)
    pub uri: Option<String>,
}

impl RequestContext {
    /// Create a context from optional host and URI values
    #[must_use]
    pub fn new(host: Option<&str>, uri: Option<&str>) -> Self {
        Self {
            host: non_empty(host),
            uri: non_empty(uri),
        }
    }

    /// Read the `Host` header and the request URI
    #[must_use]
    pub fn from_request(headers: &HeaderMap, uri: &Uri) -> Self {
        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| uri.authority().map(axum::http::uri::Authority::as_str));
        let path = uri.path_and_query().map(axum::http::uri::PathAndQuery::as_str);
        Self::new(host, path)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Prefix a raw body with a greeting and, when known, the source URL
///
/// Parts are joined with a blank line. Pure: the same input and context
/// always give the same output.
#[must_use]
pub fn prepare_message(raw_body: &str, context: &RequestContext) -> String {
    let mut parts = Vec::with_capacity(3);

    match &context.host {
        Some(host) => parts.push(format!("You have received a new message from {host}")),
        None => parts.push(GENERIC_GREETING.to_string()),
    }

    if let (Some(host), Some(uri)) = (&context.host, &context.uri) {
        parts.push(format!("Sent from: {host}{uri}"));
    }

    parts.push(raw_body.to_string());
    parts.join("\n\n")
}
