//! HTTP handlers for the relay
//!
//! ```rust,ignore
//! use axum::{routing::{get, post}, Router};
//! use formmail::handlers;
//!
//! let app = Router::new()
//!     .route("/token", get(handlers::token))
//!     .route("/send", post(handlers::send_message))
//!     .route("/health", get(handlers::health));
//! ```

use axum::{
    extract::{rejection::FormRejection, OriginalUri, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_htmx::HxRequest;
use serde::{Deserialize, Serialize};

use crate::csrf;
use crate::error::MailerError;
use crate::mailer::{prepare_message, Mailer, RequestContext, ResponseMode};
use crate::session::{Session, SessionExtractor};
use crate::state::AppState;

/// Submitted contact form
///
/// Missing fields deserialize as empty so the mailer reports them by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    /// Sender address
    pub email: String,
    /// Sender display name
    pub name: String,
    /// Message body
    pub message: String,
    /// Subject line
    pub subject: Option<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// CSRF token from [`token`]
    pub token: Option<String>,
    /// Ask for an Ajax-style answer
    pub ajax: Option<String>,
}

impl ContactForm {
    /// Whether the `ajax` field holds a truthy value
    #[must_use]
    pub fn wants_ajax(&self) -> bool {
        self.ajax.as_deref().is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        })
    }
}

/// Body of `GET /token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The session's CSRF token
    pub token: String,
}

/// GET /token - Issue the session's CSRF token
///
/// Repeated calls within a session return the same token.
pub async fn token(SessionExtractor(session): SessionExtractor) -> Json<TokenResponse> {
    let token = csrf::get_token(&session);
    Json(TokenResponse {
        token: token.as_str().to_string(),
    })
}

/// POST /send - Relay a contact form submission to the configured mailbox
///
/// Answers in Ajax mode when the form, an htmx or XHR request header, or
/// the `mail.ajax` setting asks for it; otherwise errors come back as
/// plain text with a status matching the error kind. A body that cannot be
/// read as a form is a validation failure in Ajax mode and keeps axum's own
/// rejection otherwise.
pub async fn send_message(
    State(state): State<AppState>,
    SessionExtractor(session): SessionExtractor,
    HxRequest(is_htmx): HxRequest,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    let ajax_requested = is_htmx || is_xhr(&headers) || state.config().mail.ajax;

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(
                status = %rejection.status(),
                detail = %rejection.body_text(),
                "Contact form rejected"
            );
            if ajax_requested {
                let err = MailerError::validation(rejection.body_text());
                return ResponseMode::Ajax.respond(Err(err));
            }
            return rejection.into_response();
        }
    };

    let mode = ResponseMode::from_ajax(ajax_requested || form.wants_ajax());
    let context = RequestContext::from_request(&headers, &uri);

    tracing::debug!(
        ajax = mode.is_ajax(),
        host = ?context.host,
        has_token = form.token.is_some(),
        "Contact form received"
    );

    let result = relay(&state, session, &context, form, mode).await;
    mode.respond(result)
}

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

async fn relay(
    state: &AppState,
    session: Session,
    context: &RequestContext,
    form: ContactForm,
    mode: ResponseMode,
) -> Result<(), MailerError> {
    let config = state.config();
    let mut mailer = Mailer::with_sender(config.mailer_config(), state.sender())?
        .with_session(session);
    mailer.set_response_mode(mode);

    match form.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => mailer.set_token(token)?,
        None if config.security.require_token => mailer.require_token(),
        None => {}
    }

    let draft = mailer.draft_mut();
    draft.from_email = form.email.trim().to_string();
    draft.from_name = form.name.trim().to_string();
    if !form.message.is_empty() {
        draft.body = prepare_message(&form.message, context);
    }
    draft.subject = form
        .subject
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.mail.subject.clone());
    draft.reply_to = form.reply_to.filter(|r| !r.trim().is_empty());

    mailer.send().await
}

fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(ajax: Option<&str>) -> ContactForm {
        ContactForm {
            ajax: ajax.map(ToString::to_string),
            ..ContactForm::default()
        }
    }

    #[test]
    fn test_wants_ajax() {
        assert!(form(Some("1")).wants_ajax());
        assert!(form(Some("true")).wants_ajax());
        assert!(form(Some("On")).wants_ajax());
        assert!(!form(Some("0")).wants_ajax());
        assert!(!form(Some("")).wants_ajax());
        assert!(!form(None).wants_ajax());
    }

    #[test]
    fn test_is_xhr() {
        let mut headers = HeaderMap::new();
        assert!(!is_xhr(&headers));
        headers.insert("x-requested-with", "XMLHttpRequest".parse().unwrap());
        assert!(is_xhr(&headers));
    }

    #[test]
    fn test_form_defaults_missing_fields() {
        let form: ContactForm =
            serde_json::from_value(serde_json::json!({"email": "a@b.com"})).unwrap();
        assert_eq!(form.email, "a@b.com");
        assert!(form.name.is_empty());
        assert!(form.token.is_none());
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }
}
