//! Router assembly and the HTTP server loop

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::FormMailConfig;
use crate::handlers;
use crate::session::SessionLayer;
use crate::state::AppState;

/// Largest accepted form body in bytes
///
/// Enforced by the `Form` extractor, so oversized bodies reach the handler
/// as a rejection and are reported in the caller's response mode.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the relay router
///
/// Routes: `GET /token`, `POST /send`, `GET /health`.
pub fn router(state: AppState) -> Router {
    let sessions = SessionLayer::with_config(state.store(), state.config().session.clone());

    Router::new()
        .route("/token", get(handlers::token))
        .route("/send", post(handlers::send_message))
        .route("/health", get(handlers::health))
        .layer(sessions)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the relay until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns error if the mailer config is invalid, the address cannot be
/// bound, or the server fails
pub async fn serve(config: FormMailConfig) -> anyhow::Result<()> {
    let bind = config.server.bind;
    let state = AppState::new(config)?;
    let listener = TcpListener::bind(bind).await?;

    tracing::info!(address = %listener.local_addr()?, "formmail listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("formmail stopped");
    Ok(())
}

/// Resolve on Ctrl-C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::{test_config, MockEmailSender};
    use axum::body::Body;
    use http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::with_sender(
            test_config(),
            Arc::new(MockEmailSender::new()),
        ))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_send_requires_post() {
        let response = app()
            .oneshot(Request::builder().uri("/send").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cookieless_clients_do_not_accumulate_sessions() {
        let store = Arc::new(MemorySessionStore::with_ttl(Duration::from_millis(500)));
        let app = router(
            AppState::with_sender(test_config(), Arc::new(MockEmailSender::new()))
                .with_store(store.clone()),
        );

        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/token").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(store.len(), 5);

        tokio::time::sleep(Duration::from_millis(600)).await;

        let response = app
            .oneshot(Request::builder().uri("/token").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_config() {
        assert!(serve(FormMailConfig::default()).await.is_err());
    }
}
