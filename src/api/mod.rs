use crate::gate::{Gate, IdentityProvider, guard};
use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, debug_span, info};
use ulid::Ulid;

pub mod handlers;
pub mod openapi;

use handlers::{health, logout, pass_through, user};

const REQUEST_ID: &str = "x-request-id";

/// Build the application router.
///
/// Everything registered before the guard layer, including the fallback, is
/// gated. `/health` and `/openapi.json` are added after it and always answer.
pub fn router<P: IdentityProvider>(gate: Gate<P>) -> Router {
    Router::new()
        .route("/api/auth/logout", post(logout::logout::<P>))
        .route("/api/auth/user", get(user::user::<P>))
        .fallback(pass_through)
        .layer(middleware::from_fn_with_state(gate.clone(), guard::<P>))
        .with_state(gate)
        .route("/health", get(health::health).options(health::health))
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
}

/// Serve the gate until Ctrl-C or SIGTERM.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails
pub async fn new<P: IdentityProvider>(port: u16, gate: Gate<P>) -> Result<()> {
    let app = router(gate);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            info!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                info!("Failed to listen for SIGTERM: {err}");
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

    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    // Headers carry session cookies; only the path and request id are recorded.
    debug_span!("http-request", path, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::stub::{SESSION_COOKIE, StubProvider, USER_ID, session_cookie_value};
    use crate::gate::{Environment, GateConfig, User};
    use axum::body::to_bytes;
    use axum::http::{
        Method, StatusCode,
        header::{COOKIE, LOCATION, SET_COOKIE},
    };
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    fn gate(provider: StubProvider) -> Gate<StubProvider> {
        Gate::new(
            provider,
            GateConfig::default().with_environment(Environment::Production),
        )
    }

    fn set_cookies(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn logout_expires_provider_cookies_only() -> Result<()> {
        let gate = gate(StubProvider::accepting("x"));
        let response = router(gate.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/auth/logout")
                    .header(COOKIE, "sb-access-token=x; supabase-auth-token=y; other=z")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gate.provider().sign_out_calls.load(Ordering::SeqCst), 1);

        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=;")));
        assert!(cookies.iter().any(|c| c.starts_with("supabase-auth-token=;")));
        assert!(cookies.iter().all(|c| !c.starts_with("other=")));
        assert!(cookies
            .iter()
            .all(|c| c.contains("Path=/;") && c.contains("Max-Age=0") && c.contains("Secure")));

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let body: logout::LogoutResponse = serde_json::from_slice(&body)?;
        assert!(body.success);
        Ok(())
    }

    #[tokio::test]
    async fn logout_provider_failure_keeps_cookies() -> Result<()> {
        let response = router(gate(StubProvider::failing()))
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/auth/logout")
                    .header(
                        COOKIE,
                        format!("{SESSION_COOKIE}={}", session_cookie_value("a", None)),
                    )
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(set_cookies(&response).is_empty());
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let body: logout::ErrorResponse = serde_json::from_slice(&body)?;
        assert!(!body.error.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_session_still_sweeps() -> Result<()> {
        let gate = gate(StubProvider::failing());
        let response = router(gate.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/auth/logout")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gate.provider().sign_out_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            set_cookies(&response).len(),
            crate::gate::cookies::PROVIDER_COOKIES.len()
        );
        Ok(())
    }

    #[tokio::test]
    async fn current_user() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(
                Request::builder()
                    .uri("/api/auth/user")
                    .header(
                        COOKIE,
                        format!("{SESSION_COOKIE}={}", session_cookie_value("access-1", None)),
                    )
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let user: User = serde_json::from_slice(&body)?;
        assert_eq!(user.id.to_string(), USER_ID);
        Ok(())
    }

    #[tokio::test]
    async fn current_user_without_session_is_no_content() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(Request::builder().uri("/api/auth/user").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_gated() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(Request::builder().uri("/reports/2024").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/auth/login?returnUrl=%2Freports%2F2024")
        );
        Ok(())
    }

    #[tokio::test]
    async fn public_path_passes_through() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(Request::builder().uri("/landing").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(REQUEST_ID));
        Ok(())
    }

    #[tokio::test]
    async fn request_id_is_propagated() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID, "01J0000000000000000000TEST")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID).and_then(|v| v.to_str().ok()),
            Some("01J0000000000000000000TEST")
        );
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_is_served() -> Result<()> {
        let response = router(gate(StubProvider::accepting("access-1")))
            .oneshot(Request::builder().uri("/openapi.json").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let doc: serde_json::Value = serde_json::from_slice(&body)?;
        assert!(doc["paths"]["/api/auth/logout"].is_object());
        Ok(())
    }
}
