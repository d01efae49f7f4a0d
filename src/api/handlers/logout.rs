use crate::gate::{
    CookieBridge, CookieStore, Gate, IdentityProvider, logout_sweep, sweep::request_cookie_names,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    post,
    path= "/api/auth/logout",
    responses (
        (status = 200, description = "Session revoked and provider cookies expired", body = LogoutResponse),
        (status = 500, description = "Identity provider failed to revoke the session", body = ErrorResponse),
    ),
    tag = "auth",
)]
/// Revoke the caller's session and expire every provider cookie.
///
/// A provider failure leaves the cookies in place so the client can retry.
#[instrument(skip_all)]
pub async fn logout<P: IdentityProvider>(
    State(gate): State<Gate<P>>,
    headers: HeaderMap,
) -> Response {
    let mut store = CookieStore::from_headers(&headers);
    let names = request_cookie_names(&store);
    let mut bridge = CookieBridge::new(&mut store, gate.config().environment());

    if let Err(err) = gate.resolver().sign_out(&bridge).await {
        error!("Failed to sign out: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response();
    }

    let removed = logout_sweep(&mut bridge, &names);
    debug!(removed, "Expired provider cookies");

    let mut response = (StatusCode::OK, Json(LogoutResponse { success: true })).into_response();
    store.apply(response.headers_mut());
    response
}
