use crate::gate::{CookieBridge, CookieStore, Gate, IdentityProvider, User};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::instrument;

#[utoipa::path(
    get,
    path= "/api/auth/user",
    responses (
        (status = 200, description = "Session is valid", body = User),
        (status = 204, description = "No valid session"),
    ),
    tag = "auth",
)]
/// Current user, resolved the same way the gate resolves protected requests.
/// A refreshed session is written back on this response too.
#[instrument(skip_all)]
pub async fn user<P: IdentityProvider>(State(gate): State<Gate<P>>, headers: HeaderMap) -> Response {
    let mut store = CookieStore::from_headers(&headers);
    let user = {
        let mut bridge = CookieBridge::new(&mut store, gate.config().environment());
        gate.resolver().resolve(&mut bridge).await
    };

    let mut response = match user {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };
    store.apply(response.headers_mut());
    response
}
