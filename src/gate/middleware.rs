use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

use super::bridge::CookieBridge;
use super::cookies::CookieStore;
use super::provider::IdentityProvider;
use super::redirect::login_redirect;
use super::routes::RouteClass;
use super::state::Gate;

/// Session guard.
///
/// Public paths go straight to the inner service without touching cookies
/// or the provider. Protected paths need a resolved user; without one the
/// request is redirected to the login page. The resolved [`User`] is
/// available to handlers as a request extension.
///
/// [`User`]: super::provider::User
pub async fn guard<P: IdentityProvider>(
    State(gate): State<Gate<P>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if gate.config().routes().classify(&path) == RouteClass::Public {
        debug!(path = %path, "Public route");
        return next.run(request).await;
    }

    let mut store = CookieStore::from_headers(request.headers());
    let user = {
        let mut bridge = CookieBridge::new(&mut store, gate.config().environment());
        gate.resolver().resolve(&mut bridge).await
    };

    let mut response = match user {
        Some(user) => {
            debug!(path = %path, user_id = %user.id, "Session resolved");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => {
            info!(path = %path, "No session for protected route, redirecting to login");
            login_redirect(gate.config().login_path(), request.uri())
        }
    };

    store.apply(response.headers_mut());
    response
}
