use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};

/// Query parameter the login page reads to navigate back after sign in.
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// `<login_path>?returnUrl=<path[?query], URL-encoded as one value>`.
#[must_use]
pub fn login_location(login_path: &str, original: &Uri) -> String {
    let destination = match original.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", original.path()),
        _ => original.path().to_string(),
    };
    format!(
        "{login_path}?{RETURN_URL_PARAM}={}",
        urlencoding::encode(&destination)
    )
}

/// Temporary (307) redirect to the login page.
#[must_use]
pub fn login_redirect(login_path: &str, original: &Uri) -> Response {
    Redirect::temporary(&login_location(login_path, original)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header::LOCATION};

    #[test]
    fn path_only() {
        let uri: Uri = "/dashboard/orders".parse().unwrap();
        assert_eq!(
            login_location("/auth/login", &uri),
            "/auth/login?returnUrl=%2Fdashboard%2Forders"
        );
    }

    #[test]
    fn query_is_kept_inside_one_value() {
        let uri: Uri = "/dashboard/orders?status=completed&page=2".parse().unwrap();
        assert_eq!(
            login_location("/auth/login", &uri),
            "/auth/login?returnUrl=%2Fdashboard%2Forders%3Fstatus%3Dcompleted%26page%3D2"
        );
    }

    #[test]
    fn empty_query_is_dropped() {
        let uri: Uri = "/settings?".parse().unwrap();
        assert_eq!(
            login_location("/auth/login", &uri),
            "/auth/login?returnUrl=%2Fsettings"
        );
    }

    #[test]
    fn redirect_is_temporary() {
        let uri: Uri = "/profile".parse().unwrap();
        let response = login_redirect("/auth/login", &uri);
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/auth/login?returnUrl=%2Fprofile")
        );
    }
}
