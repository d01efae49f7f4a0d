pub mod health;
pub mod logout;
pub mod user;

use axum::http::StatusCode;

/// The gate stands in front of the real application; anything that gets past
/// it without a dedicated route is acknowledged with no content.
pub async fn pass_through() -> StatusCode {
    StatusCode::NO_CONTENT
}
