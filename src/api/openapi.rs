use super::handlers::{health, logout, user};
use crate::gate::User;
use axum::response::Json;
use utoipa::OpenApi;
use utoipa::openapi::{Contact, InfoBuilder, License};

#[derive(OpenApi)]
#[openapi(
    paths(health::health, logout::logout, user::user),
    components(schemas(health::Health, logout::LogoutResponse, logout::ErrorResponse, User)),
    tags(
        (name = "auth", description = "Session endpoints"),
        (name = "health", description = "Liveness and build information"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document with the info block taken from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();
    info.contact = cargo_contact();
    info.license = cargo_license();
    doc.info = info;
    doc
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, rest)) => (
            optional_str(name),
            optional_str(rest.trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}
