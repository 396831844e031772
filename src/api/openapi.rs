use super::handlers::{auth, health, sessions, users};
use axum::middleware;
use utoipa::openapi::{
    Components, Contact, InfoBuilder, License, OpenApiBuilder, Tag,
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Same wiring as the server; only the document is kept.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Documented routes. Everything in `protected` runs behind the bearer middleware.
pub(crate) fn api_router() -> OpenApiRouter {
    let protected = OpenApiRouter::new()
        .routes(routes!(users::profile::me))
        .routes(routes!(users::profile::get_user))
        .routes(routes!(users::profile::list))
        .routes(routes!(sessions::manage::create))
        .routes(routes!(sessions::manage::update, sessions::manage::delete))
        .routes(routes!(sessions::manage::rooms))
        .route_layer(middleware::from_fn(auth::middleware::require_bearer));

    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::login::login))
        .routes(routes!(users::signup::signup))
        .routes(routes!(sessions::public::list))
        .routes(routes!(sessions::public::get))
        .routes(routes!(sessions::public::get_by_slug))
        .merge(protected);

    let openapi = router.get_openapi_mut();
    openapi.tags = Some(vec![
        tag("health", "Liveness and database status"),
        tag("auth", "Password login and bearer tokens"),
        tag("users", "Signup and user lookups"),
        tag("sessions", "Shareable sessions and room memberships"),
    ]);
    openapi
        .components
        .get_or_insert_with(Components::new)
        .add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    router
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

// Cargo authors are `;` separated and may include "Name <email>".
fn cargo_contact() -> Option<Contact> {
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
    Some(value.trim()).filter(|value| !value.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (
            optional_str(name),
            optional_str(email.trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Roster"));
            assert_eq!(contact.email.as_deref(), Some("team@roster.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some_and(|license| license.name == "BSD-3-Clause"));
    }

    #[test]
    fn openapi_documents_every_route() {
        let spec = openapi();
        for path in [
            "/health",
            "/v1/login",
            "/v1/users",
            "/v1/users/me",
            "/v1/users/{id}",
            "/v1/sessions",
            "/v1/sessions/{id}",
            "/v1/sessions/slug/{slug}",
            "/v1/sessions/{id}/rooms",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
        let tags = spec.tags.unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "sessions"));
        assert!(
            spec.components
                .is_some_and(|components| components.security_schemes.contains_key("bearer"))
        );
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Jane Doe <jane@example.com>"),
            (Some("Jane Doe"), Some("jane@example.com"))
        );
        assert_eq!(parse_author("Jane Doe"), (Some("Jane Doe"), None));
        assert_eq!(parse_author("<jane@example.com>"), (None, Some("jane@example.com")));
    }
}
