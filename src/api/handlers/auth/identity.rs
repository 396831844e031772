//! Request-scoped identity and role checks.
//!
//! The middleware decodes token claims into [`IdentityClaims`] exactly once and
//! stores the resulting [`Identity`] in the request extensions. Handlers read it
//! back through the extractor or [`current_identity`]; nothing is shared across
//! requests.

use axum::{
    extract::FromRequestParts,
    http::{Extensions, request::Parts},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OWNER: &str = "owner";

/// Claims every protected request needs. A token missing any of these, or
/// carrying them with the wrong type, does not produce an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub id: Uuid,
    /// Display name, `"{first_name} {last_name}"`.
    pub username: String,
    pub roles: Vec<String>,
    /// Active flag of the account when the token was issued.
    pub status: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    id: Uuid,
    name: String,
    roles: Vec<String>,
    active: bool,
}

impl Identity {
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>, roles: Vec<String>, active: bool) -> Self {
        Self {
            id,
            name: name.into(),
            roles,
            active,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `true` if the identity holds any of `wanted` (case-sensitive).
    #[must_use]
    pub fn has_role(&self, wanted: &[&str]) -> bool {
        has_role(self, wanted)
    }

    /// `Forbidden` unless the identity holds one of `wanted`.
    ///
    /// # Errors
    /// Returns `ApiError::Forbidden` when no role matches.
    pub fn require_role(&self, wanted: &[&str]) -> Result<(), ApiError> {
        if self.has_role(wanted) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            id: claims.id,
            name: claims.username,
            roles: claims.roles,
            active: claims.status,
        }
    }
}

/// Role-set intersection: OR across `wanted`, exact string match.
#[must_use]
pub fn has_role(identity: &Identity, wanted: &[&str]) -> bool {
    identity
        .roles
        .iter()
        .any(|role| wanted.iter().any(|wanted| role == wanted))
}

/// Identity bound to this request by the bearer middleware, if any.
#[must_use]
pub fn current_identity(extensions: &Extensions) -> Option<&Identity> {
    extensions.get::<Identity>()
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_identity(&parts.extensions)
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn identity(roles: &[&str]) -> Identity {
        Identity::new(
            Uuid::nil(),
            "Alice Liddell",
            roles.iter().map(ToString::to_string).collect(),
            true,
        )
    }

    #[test]
    fn has_role_is_or_across_wanted() {
        let alice = identity(&["owner"]);
        assert!(alice.has_role(&["owner"]));
        assert!(alice.has_role(&["admin", "owner"]));
        assert!(!alice.has_role(&["admin"]));
    }

    #[test]
    fn has_role_is_case_sensitive() {
        let alice = identity(&["admin"]);
        assert!(!alice.has_role(&["Admin"]));
        assert!(!alice.has_role(&["ADMIN"]));
    }

    #[test]
    fn empty_sets_never_match() {
        assert!(!identity(&[]).has_role(&["admin"]));
        assert!(!identity(&["admin"]).has_role(&[]));
        assert!(!identity(&[]).has_role(&[]));
    }

    #[test]
    fn require_role_maps_to_forbidden() {
        let nurse = identity(&["nurse"]);
        assert!(matches!(
            nurse.require_role(&[ROLE_ADMIN, ROLE_OWNER]),
            Err(ApiError::Forbidden)
        ));
        assert!(identity(&["owner"]).require_role(&[ROLE_OWNER]).is_ok());
    }

    #[test]
    fn claims_convert_into_identity() {
        let claims = IdentityClaims {
            id: Uuid::nil(),
            username: "Bob Stone".to_string(),
            roles: vec!["admin".to_string(), "nurse".to_string()],
            status: false,
        };
        let identity = Identity::from(claims);
        assert_eq!(identity.name(), "Bob Stone");
        assert_eq!(identity.roles(), ["admin".to_string(), "nurse".to_string()]);
        assert!(!identity.is_active());
    }

    #[tokio::test]
    async fn extractor_requires_bound_identity() {
        let (mut parts, ()) = Request::new(()).into_parts();
        let missing = Identity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(missing, Err(ApiError::Unauthorized)));

        parts.extensions.insert(identity(&["owner"]));
        let found = Identity::from_request_parts(&mut parts, &()).await;
        assert!(found.is_ok_and(|found| found.has_role(&[ROLE_OWNER])));
    }
}
