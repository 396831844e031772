//! Request/response types for the sessions API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: String,
    /// Optional join password; stored hashed.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSessionRequest {
    pub title: String,
    pub description: String,
    /// Replaces the join password when non-empty.
    pub password: Option<String>,
    /// Only an explicit `false` deactivates the session.
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionFilter {
    /// Only sessions owned by this user.
    pub owner: Option<Uuid>,
    /// Only active (`true`) or inactive (`false`) sessions.
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub has_password: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: String,
}
