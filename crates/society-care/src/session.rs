use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Opaque uid issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role stored on the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Tenant,
    Staff,
    Manager,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TENANT" => Some(Self::Tenant),
            "STAFF" => Some(Self::Staff),
            "MANAGER" => Some(Self::Manager),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tenant => "TENANT",
            Self::Staff => "STAFF",
            Self::Manager => "MANAGER",
        }
    }
}

/// The signed-in caller. Passed explicitly into every user-scoped repository call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: UserId,
    pub role: UserRole,
}

impl AuthSession {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    pub fn is_staff(&self) -> bool {
        self.role == UserRole::Staff
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRejection {
    MissingUser,
    InvalidRole(String),
}

impl fmt::Display for SessionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRejection::MissingUser => write!(f, "missing {USER_ID_HEADER} header"),
            SessionRejection::InvalidRole(raw) => write!(f, "unknown user role '{raw}'"),
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SessionRejection::MissingUser)?;

        let role = match parts.headers.get(USER_ROLE_HEADER) {
            None => UserRole::Tenant,
            Some(value) => {
                let raw = value.to_str().unwrap_or_default();
                UserRole::parse(raw).ok_or_else(|| SessionRejection::InvalidRole(raw.to_string()))?
            }
        };

        Ok(AuthSession::new(user_id, role))
    }
}
