//! Types for registration and login

use serde::{Deserialize, Serialize};

/// Credentials sent to `/register` and `/login`
///
/// Both fields are optional so invalid payloads can leave them out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPayload {
    /// A payload with both fields set
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }
}

/// Body of a successful `/register`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub user_id: i64,
}

/// User object returned by `/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
}

/// Body of a successful `/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// Bearer token plus the user it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
}

/// A freshly registered and logged-in user
///
/// Each test case builds its own, so no token is shared between cases.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub password: String,
    pub user_id: i64,
    pub user: UserInfo,
    pub session: Session,
}

impl AuthenticatedUser {
    /// The bearer token for this user
    pub fn token(&self) -> &str {
        &self.session.token
    }
}
