//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub is_active: bool,
    pub is_google_user: bool,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Row to insert on signup. `email` is already normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    pub hashed_password: Option<String>,
    pub is_google_user: bool,
}

/// Partial profile update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub profile_image: Option<String>,
}

/// Revoked token record
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub token: String,
    pub user_id: Option<String>,
    pub reason: Option<String>,
    pub revoked_at: String,
    /// Unix seconds at which the revoked token would have expired on its own
    pub expires_at: i64,
}

/// Authorization tier attached to an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Superadmin,
}

impl Role {
    pub fn for_email(email: &str, admin_emails: &HashSet<String>) -> Self {
        if admin_emails.contains(&email.to_lowercase()) {
            Role::Superadmin
        } else {
            Role::Member
        }
    }
}

/// A user resolved from a valid session token
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub role: Role,
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Minimal user info returned alongside a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserSummary,
}

/// Profile returned to the authenticated caller
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub role: Role,
}

impl From<Identity> for UserProfile {
    fn from(identity: Identity) -> Self {
        Self {
            user: identity.user,
            role: identity.role,
        }
    }
}
