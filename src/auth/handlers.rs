//! Authentication handlers

use axum::extract::{Extension, Json, Query};
use axum::response::Redirect;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::AuthError;
use super::extractors::{AuthedUser, StrictBearer};
use super::models::{
    LoginRequest, LoginResponse, ProfileChanges, SignupRequest, UserProfile, VerifyEmailQuery,
};
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /auth/signup
/// Registers an email/password account and mails a verification link
///
/// # Response
/// ```json
/// { "message": "User created successfully. Please check your email to verify your account." }
/// ```
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!(email = %safe_email_log(&payload.email), "Received signup request");

    let user = state.auth_service.signup(payload).await?;
    info!(user_id = %user.id, "Signup completed");

    Ok(Json(json!({
        "message": "User created successfully. Please check your email to verify your account."
    })))
}

/// POST /auth/login
///
/// # Response
/// ```json
/// { "access_token": "<jwt>", "token_type": "bearer", "user": { ... } }
/// ```
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}

/// GET /auth/verify-email?token=...
/// Marks the account verified and sends the browser back to the frontend
pub async fn verify_email(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Redirect, ApiError> {
    match state.auth_service.verify_email(&query.token).await {
        Ok(user) => {
            info!(user_id = %user.id, "Verification link accepted");
            Ok(Redirect::to(&format!(
                "{}/profile/overview",
                state.frontend_url
            )))
        }
        // A token for an account that no longer exists is just a bad link
        Err(AuthError::UserNotFound) => {
            warn!("Verification token names an unknown account");
            Err(ApiError::InvalidToken)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/logout
/// Revokes the presented session token
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    StrictBearer(token): StrictBearer,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth_service.logout(&token).await?;
    info!("User logout successful");
    Ok(Json(json!({ "message": "Logout successful" })))
}

/// GET /api/profile
pub async fn profile(AuthedUser(identity): AuthedUser) -> Json<UserProfile> {
    Json(UserProfile::from(identity))
}

/// PATCH /api/profile
/// Partial update; absent fields keep their stored value
pub async fn update_profile(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(identity): AuthedUser,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .auth_service
        .update_profile(&identity, changes)
        .await?;

    Ok(Json(UserProfile {
        user,
        role: identity.role,
    }))
}

/// GET /login/google - redirect to Google's consent screen
pub async fn google_login(Extension(state): Extension<Arc<AppState>>) -> Redirect {
    let auth_url = state.google_oauth.authorization_url();
    info!("Redirecting to Google OAuth");
    Redirect::to(&auth_url)
}

pub async fn health() -> &'static str {
    "ok"
}
