//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/signup` - Email/password registration
/// - `POST /auth/login` - Exchange credentials for a session token
/// - `GET /auth/verify-email` - Consume a verification link
/// - `POST /auth/logout` - Revoke the presented token
/// - `GET|PATCH /api/profile` - Read or update the caller's profile
/// - `GET /login/google` - Start Google OAuth
/// - `GET /health` - Liveness probe
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/verify-email", get(handlers::verify_email))
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/api/profile",
            get(handlers::profile).patch(handlers::update_profile),
        )
        .route("/login/google", get(handlers::google_login))
        .route("/health", get(handlers::health))
}
