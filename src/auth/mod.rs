//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password signup and login with bcrypt hashing
//! - JWT session and email-verification tokens
//! - Token revocation through the blacklist
//! - Session guard and bearer-token extractors for protected routes

pub mod error;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod store;
pub mod tokens;
pub mod validators;


pub use routes::auth_routes;
pub use store::{CredentialStore, SqliteCredentialStore};
