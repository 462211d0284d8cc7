// src/services/mod.rs
//
// Supporting services used by the auth module and startup

pub mod blacklist;
pub mod google;
pub mod mailer;

// Re-export commonly used types for convenience
pub use google::GoogleOAuth;
pub use mailer::{LogMailer, Mailer};
