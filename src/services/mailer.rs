// src/services/mailer.rs
//! Outbound mail composition and the delivery seam.
//!
//! Delivery itself is an external collaborator. `LogMailer` is the default sink: it
//! records what would be sent through the configured SMTP relay.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::common::config::SmtpConfig;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
}

/// Email asking a new user to confirm their address
pub fn verification_email(recipient: &str, link: &str, ttl_minutes: i64) -> OutboundMail {
    let html_body = format!(
        r#"<p>Thank you for signing up!</p>
<p>Please click the link below to verify your email. This link will expire in {} minutes:</p>
<a href="{}">Verify Email</a>"#,
        ttl_minutes, link
    );

    OutboundMail {
        to: recipient.to_string(),
        subject: "Verify Your Email".to_string(),
        html_body,
    }
}

/// Log-only delivery. The SMTP password is loaded and held by `AppConfig` for a real
/// relay client; this sink only needs the sender and relay address.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
    relay: String,
}

impl LogMailer {
    pub fn new(smtp: &SmtpConfig) -> Self {
        Self {
            from: smtp.username.clone(),
            relay: format!("{}:{}", smtp.server, smtp.port),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        if mail.to.trim().is_empty() {
            return Err(MailError::Delivery("message has no recipient".to_string()));
        }
        info!(
            to = %safe_email_log(&mail.to),
            from = %safe_email_log(&self.from),
            relay = %self.relay,
            subject = %mail.subject,
            body_len = mail.html_body.len(),
            "Outbound mail handed to log sink"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::Secret;

    #[test]
    fn test_verification_email_content() {
        let mail = verification_email(
            "a@x.com",
            "http://localhost:3000/profile/overview?token=abc",
            3,
        );

        assert_eq!(mail.to, "a@x.com");
        assert_eq!(mail.subject, "Verify Your Email");
        assert!(mail
            .html_body
            .contains(r#"<a href="http://localhost:3000/profile/overview?token=abc">"#));
        assert!(mail.html_body.contains("expire in 3 minutes"));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_mail() {
        let mailer = LogMailer::new(&SmtpConfig {
            server: "smtp.example.com".to_string(),
            port: 465,
            username: "noreply@example.com".to_string(),
            password: Secret::new("pw"),
        });

        let result = mailer
            .send(verification_email("a@x.com", "http://localhost/verify", 3))
            .await;
        assert!(result.is_ok());

        let mut blank = verification_email("a@x.com", "http://localhost/verify", 3);
        blank.to = "  ".to_string();
        let err = mailer.send(blank).await.unwrap_err();
        assert!(matches!(err, MailError::Delivery(_)));
    }
}
