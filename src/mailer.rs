use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use time::OffsetDateTime;
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound account mail. `AppState` holds this as a trait object so tests
/// and development mode can swap in a non-sending implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;

    async fn send_welcome(&self, email: &str) -> anyhow::Result<()>;
}

/// Builds the link embedded in reset mail:
/// `<app_url>/reset-password?token=<token>&email=<urlencoded email>`.
pub fn reset_url(app_url: &str, token: &str, email: &str) -> String {
    let encoded_email: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
    format!("{app_url}/reset-password?token={token}&email={encoded_email}")
}

fn reset_body(reset_url: &str, expires_at: OffsetDateTime) -> String {
    let minutes = (expires_at - OffsetDateTime::now_utc()).whole_minutes().max(0);
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2>Reset Your Password</h2>\
         <p>You requested a password reset. Click the link below to reset your password:</p>\
         <p><a href=\"{reset_url}\">Reset Password</a></p>\
         <p>If you didn't request a password reset, you can safely ignore this email.</p>\
         <p>This link will expire in {minutes} minutes.</p>\
         <p>Best regards,<br/>The Boogle Team</p>\
         </div>"
    )
}

fn welcome_body() -> String {
    "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
     <h2>Welcome!</h2>\
     <p>Thank you for creating an account with us. We're excited to have you on board!</p>\
     <p>Best regards,<br/>The Boogle Team</p>\
     </div>"
        .to_string()
}

/// Sends account mail through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    app_url: String,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, app_url: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();
        let from: Mailbox = smtp.from.parse()?;
        Ok(Self {
            transport,
            from,
            app_url: app_url.to_string(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let url = reset_url(&self.app_url, token, email);
        self.send(email, "Reset Your Password", reset_body(&url, expires_at))
            .await?;
        info!(%email, "password reset email sent");
        Ok(())
    }

    async fn send_welcome(&self, email: &str) -> anyhow::Result<()> {
        self.send(email, "Welcome to Boogle!", welcome_body()).await?;
        info!(%email, "welcome email sent");
        Ok(())
    }
}

/// Logs mail instead of dispatching it. Used in development mode and when
/// no SMTP relay is configured.
pub struct LogMailer {
    pub app_url: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(
        &self,
        email: &str,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let url = reset_url(&self.app_url, token, email);
        info!(%email, reset_url = %url, %expires_at, "password reset email (not dispatched)");
        Ok(())
    }

    async fn send_welcome(&self, email: &str) -> anyhow::Result<()> {
        info!(%email, "welcome email (not dispatched)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn reset_url_embeds_token_and_encoded_email() {
        let url = reset_url("https://boogle.chat", "abc123", "user+tag@example.com");
        assert_eq!(
            url,
            "https://boogle.chat/reset-password?token=abc123&email=user%2Btag%40example.com"
        );
    }

    #[test]
    fn reset_body_mentions_link_and_window() {
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        let body = reset_body("https://boogle.chat/reset-password?token=t&email=e", expires);
        assert!(body.contains("https://boogle.chat/reset-password?token=t&email=e"));
        assert!(body.contains("expire in 59 minutes") || body.contains("expire in 60 minutes"));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer {
            app_url: "http://localhost:3000".into(),
        };
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        mailer
            .send_password_reset("user@example.com", "tok", expires)
            .await
            .expect("log mailer should not fail");
        mailer
            .send_welcome("user@example.com")
            .await
            .expect("log mailer should not fail");
    }
}
