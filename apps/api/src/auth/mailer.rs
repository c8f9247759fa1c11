use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::document::escape::escape_html;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail transport. Carried in `AppState` as `Arc<dyn Mailer>`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Sends mail through an authenticated SMTP relay (STARTTLS/TLS on the
/// relay's standard port).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, user: &str, password: &str) -> Result<Self> {
        let from: Mailbox = format!("Placify <{user}>")
            .parse()
            .with_context(|| format!("EMAIL_USER '{user}' is not a valid address"))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("Invalid SMTP host '{host}'"))?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        Ok(Self { transport, from })
    }

    fn message(&self, email: OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address '{}'", email.to))?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .context("Failed to build email message")
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to = email.to.clone();
        let message = self.message(email)?;
        self.transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email to {to}"))?;
        info!(to = %to, "Email sent");
        Ok(())
    }
}

/// Writes messages to the tracing log when no SMTP credentials are configured.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: Option<String>) -> Self {
        Self {
            sender: sender.unwrap_or_else(|| "no-reply@placify.local".to_string()),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        warn!(
            from = %self.sender,
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email logged instead of sent"
        );
        tracing::debug!(body = %email.html, "Email body");
        Ok(())
    }
}

pub fn otp_email(to: &str, name: &str, otp: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Password Reset OTP - Placify".to_string(),
        html: format!(
            "<h2>Password Reset Request</h2>\
             <p>Hi {},</p>\
             <p>Use the code below to reset your Placify password. It is valid for 10 minutes.</p>\
             <p style=\"font-size:28px;font-weight:700;letter-spacing:6px;\">{otp}</p>\
             <p>If you did not request a reset, you can ignore this email.</p>",
            escape_html(name)
        ),
    }
}

pub fn password_reset_email(to: &str, name: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Password Reset Successful - Placify".to_string(),
        html: format!(
            "<h2>Password Reset Successful</h2>\
             <p>Hi {},</p>\
             <p>Your Placify password was changed. You can now log in with your new password.</p>",
            escape_html(name)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_email_contains_code_and_escaped_name() {
        let email = otp_email("a@b.c", "<Asha>", "123456");
        assert_eq!(email.subject, "Password Reset OTP - Placify");
        assert!(email.html.contains("123456"));
        assert!(email.html.contains("Hi &lt;Asha&gt;"));
    }

    #[tokio::test]
    async fn test_smtp_message_headers() {
        let mailer = SmtpMailer::new("smtp.example.com", "noreply@example.com", "secret").unwrap();
        let message = mailer
            .message(otp_email("asha@example.com", "Asha", "123456"))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: Placify <noreply@example.com>"));
        assert!(raw.contains("To: asha@example.com"));
        assert!(raw.contains("Subject: Password Reset OTP - Placify"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[tokio::test]
    async fn test_smtp_rejects_bad_addresses() {
        assert!(SmtpMailer::new("smtp.example.com", "not an address", "secret").is_err());

        let mailer = SmtpMailer::new("smtp.example.com", "noreply@example.com", "secret").unwrap();
        let err = mailer
            .send(otp_email("not an address", "Asha", "123456"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid recipient address"));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_mail() {
        let mailer = LogMailer::new(None);
        mailer
            .send(password_reset_email("a@b.c", "Asha"))
            .await
            .unwrap();
    }
}
