//! Email notification to the sales team for new contact messages.
//!
//! Uses SMTP via lettre. Sending happens after the message is stored, so a
//! mail failure is logged and never loses the enquiry.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message as Email, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use kestrel_core::catalog::Message;

use crate::config::SmtpConfig;

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Sends "new enquiry" emails to the configured sales address.
#[derive(Clone)]
pub struct SalesNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    sales_email: String,
    admin_url: String,
}

impl SalesNotifier {
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(config: &SmtpConfig, admin_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            sales_email: config.sales_email.clone(),
            admin_url: admin_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Announce a stored contact message.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn new_message(&self, message: &Message) -> Result<(), NotifyError> {
        let email = Email::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .reply_to(
                message
                    .email
                    .as_str()
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(message.email.to_string()))?,
            )
            .to(self
                .sales_email
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(self.sales_email.clone()))?)
            .subject(subject_line(message))
            .header(ContentType::TEXT_PLAIN)
            .body(body_text(message, &self.admin_url))?;

        self.mailer.send(email).await?;

        tracing::info!(message_id = %message.id, "sales notification sent");
        Ok(())
    }
}

fn subject_line(message: &Message) -> String {
    format!("[{}] {}", message.kind.label(), message.subject)
}

fn body_text(message: &Message, admin_url: &str) -> String {
    format!(
        "New {kind} from {name} <{email}>\nPhone: {phone}\n\n{body}\n\nView in the CMS: {admin_url}/messages/{id}\n",
        kind = message.kind.label().to_lowercase(),
        name = message.name,
        email = message.email,
        phone = message.phone.as_deref().unwrap_or("-"),
        body = message.message,
        id = message.id,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kestrel_core::{Email as Address, MessageId, MessageKind};

    fn message() -> Message {
        Message {
            id: MessageId::new(42),
            name: "Priya Raman".to_string(),
            email: Address::parse("priya@gridco.com").unwrap(),
            phone: None,
            kind: MessageKind::Quote,
            subject: "12 kV RMU pricing".to_string(),
            message: "Please quote 6 units.".to_string(),
            is_read: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_subject_includes_kind() {
        assert_eq!(subject_line(&message()), "[Request a quote] 12 kV RMU pricing");
    }

    #[test]
    fn test_body_links_to_cms() {
        let body = body_text(&message(), "https://admin.kestrel-switchgear.com");
        assert!(body.contains("Priya Raman <priya@gridco.com>"));
        assert!(body.contains("Phone: -"));
        assert!(body.contains("https://admin.kestrel-switchgear.com/messages/42"));
    }
}
