//! Outgoing email over authenticated SMTP submission

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::capability::{CapabilityOutcome, ErrorKind};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("{0}")]
    Transport(String),
    #[error("mail submission timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            sender_email: None,
            sender_password: None,
        }
    }
}

impl SmtpConfig {
    /// Both sender address and secret, or nothing
    pub fn credentials(&self) -> Option<SenderCredentials> {
        match (&self.sender_email, &self.sender_password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SenderCredentials {
                    email: email.clone(),
                    password: password.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct SenderCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail submission seam; swapped for a recording stub in tests
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn submit(
        &self,
        sender: &SenderCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), EmailError>;
}

/// STARTTLS submission through lettre's tokio transport
#[derive(Debug, Clone)]
pub struct SmtpMailTransport {
    host: String,
    port: u16,
}

impl SmtpMailTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn build_message(sender: &SenderCredentials, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let from: Mailbox = sender
            .email
            .parse()
            .map_err(|e| EmailError::Address(format!("{}: {}", sender.email, e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| EmailError::Address(format!("{}: {}", email.to, e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn submit(
        &self,
        sender: &SenderCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), EmailError> {
        let message = Self::build_message(sender, email)?;

        let credentials = Credentials::new(sender.email.clone(), sender.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| EmailError::Transport(format!("Failed to create transport: {}", e)))?
            .port(self.port)
            .credentials(credentials)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// The send-email capability
pub struct EmailCapability {
    credentials: Option<SenderCredentials>,
    transport: Arc<dyn MailTransport>,
    timeout: Duration,
}

impl EmailCapability {
    pub fn new(
        credentials: Option<SenderCredentials>,
        transport: Arc<dyn MailTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            transport,
            timeout,
        }
    }

    pub fn from_config(config: &SmtpConfig, timeout: Duration) -> Self {
        let credentials = config.credentials();
        if credentials.is_none() {
            tracing::warn!("SENDER_EMAIL / SENDER_PASSWORD not set - email capability will refuse to send");
        }
        Self::new(
            credentials,
            Arc::new(SmtpMailTransport::new(config.host.clone(), config.port)),
            timeout,
        )
    }

    /// Send one plain-text message. Every failure is reported as text.
    pub async fn send(&self, content: &str, subject: &str, recipient: &str) -> CapabilityOutcome {
        let Some(sender) = self.credentials.as_ref() else {
            return CapabilityOutcome::failed(
                ErrorKind::ValidationAbsent,
                "❌ Missing sender credentials.",
            );
        };

        let email = OutgoingEmail {
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: content.to_string(),
        };

        let result = match tokio::time::timeout(self.timeout, self.transport.submit(sender, &email)).await {
            Ok(result) => result,
            Err(_) => Err(EmailError::Timeout(self.timeout)),
        };

        match result {
            Err(e @ EmailError::Timeout(_)) => {
                tracing::error!(recipient = %recipient, "Mail submission timed out");
                CapabilityOutcome::failed(
                    ErrorKind::TransportTimeout,
                    format!("❌ Failed to send email: {e}"),
                )
            }
            Ok(()) => {
                tracing::info!(recipient = %recipient, "Email sent successfully");
                CapabilityOutcome::ok(format!(
                    "✅ Email sent successfully to {recipient} with subject '{subject}'."
                ))
            }
            Err(e) => {
                tracing::error!(recipient = %recipient, "Failed to send email: {}", e);
                CapabilityOutcome::failed(
                    ErrorKind::TransportFailure,
                    format!("❌ Failed to send email: {e}"),
                )
            }
        }
    }
}
