//! Outreach email delivery.
//!
//! [`Mailer`] abstracts the delivery provider so handlers stay testable;
//! [`SmtpMailer`] is the production implementation over the `lettre`
//! async SMTP transport, and [`MockMailer`] records sends for tests.

use async_trait::async_trait;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Mailer trait
// ---------------------------------------------------------------------------

/// An outreach email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

/// Delivery receipt for a sent email.
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Message id assigned by the provider, used to correlate open
    /// webhooks back to the campaign.
    pub provider_email_id: String,
}

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The provider rejected the send.
    #[error("Send rejected: {0}")]
    Rejected(String),
}

/// Sends outreach emails on behalf of a musician.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<SentEmail, MailerError>;
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@gigseeker.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and sends should fail loudly.
    ///
    /// | Variable        | Required | Default                    |
    /// |-----------------|----------|----------------------------|
    /// | `SMTP_HOST`     | yes      | --                          |
    /// | `SMTP_PORT`     | no       | `587`                      |
    /// | `SMTP_FROM`     | no       | `noreply@gigseeker.local`  |
    /// | `SMTP_USER`     | no       | --                          |
    /// | `SMTP_PASSWORD` | no       | --                          |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Production mailer over async SMTP.
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SentEmail, MailerError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let message = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body_text.clone())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let transport = transport_builder.build();
        let response = transport.send(message).await?;
        if !response.is_positive() {
            return Err(MailerError::Rejected(response.code().to_string()));
        }

        // SMTP responses carry a server message id; fall back to a local
        // one so open tracking still has a key to correlate against.
        let provider_email_id = response
            .message()
            .next()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("local-{}", Uuid::new_v4()));

        tracing::info!(to = %email.to, subject = %email.subject, "Outreach email sent");
        Ok(SentEmail { provider_email_id })
    }
}

// ---------------------------------------------------------------------------
// MockMailer
// ---------------------------------------------------------------------------

/// Test double that records sends in memory.
///
/// Public (not `cfg(test)`) so the api integration tests can inject it
/// through [`crate::state::AppState`].
#[derive(Default)]
pub struct MockMailer {
    sent: std::sync::Mutex<Vec<OutboundEmail>>,
    fail_next: std::sync::atomic::AtomicBool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next send fail with a transport-style error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SentEmail, MailerError> {
        if self.fail_next.swap(false, std::sync::atomic::Ordering::SeqCst) {
            return Err(MailerError::Rejected("mock failure".to_string()));
        }
        self.sent.lock().expect("mailer mutex poisoned").push(email.clone());
        Ok(SentEmail {
            provider_email_id: format!("mock-{}", Uuid::new_v4()),
        })
    }
}
