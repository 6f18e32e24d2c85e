//! Email relay using lettre

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::{Config, MailSecurity};

/// A composed contact message ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Validated sender address from the form
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("no recipients configured")]
    NoRecipients,
}

/// Delivers composed messages to the configured recipients.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Email service relaying through an SMTP server
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpMailer {
    /// Create a new email service from configuration
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let mail = &config.mail;

        let from = Mailbox::new(Some(config.from_name().to_owned()), mail.from.parse()?);
        let to = parse_recipients(&mail.recipients())?;

        let mut builder = match mail.secure {
            MailSecurity::None => SmtpTransport::builder_dangerous(&mail.host),
            MailSecurity::Tls => SmtpTransport::starttls_relay(&mail.host)?,
            MailSecurity::Ssl => SmtpTransport::relay(&mail.host)?,
        };

        builder = builder
            .port(mail.port)
            .timeout(Some(Duration::from_secs(mail.timeout_secs)));

        if mail.auth {
            builder = builder.credentials(Credentials::new(
                mail.username().to_owned(),
                mail.password.clone(),
            ));
        }

        tracing::info!(
            smtp_host = %mail.host,
            smtp_port = mail.port,
            secure = ?mail.secure,
            auth = mail.auth,
            from = %from,
            recipients = to.len(),
            "Email service initialized"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    /// Opens a session with the relay and closes it again.
    pub async fn test_connection(&self) -> Result<bool, MailError> {
        let transport = self.transport.clone();

        Ok(tokio::task::spawn_blocking(move || transport.test_connection()).await??)
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .reply_to(email.reply_to.parse()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML);

        for to in &self.to {
            builder = builder.to(to.clone());
        }

        Ok(builder.body(email.html)?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let transport = self.transport.clone();

        tracing::info!(recipients = self.to.len(), "Sending email");

        // SmtpTransport blocks on network I/O
        tokio::task::spawn_blocking(move || transport.send(&message)).await??;

        Ok(())
    }
}

fn parse_recipients(to: &[&str]) -> Result<Vec<Mailbox>, MailError> {
    let recipients = to
        .iter()
        .map(|to| to.parse())
        .collect::<Result<Vec<Mailbox>, _>>()?;

    if recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }

    Ok(recipients)
}
