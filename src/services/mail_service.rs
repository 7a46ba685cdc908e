use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Message has no recipients")]
    NoRecipients,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub recipients: Vec<String>,
    pub html_body: String,
    pub attachment: Option<MailAttachment>,
}

/// Delivery seam for composed messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &str, mail: OutgoingMail) -> Result<(), MailError>;
}

pub fn build_message(from: &str, mail: OutgoingMail) -> Result<Message, MailError> {
    if mail.recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }

    let mut builder = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .subject(mail.subject);
    for recipient in &mail.recipients {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }

    let html = SinglePart::html(mail.html_body);
    let message = match mail.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| MailError::Build(e.to_string()))?;
            let file = Attachment::new(attachment.filename).body(attachment.data, content_type);
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(file))
        }
        None => builder.singlepart(html),
    };
    message.map_err(|e| MailError::Build(e.to_string()))
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, from: &str, mail: OutgoingMail) -> Result<(), MailError> {
        let subject = mail.subject.clone();
        let recipients = mail.recipients.len();
        let message = build_message(from, mail)?;
        self.transport.send(message).await?;
        tracing::info!(%subject, recipients, "Mail sent");
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, from: &str, mail: OutgoingMail) -> Result<(), MailError> {
        build_message(from, mail.clone())?;
        tracing::info!(
            from,
            subject = %mail.subject,
            to = ?mail.recipients,
            attachment = mail.attachment.as_ref().map(|a| a.filename.as_str()),
            "SMTP not configured, mail logged instead of sent"
        );
        Ok(())
    }
}
