//! Mail the edition as a PDF attachment.

use crate::config::MailSettings;
use crate::error::DeliveryError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{info, instrument};

fn mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|source| DeliveryError::Address {
        address: address.to_string(),
        source,
    })
}

/// Message from the account to the recipient, subject = file name.
pub fn build_message(
    settings: &MailSettings,
    filename: &str,
    pdf: Vec<u8>,
) -> Result<Message, DeliveryError> {
    let content_type = ContentType::parse("application/pdf")
        .map_err(|e| DeliveryError::Message(e.to_string()))?;
    let attachment = Attachment::new(filename.to_string()).body(pdf, content_type);

    Message::builder()
        .from(mailbox(&settings.account)?)
        .to(mailbox(&settings.recipient)?)
        .subject(filename)
        .multipart(MultiPart::mixed().singlepart(attachment))
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

/// Log in over implicit TLS and send the document. No retries.
#[instrument(level = "info", skip(settings), fields(host = %settings.smtp_host, to = %settings.recipient))]
pub async fn send(settings: &MailSettings, document: &Path) -> Result<(), DeliveryError> {
    info!("Generating email");
    let pdf = tokio::fs::read(document)
        .await
        .map_err(|source| DeliveryError::Attachment {
            path: document.display().to_string(),
            source,
        })?;
    let filename = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let message = build_message(settings, &filename, pdf)?;

    info!("Opening secure connection");
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
        .port(settings.smtp_port)
        .credentials(Credentials::new(
            settings.account.clone(),
            settings.password.clone(),
        ))
        .build();

    info!("Sending email");
    mailer.send(message).await?;
    info!(%filename, "Email sent");
    Ok(())
}
