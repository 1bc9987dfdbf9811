//! SMTP delivery through an authenticated STARTTLS relay

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::SmtpTransportBuilder;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info};

use super::{report_body, ReportDelivery, ReportMailer};
use crate::config::SmtpSettings;
use crate::error::{ReportError, ReportResult};
use crate::secret::SecureString;

/// MIME type of `.xlsx` attachments
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Sends reports through a configured SMTP relay
///
/// The password stays in a [`SecureString`]. lettre only accepts plain
/// `String` credentials, so a transport holding a copy is built for each
/// send and dropped as soon as the message is delivered. That copy is not
/// zeroed.
#[derive(Debug)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    user: String,
    password: SecureString,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer for the configured relay
    ///
    /// No connection is opened until the first report is sent.
    pub fn new(settings: &SmtpSettings) -> ReportResult<Self> {
        let user = settings
            .user
            .as_deref()
            .ok_or_else(|| ReportError::Config("SMTP_USER is not set".into()))?;
        let password = settings
            .password
            .clone()
            .ok_or_else(|| ReportError::Config("SMTP_PASS is not set".into()))?;

        let sender = parse_mailbox(settings.sender().unwrap_or(user))
            .map_err(|e| ReportError::Config(format!("Invalid sender: {}", e)))?;

        relay_builder(&settings.host)?;

        Ok(Self {
            host: settings.host.clone(),
            port: settings.port,
            user: user.to_string(),
            password,
            sender,
        })
    }

    fn transport(&self) -> ReportResult<SmtpTransport> {
        Ok(relay_builder(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(
                self.user.clone(),
                self.password.as_str().to_string(),
            ))
            .build())
    }
}

fn relay_builder(host: &str) -> ReportResult<SmtpTransportBuilder> {
    SmtpTransport::starttls_relay(host)
        .map_err(|e| ReportError::Config(format!("Invalid SMTP relay '{}': {}", host, e)))
}

impl ReportMailer for SmtpMailer {
    fn send_report(&self, delivery: &ReportDelivery<'_>) -> ReportResult<String> {
        let attachment = std::fs::read(delivery.path).map_err(|e| {
            error!(error = %e, path = %delivery.path.display(), "Failed to read report for email");
            ReportError::Notification(format!(
                "Failed to read {}: {}",
                delivery.path.display(),
                e
            ))
        })?;

        let message = compose_report_message(&self.sender, delivery, attachment)?;

        let response = self.transport()?.send(&message).map_err(|e| {
            error!(error = %e, file = delivery.file_name, "Failed to send email");
            ReportError::Notification(format!("Email send failed: {}", e))
        })?;

        let text = format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        );
        info!(response = %text, file = delivery.file_name, "Email successfully sent");
        Ok(text)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, lettre::address::AddressError> {
    address.trim().parse()
}

/// Build the report email: plain-text body plus the spreadsheet attachment
pub fn compose_report_message(
    sender: &Mailbox,
    delivery: &ReportDelivery<'_>,
    attachment: Vec<u8>,
) -> ReportResult<Message> {
    if delivery.recipients.is_empty() {
        return Err(ReportError::Notification(format!(
            "No recipients for {}",
            delivery.file_name
        )));
    }

    let mut builder = Message::builder()
        .from(sender.clone())
        .subject(delivery.file_name);

    for recipient in delivery.recipients {
        let mailbox = parse_mailbox(recipient).map_err(|e| {
            ReportError::Notification(format!("Invalid recipient '{}': {}", recipient, e))
        })?;
        builder = builder.to(mailbox);
    }

    let content_type = ContentType::parse(XLSX_CONTENT_TYPE)
        .map_err(|e| ReportError::Notification(format!("Invalid content type: {}", e)))?;

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(report_body(delivery.file_name)))
                .singlepart(
                    Attachment::new(delivery.file_name.to_string()).body(attachment, content_type),
                ),
        )
        .map_err(|e| ReportError::Notification(format!("Failed to build email: {}", e)))
}
