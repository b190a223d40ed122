use lettre::message::header::ContentType;
use lettre::{Message, SmtpTransport, Transport};

use super::NotificationMessage;
use crate::config::MailSettings;
use crate::TransportError;

/// Delivers a notification to its recipients.
///
/// Implementations make exactly one attempt and must return within the timeout
/// configured in [`MailSettings`].
pub trait Relay {
    fn deliver(&self, settings: &MailSettings, message: &NotificationMessage) -> Result<(), TransportError>;
}

/// Delivery through an SMTP relay without authentication or TLS, as found on internal networks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpRelay;

impl SmtpRelay {
    pub fn new() -> Self {
        SmtpRelay
    }

    /// Assemble the mail message for `message`.
    pub fn build_message(settings: &MailSettings, message: &NotificationMessage) -> Result<Message, TransportError> {
        let mut builder = Message::builder()
            .from(settings.from.clone())
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = &settings.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }
        for recipient in &settings.recipients {
            builder = builder.to(recipient.clone());
        }
        Ok(builder.body(message.body.clone())?)
    }
}

impl Relay for SmtpRelay {
    fn deliver(&self, settings: &MailSettings, message: &NotificationMessage) -> Result<(), TransportError> {
        let mail = Self::build_message(settings, message)?;
        let transport = SmtpTransport::builder_dangerous(settings.host.as_str())
            .port(settings.port)
            .timeout(Some(settings.timeout))
            .build();
        transport
            .send(&mail)
            .map(|_response| ())
            .map_err(|source| TransportError::Relay {
                host: settings.host.clone(),
                port: settings.port,
                source,
            })
    }
}
