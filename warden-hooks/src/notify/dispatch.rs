use std::error::Error as _;
use std::io::Write;

use super::{NotificationMessage, Relay};
use crate::config::MailSettings;
use crate::hooks::Console;
use crate::TransportError;

const SEPARATOR: &str = "++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++";
const RULE: &str = "================================================================================";

/// Outcome of a single dispatch.
#[derive(Debug)]
pub enum Delivery {
    /// The relay accepted the message.
    Sent,
    /// Debug mode: the message was printed and nothing was sent.
    Printed,
    /// The relay could not be used; a diagnostic was printed instead.
    Failed(TransportError),
}

impl Delivery {
    pub fn is_failed(&self) -> bool {
        matches!(self, Delivery::Failed(_))
    }
}

/// Sends notifications, at most once each, and never propagates a failure.
#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    settings: &'a MailSettings,
    debug: bool,
    relay: &'a dyn Relay,
}

impl<'a> Dispatcher<'a> {
    pub fn new(settings: &'a MailSettings, debug: bool, relay: &'a dyn Relay) -> Self {
        Self { settings, debug, relay }
    }

    /// Deliver `message`, or print it in debug mode.
    ///
    /// In debug mode the relay is never touched. A failed delivery is written to the
    /// error stream together with the message, so a human can pass it on by hand.
    pub fn dispatch(&self, message: &NotificationMessage, console: &mut Console<'_>) -> Delivery {
        if self.debug {
            let _ = writeln!(
                console.out,
                "\nThe following email would have been sent if debug mode were off:\n{SEPARATOR}\n{}\n{SEPARATOR}",
                self.render(message)
            );
            return Delivery::Printed;
        }

        match self.relay.deliver(self.settings, message) {
            Ok(()) => {
                tracing::debug!(subject = %message.subject, "notification sent");
                Delivery::Sent
            }
            Err(err) => {
                let to = self.settings.recipient_list();
                tracing::warn!(error = %err, %to, "notification could not be delivered");
                let _ = writeln!(
                    console.err,
                    "Failed to send email to '{to}'. Please manually send an email to '{to}' to let them know \
                     that this is broken. Include the following information:\n{RULE}\n{}\n{RULE}\n{}\n{RULE}",
                    error_chain(&err),
                    self.render(message)
                );
                Delivery::Failed(err)
            }
        }
    }

    fn render(&self, message: &NotificationMessage) -> String {
        let mut text = format!("To: {}\nFrom: {}\n", self.settings.recipient_list(), self.settings.from);
        if let Some(reply_to) = &self.settings.reply_to {
            text.push_str(&format!("Reply-To: {reply_to}\n"));
        }
        text.push_str(&format!("Subject: {}\nDate: {}\n\n{}", message.subject, message.timestamp, message.body));
        text
    }
}

fn error_chain(err: &TransportError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    text
}
