//! Mail relay and address configuration.

use std::time::Duration;

use lettre::message::Mailbox;

use super::{ConfigProvider, FROM, RECIPIENT, REPLY_TO, SMTP_HOST, SMTP_PORT, SMTP_TIMEOUT};
use crate::ConfigError;

/// Where notifications go and how they get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Recipient mailboxes, at least one.
    pub recipients: Vec<Mailbox>,
    pub from: Mailbox,
    pub reply_to: Option<Mailbox>,
    /// Host name of the mail relay
    pub host: String,
    /// Port of the mail relay
    pub port: u16,
    /// Upper bound for a single delivery attempt
    pub timeout: Duration,
}

impl MailSettings {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 25;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Load mail settings, validating every mailbox.
    pub fn load(config: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let recipients = config
            .values(RECIPIENT)?
            .iter()
            .map(|value| parse_mailbox(RECIPIENT, value))
            .collect::<Result<Vec<_>, _>>()?;
        if recipients.is_empty() {
            return Err(ConfigError::Missing { key: RECIPIENT });
        }

        let from = config.value(FROM)?.ok_or(ConfigError::Missing { key: FROM })?;
        let from = parse_mailbox(FROM, &from)?;
        let reply_to = config
            .value(REPLY_TO)?
            .filter(|value| !value.is_empty())
            .map(|value| parse_mailbox(REPLY_TO, &value))
            .transpose()?;

        let host = config
            .value(SMTP_HOST)?
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_owned());
        let port = match config.value(SMTP_PORT)? {
            Some(value) => value.parse::<u16>().map_err(|err| ConfigError::Invalid {
                key: SMTP_PORT,
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => Self::DEFAULT_PORT,
        };
        let timeout = match config.value(SMTP_TIMEOUT)? {
            Some(value) => parse_timeout(&value)?,
            None => Self::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            recipients,
            from,
            reply_to,
            host,
            port,
            timeout,
        })
    }

    /// Recipients joined for display, e.g. in headers or diagnostics.
    pub fn recipient_list(&self) -> String {
        self.recipients
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn parse_mailbox(key: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value.trim().parse::<Mailbox>().map_err(|err| ConfigError::Invalid {
        key,
        value: value.to_owned(),
        reason: err.to_string(),
    })
}

/// Parse a timeout in whole seconds; zero would mean waiting forever and is rejected.
fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: SMTP_TIMEOUT,
            value: value.to_owned(),
            reason: "timeout must be at least one second".into(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(ConfigError::Invalid {
            key: SMTP_TIMEOUT,
            value: value.to_owned(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_with_values;

    #[test]
    fn minimal_settings_use_defaults() {
        let config = config_with_values(&[(RECIPIENT, "ops@example.org"), (FROM, "warden@example.org")]);
        let mail = MailSettings::load(&config).unwrap();
        assert_eq!(mail.recipients.len(), 1);
        assert_eq!(mail.reply_to, None);
        assert_eq!(mail.host, "localhost");
        assert_eq!(mail.port, 25);
        assert_eq!(mail.timeout, Duration::from_secs(5));
    }

    #[test]
    fn full_settings() {
        let config = config_with_values(&[
            (RECIPIENT, "ops@example.org"),
            (RECIPIENT, "Night Shift <night@example.org>"),
            (FROM, "Config Warden <warden@example.org>"),
            (REPLY_TO, "sdd@example.org"),
            (SMTP_HOST, "smtp.example.org"),
            (SMTP_PORT, "2525"),
            (SMTP_TIMEOUT, "3"),
        ]);
        let mail = MailSettings::load(&config).unwrap();
        assert_eq!(mail.recipients.len(), 2);
        let list = mail.recipient_list();
        assert!(list.starts_with("ops@example.org, "), "{list}");
        assert!(list.ends_with("<night@example.org>"), "{list}");
        assert_eq!(mail.reply_to.unwrap().email.to_string(), "sdd@example.org");
        assert_eq!(mail.host, "smtp.example.org");
        assert_eq!(mail.port, 2525);
        assert_eq!(mail.timeout, Duration::from_secs(3));
    }

    #[test]
    fn recipients_are_required() {
        let config = config_with_values(&[(FROM, "warden@example.org")]);
        let err = MailSettings::load(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: RECIPIENT }));
    }

    #[test]
    fn sender_is_required() {
        let config = config_with_values(&[(RECIPIENT, "ops@example.org")]);
        let err = MailSettings::load(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: FROM }));
    }

    #[test]
    fn malformed_mailbox() {
        let config = config_with_values(&[(RECIPIENT, "not an address"), (FROM, "warden@example.org")]);
        let err = MailSettings::load(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: RECIPIENT, .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
        assert_eq!(parse_timeout(" 10 ").unwrap(), Duration::from_secs(10));
    }
}
