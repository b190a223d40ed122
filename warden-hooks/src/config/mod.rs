//! Configuration read from the repository's git configuration.
//!
//! All keys live in the `warden` section and are re-read on every invocation.
//!
//! # Configuration Keys
//!
//! ## Notification
//! - `warden.debug`: `true` prints notifications instead of sending them
//! - `warden.recipient`: Recipient mailbox, may be given several times
//! - `warden.from`: Sender mailbox
//! - `warden.replyto`: Optional reply-to mailbox
//! - `warden.smtphost`, `warden.smtpport`: Mail relay (default `localhost:25`)
//! - `warden.smtptimeout`: Seconds to wait for the relay (default 5)
//! - `warden.timezone`: Zone used for timestamps (default `US/Eastern`)
//! - `warden.logdir`: Directory receiving the log files (default `/tmp`)
//!
//! ## Policy
//! - `warden.releasebranch`: The primary branch
//! - `warden.whitelistuser`: Users allowed to commit to other branches, may be given several times
//! - `warden.blacklistauthor`: Authors never allowed to commit, may be given several times

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::ConfigError;

pub mod mail;
pub mod policy;

pub use mail::MailSettings;
pub use policy::PolicyConfig;

pub const DEBUG: &str = "warden.debug";
pub const RECIPIENT: &str = "warden.recipient";
pub const FROM: &str = "warden.from";
pub const REPLY_TO: &str = "warden.replyto";
pub const SMTP_HOST: &str = "warden.smtphost";
pub const SMTP_PORT: &str = "warden.smtpport";
pub const SMTP_TIMEOUT: &str = "warden.smtptimeout";
pub const TIMEZONE: &str = "warden.timezone";
pub const LOG_DIR: &str = "warden.logdir";
pub const RELEASE_BRANCH: &str = "warden.releasebranch";
pub const WHITELIST_USER: &str = "warden.whitelistuser";
pub const BLACKLIST_AUTHOR: &str = "warden.blacklistauthor";

const DEFAULT_TIMEZONE: &str = "US/Eastern";
const DEFAULT_LOG_DIR: &str = "/tmp";

/// Read access to configuration values.
pub trait ConfigProvider {
    /// The last value of `key`, if it is set.
    fn value(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// All values of a multi-valued `key`, in order; empty if unset.
    fn values(&self, key: &str) -> Result<Vec<String>, ConfigError>;
}

impl<C: ConfigProvider + ?Sized> ConfigProvider for &C {
    fn value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).value(key)
    }

    fn values(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        (**self).values(key)
    }
}

/// In-memory configuration, as parsed by `gix-config`.
impl ConfigProvider for gix_config::File<'_> {
    fn value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(gix_config::File::string(self, key).map(|value| lossy(&value)))
    }

    fn values(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        Ok(gix_config::File::strings(self, key)
            .unwrap_or_default()
            .iter()
            .map(|value| lossy(value))
            .filter(|value| !value.is_empty())
            .collect())
    }
}

fn lossy(value: &[u8]) -> String {
    String::from_utf8_lossy(value).trim().to_owned()
}

/// Settings needed before any notification can be sent.
///
/// Loading fails if the mail settings are incomplete; a hook then has no way of
/// reporting anything but a bare diagnostic.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Print notifications instead of sending them.
    pub debug: bool,
    pub mail: MailSettings,
    /// Zone of the timestamps in notifications.
    pub timezone: Tz,
    pub log_dir: PathBuf,
}

impl Settings {
    pub fn load(config: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let debug = config.value(DEBUG)?.is_some_and(|value| value == "true");
        let timezone = match config.value(TIMEZONE)? {
            Some(name) => name.parse::<Tz>().map_err(|err| ConfigError::Invalid {
                key: TIMEZONE,
                value: name.clone(),
                reason: err.to_string(),
            })?,
            None => DEFAULT_TIMEZONE.parse::<Tz>().map_err(|err| ConfigError::Invalid {
                key: TIMEZONE,
                value: DEFAULT_TIMEZONE.into(),
                reason: err.to_string(),
            })?,
        };
        Ok(Self {
            debug,
            mail: MailSettings::load(config)?,
            timezone,
            log_dir: log_dir(config),
        })
    }
}

/// The log directory, falling back to the default on any problem.
///
/// Logging is set up before the remaining settings are validated.
pub fn log_dir(config: &dyn ConfigProvider) -> PathBuf {
    config
        .value(LOG_DIR)
        .ok()
        .flatten()
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from)
}
