//! Composing and delivering notifications.
//!
//! The [`Composer`] turns a repository snapshot into a [`NotificationMessage`]; the
//! [`Dispatcher`] delivers it once through a [`Relay`], or prints it in debug mode.
//! Delivery never fails loudly: problems are reported on the error stream and the
//! hook carries on.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

mod compose;
mod dispatch;
mod relay;

pub use compose::{proc_file_reminder, Composer, Event, PROC_FILE_SUFFIX, SUBJECT_PREFIX};
pub use dispatch::{Delivery, Dispatcher};
pub use relay::{Relay, SmtpRelay};

/// A composed notification.
///
/// Recipients are not part of the message; they come from [`MailSettings`](crate::config::MailSettings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub timestamp: Timestamp,
}

/// A human-readable point in time in a fixed timezone, like `2024-05-02 14:07 EDT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    const FORMAT: &'static str = "%Y-%m-%d %H:%M %Z";

    /// The current time in `zone`.
    pub fn now(zone: Tz) -> Self {
        Self::at(Utc::now(), zone)
    }

    pub fn at(instant: DateTime<Utc>, zone: Tz) -> Self {
        Timestamp(instant.with_timezone(&zone).format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_use_the_configured_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 7, 1, 18, 30, 0).unwrap();
        assert_eq!(
            Timestamp::at(instant, chrono_tz::US::Eastern).as_str(),
            "2024-07-01 14:30 EDT"
        );
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap();
        assert_eq!(Timestamp::at(winter, chrono_tz::US::Eastern).to_string(), "2024-01-15 13:30 EST");
    }
}
