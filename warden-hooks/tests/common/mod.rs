#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use warden_hooks::config::MailSettings;
use warden_hooks::hooks::{self, Console, Exit, HookInvocation};
use warden_hooks::notify::{NotificationMessage, Relay};
use warden_hooks::vcs::ScriptedBackend;
use warden_hooks::TransportError;

/// Keeps every delivered message, or refuses all of them.
#[derive(Default)]
pub struct RecordingRelay {
    pub delivered: RefCell<Vec<NotificationMessage>>,
    pub attempts: Cell<usize>,
    pub fail: bool,
}

impl RecordingRelay {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.delivered.borrow().clone()
    }
}

impl Relay for RecordingRelay {
    fn deliver(&self, _settings: &MailSettings, message: &NotificationMessage) -> Result<(), TransportError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.fail {
            return Err(TransportError::Message(lettre::error::Error::MissingTo));
        }
        self.delivered.borrow_mut().push(message.clone());
        Ok(())
    }
}

/// The `[warden]` section used by most tests, followed by `extra` lines.
pub fn config(extra: &str) -> gix_config::File<'static> {
    let text = format!(
        "[warden]\n\
         \trecipient = ops@example.org\n\
         \tfrom = warden@example.org\n\
         \treleasebranch = release\n\
         \twhitelistuser = alice\n\
         \ttimezone = UTC\n\
         {extra}"
    );
    let text: &'static str = Box::leak(text.into_boxed_str());
    gix_config::File::try_from(text).expect("valid configuration text")
}

/// A backend for a repository at `/srv/config` on `branch`.
pub fn repository(branch: &str) -> ScriptedBackend {
    ScriptedBackend::new()
        .with_output(&["rev-parse", "--show-toplevel"], "/srv/config")
        .with_output(&["rev-parse", "--abbrev-ref", "HEAD"], branch)
}

pub struct Outcome {
    pub exit: Exit,
    pub out: String,
    pub err: String,
}

pub fn run(
    invocation: &HookInvocation,
    backend: &ScriptedBackend,
    config: &gix_config::File<'static>,
    relay: &RecordingRelay,
) -> Outcome {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let exit = {
        let mut console = Console::new(&mut out, &mut err);
        hooks::run(invocation, backend, config, relay, &mut console)
    };
    Outcome {
        exit,
        out: String::from_utf8(out).expect("console output is UTF-8"),
        err: String::from_utf8(err).expect("console output is UTF-8"),
    }
}
