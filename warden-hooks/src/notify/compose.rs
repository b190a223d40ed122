use std::fmt::Write as _;

use super::{NotificationMessage, Timestamp};
use crate::config::PolicyConfig;
use crate::hooks::{CheckoutKind, HookKind};
use crate::vcs::RepositoryState;

/// Prefix of every subject line.
pub const SUBJECT_PREFIX: &str = "Config Warden:";

/// Files whose name ends with this suffix configure running services.
pub const PROC_FILE_SUFFIX: &str = "Proc.conf";

const THIN_RULE: &str = "--------------------------------------------------------------------------------";
const THICK_RULE: &str = "================================================================================";

/// What a notification is about, with the data only that event carries.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A completed checkout between two raw refs.
    Checkout {
        previous: &'a str,
        new: &'a str,
        kind: CheckoutKind,
    },
    /// A completed commit.
    Commit,
    /// A commit stopped by the policy.
    Rejection {
        /// The message the user saw.
        shown: &'a str,
        policy: &'a PolicyConfig,
    },
    /// A hook that failed internally.
    Failure { hook: HookKind, detail: &'a str },
}

/// Builds notifications for one repository at one point in time.
#[derive(Debug, Clone)]
pub struct Composer {
    repository: String,
    timestamp: Timestamp,
}

impl Composer {
    pub fn new(repository: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            repository: repository.into(),
            timestamp,
        }
    }

    /// Compose the notification for `event` from `state`.
    ///
    /// Only fields collected into `state` are used; nothing is queried again.
    pub fn compose(&self, event: Event<'_>, state: &RepositoryState) -> NotificationMessage {
        let (subject, body) = match event {
            Event::Checkout { previous, new, kind } => self.checkout(state, previous, new, kind),
            Event::Commit => self.commit(state),
            Event::Rejection { shown, policy } => self.rejection(state, shown, policy),
            Event::Failure { hook, detail } => self.failure(hook, detail),
        };
        NotificationMessage {
            subject,
            body,
            timestamp: self.timestamp.clone(),
        }
    }

    fn checkout(&self, state: &RepositoryState, previous: &str, new: &str, kind: CheckoutKind) -> (String, String) {
        let repo = &self.repository;
        let (author, user) = (&state.author, &state.user);
        let previous = state.display_name(previous);
        let new = state.display_name(new);

        let subject = match kind {
            CheckoutKind::Branch => {
                format!("{SUBJECT_PREFIX} Author '{author}' has changed branch from '{previous}' to '{new}' in {repo}")
            }
            CheckoutKind::File => format!("{SUBJECT_PREFIX} Author '{author}' has checked out files at '{new}' in {repo}"),
        };

        let mut body = format!(
            "User '{user}' (author '{author}') has performed a {} checkout in '{repo}' from '{previous}' to '{new}' at {}.\n\n",
            kind.describe(),
            self.timestamp
        );
        body.push_str(&proc_file_reminder(&state.changed_files));
        body.push_str("Changed files:\n");
        body.push_str(THIN_RULE);
        body.push('\n');
        if state.changed_files.is_empty() {
            body.push_str("(none)\n");
        }
        for file in &state.changed_files {
            let _ = writeln!(body, "{file}");
        }
        body.push('\n');
        let _ = write!(body, "Current status:\n{THIN_RULE}\n{}\n", state.status);
        (subject, body)
    }

    fn commit(&self, state: &RepositoryState) -> (String, String) {
        let repo = &self.repository;
        let subject = format!("{SUBJECT_PREFIX} Author '{}' has committed files to {repo}", state.author);
        let body = format!(
            "User '{user}' has committed code as author '{author}' to active branch '{branch}' of '{repo}' on {now}.\n\n\
             {reminder}\
             Commit info:\n{THIN_RULE}\n{log}\n{THICK_RULE}\n\n\
             Current status:\n{THIN_RULE}\n{status}\n{THICK_RULE}\n\n\
             Changes in the latest commit:\n{THIN_RULE}\n{diff}\n{THICK_RULE}",
            user = state.user,
            author = state.author,
            branch = state.branch,
            now = self.timestamp,
            reminder = proc_file_reminder(&state.changed_files),
            log = state.log,
            status = state.status,
            diff = state.diff,
        );
        (subject, body)
    }

    fn rejection(&self, state: &RepositoryState, shown: &str, policy: &PolicyConfig) -> (String, String) {
        let repo = &self.repository;
        let subject = format!(
            "{SUBJECT_PREFIX} User '{}' has attempted to commit files to {repo}",
            state.user
        );
        let body = format!(
            "User '{user}' attempted to commit code as author '{author}' to active branch '{branch}' of '{repo}' on {now}. \
             They were prevented from doing so, and shown the following error message:\n\
             {THICK_RULE}\n{shown}\n{THICK_RULE}\n\n\
             Policy configuration in effect:\n{policy}\n\n\
             Reminder: to make changes to the above values, you need to edit the git config!\n\
             See \"$ git config --local --list | grep '^warden\\.'\" for more details.",
            user = state.user,
            author = state.author,
            branch = state.branch,
            now = self.timestamp,
        );
        (subject, body)
    }

    fn failure(&self, hook: HookKind, detail: &str) -> (String, String) {
        let subject = format!("{SUBJECT_PREFIX} error in commit hook {hook}");
        let body = format!(
            "{hook} failed in '{repo}' at {now} with the following error:\n\n{detail}\n\n\
             The {operation} itself {effect}.",
            repo = self.repository,
            now = self.timestamp,
            operation = hook.operation(),
            effect = if hook.can_block() {
                "was aborted"
            } else {
                "had already completed and is not affected"
            },
        );
        (subject, body)
    }
}

/// The reminder shown when service configuration changed, or an empty string.
///
/// A file counts if its name ends with [`PROC_FILE_SUFFIX`], compared case-sensitively.
pub fn proc_file_reminder(changed_files: &[String]) -> String {
    let proc_files: Vec<&str> = changed_files
        .iter()
        .map(String::as_str)
        .filter(|file| file.ends_with(PROC_FILE_SUFFIX))
        .collect();
    if proc_files.is_empty() {
        return String::new();
    }
    let mut reminder = String::from("The following service configuration files have changed:\n");
    for file in proc_files {
        let _ = writeln!(reminder, "  * {file}");
    }
    reminder.push_str("Consider restarting the affected services so that they pick up the changes.\n\n");
    reminder
}
