//! Queries against the git backend.
//!
//! The [`Backend`] trait is the only way this crate talks to git. [`GitCli`] spawns the
//! `git` executable; [`ScriptedBackend`] answers from a fixed script and is useful for
//! dry runs and tests.
//!
//! [`Collector`] turns backend answers into the facts a hook needs, and
//! [`RepositoryState`] is the immutable snapshot composed from them.

use crate::VcsError;

mod collector;
mod git;
mod scripted;
mod state;

pub use collector::{is_null_ref, Collector, CLEAN_STATUS, USER_VARIABLES};
pub use git::GitCli;
pub use scripted::ScriptedBackend;
pub use state::RepositoryState;

/// Access to the version-control backend.
pub trait Backend {
    /// Run `git` with `args` and return its standard output without trailing whitespace.
    ///
    /// A non-zero exit status is reported as [`VcsError::Failed`].
    fn git(&self, args: &[&str]) -> Result<String, VcsError>;

    /// Read an environment variable as seen by the hook process.
    fn var(&self, name: &str) -> Option<String>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn git(&self, args: &[&str]) -> Result<String, VcsError> {
        (**self).git(args)
    }

    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Render a git invocation for messages and logs.
pub(crate) fn command_line(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
