//! A backend answering from a fixed script.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{command_line, Backend};
use crate::VcsError;

/// A [`Backend`] that replies to known git invocations with canned output.
///
/// Invocations that were not scripted fail with exit code 128, the way git fails on
/// unknown revisions. Every invocation is recorded and available through [`calls()`](Self::calls).
///
/// # Examples
///
/// ```rust
/// use warden_hooks::vcs::{Backend, ScriptedBackend};
///
/// let backend = ScriptedBackend::new()
///     .with_output(&["rev-parse", "--abbrev-ref", "HEAD"], "release")
///     .with_var("USER", "alice");
///
/// assert_eq!(backend.git(&["rev-parse", "--abbrev-ref", "HEAD"]).unwrap(), "release");
/// assert_eq!(backend.var("USER").as_deref(), Some("alice"));
/// assert!(backend.git(&["status"]).is_err());
/// assert_eq!(backend.calls().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    responses: HashMap<String, Result<String, (i32, String)>>,
    vars: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `git <args>` with `stdout`.
    pub fn with_output(mut self, args: &[&str], stdout: impl Into<String>) -> Self {
        self.responses.insert(command_line(args), Ok(stdout.into()));
        self
    }

    /// Let `git <args>` fail with the given exit code and standard error.
    pub fn with_failure(mut self, args: &[&str], code: i32, stderr: impl Into<String>) -> Self {
        self.responses.insert(command_line(args), Err((code, stderr.into())));
        self
    }

    /// Provide an environment variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// All git invocations seen so far, rendered as command lines.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Backend for ScriptedBackend {
    fn git(&self, args: &[&str]) -> Result<String, VcsError> {
        let command = command_line(args);
        self.calls.borrow_mut().push(command.clone());
        match self.responses.get(&command) {
            Some(Ok(stdout)) => Ok(stdout.trim_end().to_owned()),
            Some(Err((code, stderr))) => Err(VcsError::Failed {
                command,
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            None => Err(VcsError::Failed {
                command,
                code: Some(128),
                stderr: "fatal: invocation was not scripted".into(),
            }),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
