//! Error taxonomy for hook invocations.
//!
//! Each layer has its own error type. Only [`HookError`] reaches the top-level
//! boundary of an entry point; ref-resolution failures and transport failures are
//! handled where they occur and never travel further.

use std::path::PathBuf;

/// Stable high-level error classification for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required configuration is missing or malformed
    Config,
    /// A query against the git backend failed
    Vcs,
    /// The mail relay could not be reached or refused the message
    Transport,
    /// Anything else, including panics inside a hook body
    Internal,
}

/// A git configuration value is missing, malformed, or could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required configuration '{key}' is not set")]
    Missing { key: &'static str },
    #[error("invalid value '{value}' for '{key}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("could not read configuration '{key}'")]
    Query {
        key: String,
        #[source]
        source: VcsError,
    },
}

/// A query against the git backend failed.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("could not run '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' failed with exit code {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("'{command}' produced output that is not valid UTF-8")]
    Utf8 {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("could not determine the local user: none of {variables:?} is set")]
    UnknownUser { variables: &'static [&'static str] },
}

impl VcsError {
    /// The exit code of the failed git command, if it ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            VcsError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

/// A ref could not be turned into a branch or tag name.
///
/// Callers fall back to the raw ref; this never aborts a hook.
#[derive(Debug, thiserror::Error)]
#[error("could not resolve '{reference}' to a branch or tag name")]
pub struct ResolutionFailure {
    pub reference: String,
    #[source]
    pub source: VcsError,
}

/// Delivery of a notification through the mail relay failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not assemble the mail message")]
    Message(#[from] lettre::error::Error),
    #[error("mail relay {host}:{port} did not accept the message")]
    Relay {
        host: String,
        port: u16,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// Errors that may reach the top-level boundary of a hook.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error("internal hook failure: {message}")]
    Internal { message: String },
}

impl HookError {
    /// Fast classification helper returning a stable error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HookError::Config(_) => ErrorKind::Config,
            HookError::Vcs(_) => ErrorKind::Vcs,
            HookError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        HookError::Internal {
            message: message.into(),
        }
    }
}

/// Installing the hook scripts failed.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("could not locate the hooks directory")]
    Locate(#[from] VcsError),
    #[error("refusing to overwrite existing hook '{}' (use --force)", path.display())]
    Exists { path: PathBuf },
    #[error("could not write hook '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_error_classification() {
        let config: HookError = ConfigError::Missing { key: "warden.from" }.into();
        assert_eq!(config.kind(), ErrorKind::Config);

        let vcs: HookError = VcsError::Failed {
            command: "git rev-parse --abbrev-ref HEAD".into(),
            code: Some(128),
            stderr: "fatal: not a git repository".into(),
        }
        .into();
        assert_eq!(vcs.kind(), ErrorKind::Vcs);

        assert_eq!(HookError::internal("boom").kind(), ErrorKind::Internal);
    }

    #[test]
    fn transparent_variants_keep_the_inner_message() {
        let err: HookError = ConfigError::Missing {
            key: "warden.releasebranch",
        }
        .into();
        assert_eq!(err.to_string(), "required configuration 'warden.releasebranch' is not set");
    }

    #[test]
    fn exit_code_only_for_failed_commands() {
        let failed = VcsError::Failed {
            command: "git config --get user.name".into(),
            code: Some(1),
            stderr: String::new(),
        };
        assert_eq!(failed.exit_code(), Some(1));
        assert_eq!(VcsError::UnknownUser { variables: &["USER"] }.exit_code(), None);
    }
}
