//! The `git` executable as backend.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use super::{command_line, Backend};
use crate::config::ConfigProvider;
use crate::{ConfigError, VcsError};

/// Runs `git` as a child process, optionally inside a given working directory.
///
/// Hooks are started by git with the repository as working directory, so the default
/// instance needs no configuration.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    work_dir: Option<PathBuf>,
}

impl GitCli {
    /// Use the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all queries inside `dir`.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(dir.into()),
        }
    }

    /// The directory queries run in, if one was set.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    fn output(&self, args: &[&str]) -> Result<Output, VcsError> {
        let mut cmd: std::process::Command = gix_command::prepare("git")
            .args(args.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .into();
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        tracing::debug!(command = %command_line(args), "querying backend");
        cmd.output().map_err(|source| VcsError::Spawn {
            command: command_line(args),
            source,
        })
    }

    fn stdout(args: &[&str], output: Output) -> Result<String, VcsError> {
        let mut text = String::from_utf8(output.stdout).map_err(|source| VcsError::Utf8 {
            command: command_line(args),
            source,
        })?;
        text.truncate(text.trim_end().len());
        Ok(text)
    }

    /// Run `git config` with `args`, treating exit code 1 as "not set".
    fn config_query(&self, key: &str, args: &[&str]) -> Result<Option<String>, ConfigError> {
        let output = self.output(args).map_err(|source| ConfigError::Query {
            key: key.to_owned(),
            source,
        })?;
        match output.status.code() {
            Some(0) => Self::stdout(args, output).map(Some).map_err(|source| ConfigError::Query {
                key: key.to_owned(),
                source,
            }),
            Some(1) => Ok(None),
            code => Err(ConfigError::Query {
                key: key.to_owned(),
                source: VcsError::Failed {
                    command: command_line(args),
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                },
            }),
        }
    }
}

impl Backend for GitCli {
    fn git(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(VcsError::Failed {
                command: command_line(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Self::stdout(args, output)
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ConfigProvider for GitCli {
    fn value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.config_query(key, &["config", "--get", key])
    }

    fn values(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .config_query(key, &["config", "--get-all", key])?
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_rendering() {
        assert_eq!(
            command_line(&["rev-parse", "--abbrev-ref", "HEAD"]),
            "git rev-parse --abbrev-ref HEAD"
        );
    }

    #[test]
    fn work_dir_is_optional() {
        assert_eq!(GitCli::new().work_dir(), None);
        assert_eq!(GitCli::at("/srv/config").work_dir(), Some(Path::new("/srv/config")));
    }

    #[test]
    fn queries_outside_a_repository_fail_as_vcs_errors() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::at(dir.path());
        let err = git
            .git(&["--git-dir", &dir.path().join("missing").to_string_lossy(), "rev-parse", "HEAD"])
            .unwrap_err();
        assert!(
            matches!(err, VcsError::Failed { .. } | VcsError::Spawn { .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    #[serial_test::serial]
    fn variables_come_from_the_process_environment() {
        std::env::set_var("GIT_AUTHOR_NAME", "carol");
        let author = crate::vcs::Collector::new(GitCli::new()).author();
        std::env::remove_var("GIT_AUTHOR_NAME");
        assert_eq!(author.unwrap(), "carol");
        assert_eq!(GitCli::new().var("WARDEN_SURELY_UNSET_VARIABLE"), None);
    }
}
