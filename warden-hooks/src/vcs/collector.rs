//! Repository facts derived from backend queries.

use super::{Backend, RepositoryState};
use crate::{ResolutionFailure, VcsError};

/// Status text used when the working tree has no pending changes.
pub const CLEAN_STATUS: &str = "<Clean status>";

/// Environment variables consulted, in order, for the local login name.
pub const USER_VARIABLES: &[&str] = &["LOGNAME", "USER", "LNAME", "USERNAME"];

/// Environment variable git uses to pass an explicit commit author.
const AUTHOR_VARIABLE: &str = "GIT_AUTHOR_NAME";

/// Prefixes `git describe --all` puts in front of ref names.
const DESCRIBE_PREFIXES: &[&str] = &["heads/", "tags/", "remotes/"];

/// Collects repository facts through a [`Backend`].
///
/// Every method is a single read-only query; nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct Collector<B> {
    backend: B,
}

impl<B: Backend> Collector<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Absolute path of the repository's working tree.
    pub fn repository_path(&self) -> Result<String, VcsError> {
        self.backend.git(&["rev-parse", "--show-toplevel"])
    }

    /// Name of the checked-out branch.
    pub fn branch(&self) -> Result<String, VcsError> {
        self.backend.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Login name of the user running git.
    pub fn local_user(&self) -> Result<String, VcsError> {
        USER_VARIABLES
            .iter()
            .filter_map(|name| self.backend.var(name))
            .find(|value| !value.is_empty())
            .ok_or(VcsError::UnknownUser {
                variables: USER_VARIABLES,
            })
    }

    /// The commit author: `GIT_AUTHOR_NAME` if set, otherwise `user.name` from git configuration.
    ///
    /// Returns an empty string if neither is available.
    pub fn author(&self) -> Result<String, VcsError> {
        if let Some(author) = self.backend.var(AUTHOR_VARIABLE) {
            return Ok(author);
        }
        match self.backend.git(&["config", "--get", "user.name"]) {
            Ok(name) => Ok(name),
            Err(err) if err.exit_code() == Some(1) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Short working-tree status, or [`CLEAN_STATUS`] if nothing is pending.
    pub fn status(&self) -> Result<String, VcsError> {
        let status = self.backend.git(&["status", "--short"])?;
        Ok(if status.trim().is_empty() {
            CLEAN_STATUS.to_owned()
        } else {
            status
        })
    }

    /// Diff introduced by `HEAD`; the root commit is diffed against the empty tree.
    pub fn diff_since_previous(&self) -> Result<String, VcsError> {
        self.backend.git(&["show", "--format=", "HEAD"])
    }

    /// Log entry of the latest commit.
    pub fn commit_log(&self) -> Result<String, VcsError> {
        self.backend.git(&["log", "--max-count=1", "HEAD"])
    }

    /// Paths changed by `HEAD`, including those of a root commit.
    pub fn changed_files_since_previous(&self) -> Result<Vec<String>, VcsError> {
        let names = self
            .backend
            .git(&["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", "HEAD"])?;
        Ok(file_list(&names))
    }

    /// Paths that differ between two refs.
    pub fn changed_files_between(&self, from: &str, to: &str) -> Result<Vec<String>, VcsError> {
        let names = self.backend.git(&["diff", "--name-only", from, to])?;
        Ok(file_list(&names))
    }

    /// Every path tracked at `reference`.
    pub fn files_at(&self, reference: &str) -> Result<Vec<String>, VcsError> {
        let names = self.backend.git(&["ls-tree", "-r", "--name-only", reference])?;
        Ok(file_list(&names))
    }

    /// Resolve `reference` to the branch or tag pointing exactly at it.
    ///
    /// The caller decides how to degrade on failure.
    pub fn resolve_ref(&self, reference: &str) -> Result<String, ResolutionFailure> {
        let described = self
            .backend
            .git(&["describe", "--all", "--exact-match", reference])
            .map_err(|source| ResolutionFailure {
                reference: reference.to_owned(),
                source,
            })?;
        let name = DESCRIBE_PREFIXES
            .iter()
            .find_map(|prefix| described.strip_prefix(prefix))
            .unwrap_or(&described);
        Ok(name.to_owned())
    }

    /// Author, user and branch; everything `pre-commit` decides on.
    pub fn identity(&self) -> Result<RepositoryState, VcsError> {
        Ok(RepositoryState {
            author: self.author()?,
            user: self.local_user()?,
            branch: self.branch()?,
            ..Default::default()
        })
    }

    /// Everything a commit notification shows.
    pub fn commit(&self) -> Result<RepositoryState, VcsError> {
        Ok(RepositoryState {
            status: self.status()?,
            diff: self.diff_since_previous()?,
            log: self.commit_log()?,
            changed_files: self.changed_files_since_previous()?,
            ..self.identity()?
        })
    }
}

/// True for the all-zero object id git passes where no commit exists, e.g. after a clone.
pub fn is_null_ref(reference: &str) -> bool {
    !reference.is_empty() && reference.bytes().all(|byte| byte == b'0')
}

fn file_list(names: &str) -> Vec<String> {
    names
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
