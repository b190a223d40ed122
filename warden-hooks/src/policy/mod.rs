//! The commit policy.
//!
//! Exactly two rules, evaluated in order (first match wins):
//! 1. the author must be known and must not be blacklisted,
//! 2. commits to any branch but the primary one require a whitelisted user.
//!
//! Everything else is accepted.

use crate::config::PolicyConfig;

/// Why a commit was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    /// The author is empty.
    UnknownAuthor,
    /// The author is on the blacklist.
    BlacklistedAuthor,
    /// A user not on the whitelist tried to commit to a non-primary branch.
    UnprivilegedBranch,
}

/// A rejected commit together with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: ReasonCode,
    /// Human-readable explanation including what to do about it.
    pub reason: String,
}

/// Decision result from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Accepted,
    Rejected(Rejection),
}

impl PolicyDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PolicyDecision::Accepted)
    }

    /// The rejection, if the commit was rejected.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            PolicyDecision::Accepted => None,
            PolicyDecision::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Decide whether `user` may commit as `author` to `branch`.
///
/// The author check runs first and short-circuits the branch check.
pub fn evaluate(author: &str, user: &str, branch: &str, config: &PolicyConfig) -> PolicyDecision {
    if author.is_empty() || config.blacklisted_authors.contains(author) {
        let (code, description) = if author.is_empty() {
            (ReasonCode::UnknownAuthor, "an unknown author (blank GIT_AUTHOR_NAME)".to_owned())
        } else {
            (ReasonCode::BlacklistedAuthor, format!("blacklisted author '{author}'"))
        };
        return PolicyDecision::Rejected(Rejection {
            code,
            reason: format!(
                "Commits are not allowed to be authored by {description}! You must either:\n  \
                 * Commit again under your own personal user account\n  \
                 * Commit again using --author=<your_name>"
            ),
        });
    }

    if branch != config.primary_branch && !config.whitelisted_users.contains(user) {
        let primary = &config.primary_branch;
        return PolicyDecision::Rejected(Rejection {
            code: ReasonCode::UnprivilegedBranch,
            reason: format!(
                "You are attempting to commit to non-primary branch '{branch}' as user '{user}'.\n\
                 This is not allowed: as an unprivileged user, you may only commit to primary branch '{primary}'.\n\
                 You will need to wait for the operations team to switch back to the primary branch \
                 before you commit your code."
            ),
        });
    }

    PolicyDecision::Accepted
}
