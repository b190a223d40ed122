//! Policy configuration parsing from git config.

use std::collections::BTreeSet;
use std::fmt;

use super::{ConfigProvider, BLACKLIST_AUTHOR, RELEASE_BRANCH, WHITELIST_USER};
use crate::ConfigError;

/// The inputs of the commit policy.
///
/// Loaded once per invocation and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    /// The release branch everyone may commit to.
    pub primary_branch: String,
    /// Users who may also commit to any other branch.
    pub whitelisted_users: BTreeSet<String>,
    /// Authors who may never commit.
    pub blacklisted_authors: BTreeSet<String>,
}

impl PolicyConfig {
    /// Load the policy configuration.
    ///
    /// This method parses the following configuration keys:
    /// - `warden.releasebranch`: String, required
    /// - `warden.whitelistuser`: multi-valued, optional
    /// - `warden.blacklistauthor`: multi-valued, optional
    pub fn load(config: &dyn ConfigProvider) -> Result<Self, ConfigError> {
        let primary_branch = config
            .value(RELEASE_BRANCH)?
            .filter(|branch| !branch.is_empty())
            .ok_or(ConfigError::Missing { key: RELEASE_BRANCH })?;
        Ok(Self {
            primary_branch,
            whitelisted_users: config.values(WHITELIST_USER)?.into_iter().collect(),
            blacklisted_authors: config.values(BLACKLIST_AUTHOR)?.into_iter().collect(),
        })
    }

    /// Create a configuration for the given primary branch, with empty lists.
    pub fn new(primary_branch: impl Into<String>) -> Self {
        Self {
            primary_branch: primary_branch.into(),
            ..Default::default()
        }
    }

    pub fn with_whitelisted_user(mut self, user: impl Into<String>) -> Self {
        self.whitelisted_users.insert(user.into());
        self
    }

    pub fn with_blacklisted_author(mut self, author: impl Into<String>) -> Self {
        self.blacklisted_authors.insert(author.into());
        self
    }
}

/// A dump of all values, as shown in rejection notifications.
impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(values: &BTreeSet<String>) -> String {
            if values.is_empty() {
                "(none)".into()
            } else {
                values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            }
        }
        writeln!(f, "  {RELEASE_BRANCH}: {}", self.primary_branch)?;
        writeln!(f, "  {WHITELIST_USER}: {}", list(&self.whitelisted_users))?;
        write!(f, "  {BLACKLIST_AUTHOR}: {}", list(&self.blacklisted_authors))
    }
}
