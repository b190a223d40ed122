use std::fmt;
use std::str::FromStr;

/// The git hooks this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PreCommit,
    PostCommit,
    PostCheckout,
}

impl HookKind {
    /// The hook's file name in git's hooks directory.
    pub fn name(self) -> &'static str {
        match self {
            HookKind::PreCommit => "pre-commit",
            HookKind::PostCommit => "post-commit",
            HookKind::PostCheckout => "post-checkout",
        }
    }

    /// Only `pre-commit` runs before git has done its work and may stop it.
    pub fn can_block(self) -> bool {
        matches!(self, HookKind::PreCommit)
    }

    /// The version-control operation the hook belongs to.
    pub fn operation(self) -> &'static str {
        match self {
            HookKind::PreCommit | HookKind::PostCommit => "commit",
            HookKind::PostCheckout => "checkout",
        }
    }

    pub const ALL: [HookKind; 3] = [HookKind::PreCommit, HookKind::PostCommit, HookKind::PostCheckout];
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The third argument of `post-checkout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    /// `1`: HEAD moved to another branch or commit.
    Branch,
    /// `0`: files were retrieved from the index.
    File,
}

impl CheckoutKind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            CheckoutKind::Branch => "branch",
            CheckoutKind::File => "file",
        }
    }
}

/// The flag was neither `0` nor `1`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("checkout flag must be 1 (branch checkout) or 0 (file checkout), got '{0}'")]
pub struct InvalidCheckoutFlag(pub String);

impl FromStr for CheckoutKind {
    type Err = InvalidCheckoutFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(CheckoutKind::Branch),
            "0" => Ok(CheckoutKind::File),
            other => Err(InvalidCheckoutFlag(other.to_owned())),
        }
    }
}

/// A hook invocation with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInvocation {
    PreCommit,
    PostCommit,
    PostCheckout {
        /// The ref of the previous HEAD
        previous: String,
        /// The ref of the new HEAD, which may be the same as the previous one
        new: String,
        kind: CheckoutKind,
    },
}

impl HookInvocation {
    pub fn kind(&self) -> HookKind {
        match self {
            HookInvocation::PreCommit => HookKind::PreCommit,
            HookInvocation::PostCommit => HookKind::PostCommit,
            HookInvocation::PostCheckout { .. } => HookKind::PostCheckout,
        }
    }
}
