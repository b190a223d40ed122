//! The hook entry points and their failure boundary.
//!
//! Every hook follows the same sequence:
//! - collect a fresh [`RepositoryState`](crate::vcs::RepositoryState),
//! - `pre-commit` only: evaluate the policy,
//! - compose a notification and dispatch it,
//! - return an [`Exit`] for git.
//!
//! `pre-commit` stays silent when the commit is accepted. The post-* hooks run after git
//! has finished and always notify; they cannot undo anything.
//!
//! Errors from collection, evaluation or composition are caught once per invocation at
//! the boundary in [`Warden::run()`], turned into a best-effort failure notification, and
//! mapped to an exit status: non-zero for `pre-commit`, zero for the post-* hooks.
//!
//! # Examples
//!
//! ```rust
//! use warden_hooks::hooks::{Console, Exit, HookInvocation, Warden};
//! use warden_hooks::notify::{NotificationMessage, Relay};
//! use warden_hooks::vcs::ScriptedBackend;
//! use warden_hooks::{Settings, TransportError};
//!
//! struct NoRelay;
//! impl Relay for NoRelay {
//!     fn deliver(&self, _: &warden_hooks::config::MailSettings, _: &NotificationMessage) -> Result<(), TransportError> {
//!         unreachable!("accepted commits are not announced")
//!     }
//! }
//!
//! let config = gix_config::File::try_from(
//!     "[warden]\n recipient = ops@example.org\n from = warden@example.org\n releasebranch = release\n",
//! )
//! .unwrap();
//! let backend = ScriptedBackend::new()
//!     .with_output(&["rev-parse", "--show-toplevel"], "/srv/config")
//!     .with_output(&["rev-parse", "--abbrev-ref", "HEAD"], "release")
//!     .with_var("GIT_AUTHOR_NAME", "alice")
//!     .with_var("USER", "alice");
//! let settings = Settings::load(&config).unwrap();
//!
//! let (mut out, mut err) = (Vec::new(), Vec::new());
//! let mut console = Console::new(&mut out, &mut err);
//! let exit = Warden::new(&backend, &config, &settings, &NoRelay).run(&HookInvocation::PreCommit, &mut console);
//! assert_eq!(exit, Exit::Success);
//! assert_eq!(exit.code(), 0);
//! ```

use std::io::Write;

use crate::config::{ConfigProvider, Settings};
use crate::notify::{Composer, Dispatcher, Relay, Timestamp};
use crate::vcs::{Backend, Collector};
use crate::{HookError, CHANGES_TARGET};

mod boundary;
pub mod install;
mod invocation;
mod post_checkout;
mod post_commit;
mod pre_commit;

pub use invocation::{CheckoutKind, HookInvocation, HookKind, InvalidCheckoutFlag};

/// Shown instead of the repository path if it cannot be determined.
const UNKNOWN_REPOSITORY: &str = "<unknown repository>";

/// The output and error streams a hook writes to.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }
}

/// How a hook invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The hook did its work; for `pre-commit` the commit was accepted.
    Success,
    /// `pre-commit` rejected the commit.
    Rejected,
    /// The hook failed internally.
    Failed(HookKind),
}

impl Exit {
    /// The process exit status for git.
    ///
    /// Failures of post-* hooks exit with zero: git has already completed the
    /// operation and it must not appear to have failed.
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::Rejected => 1,
            Exit::Failed(kind) => u8::from(kind.can_block()),
        }
    }
}

/// Everything a hook body needs, assembled once per invocation.
pub(crate) struct Context<'a> {
    pub collector: Collector<&'a dyn Backend>,
    pub composer: Composer,
    pub dispatcher: Dispatcher<'a>,
    pub config: &'a dyn ConfigProvider,
}

/// The hook orchestrator.
///
/// All capabilities are injected; a `Warden` holds no state of its own.
pub struct Warden<'a> {
    backend: &'a dyn Backend,
    config: &'a dyn ConfigProvider,
    settings: &'a Settings,
    relay: &'a dyn Relay,
}

impl<'a> Warden<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        config: &'a dyn ConfigProvider,
        settings: &'a Settings,
        relay: &'a dyn Relay,
    ) -> Self {
        Self {
            backend,
            config,
            settings,
            relay,
        }
    }

    /// Run the hook for `invocation` behind the failure boundary.
    pub fn run(&self, invocation: &HookInvocation, console: &mut Console<'_>) -> Exit {
        let kind = invocation.kind();
        if self.settings.debug {
            let _ = writeln!(console.out, "Got args: {invocation:?}");
        }
        tracing::debug!(hook = %kind, ?invocation, "hook started");

        let collector = Collector::new(self.backend);
        let repository = collector.repository_path().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not determine the repository path");
            UNKNOWN_REPOSITORY.to_owned()
        });
        let ctx = Context {
            collector,
            composer: Composer::new(repository, Timestamp::now(self.settings.timezone)),
            dispatcher: Dispatcher::new(&self.settings.mail, self.settings.debug, self.relay),
            config: self.config,
        };

        let outcome = boundary::guard(|| match invocation {
            HookInvocation::PreCommit => pre_commit::run(&ctx, console),
            HookInvocation::PostCommit => post_commit::run(&ctx, console),
            HookInvocation::PostCheckout { previous, new, kind } => {
                post_checkout::run(&ctx, previous, new, *kind, console)
            }
        });
        match outcome {
            Ok(exit) => exit,
            Err(failure) => boundary::report(kind, failure, &ctx, console),
        }
    }
}

/// Load settings and run the hook for `invocation`.
///
/// If the settings needed for notifications are unusable, no notification can be sent;
/// the problem is reported on the error stream only.
pub fn run(
    invocation: &HookInvocation,
    backend: &dyn Backend,
    config: &dyn ConfigProvider,
    relay: &dyn Relay,
    console: &mut Console<'_>,
) -> Exit {
    match Settings::load(config) {
        Ok(settings) => Warden::new(backend, config, &settings, relay).run(invocation, console),
        Err(err) => boundary::bare_diagnostic(invocation.kind(), &HookError::from(err), console),
    }
}

pub(crate) fn record_change(kind: HookKind, summary: &str) {
    tracing::info!(target: CHANGES_TARGET, hook = %kind, "{summary}");
}
