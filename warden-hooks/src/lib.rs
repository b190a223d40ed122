/*!
Commit policy and change notifications for a shared configuration repository.

Git invokes one of three hooks (`pre-commit`, `post-commit`, `post-checkout`).
Each invocation is a short-lived, single-threaded pipeline:

- collect a fresh snapshot of repository state from the git backend ([`vcs`]),
- for `pre-commit` only, decide whether the commit may proceed ([`policy`]),
- compose a human-readable notification ([`notify::Composer`]),
- hand it to the dispatcher, which delivers it once or prints it in debug mode ([`notify::Dispatcher`]).

The orchestration and the top-level failure boundary live in [`hooks`].

Design principles
- Nothing is cached across invocations: configuration and state are re-read every time.
- Capabilities (git backend, configuration, mail relay) are traits so the pipeline can be
  exercised without spawning processes or touching the network.
- Notification delivery is best effort and never changes the exit status of a hook.
*/

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod notify;
pub mod policy;
pub mod vcs;

pub use config::{ConfigProvider, PolicyConfig, Settings};
pub use error::{ConfigError, ErrorKind, HookError, InstallError, ResolutionFailure, TransportError, VcsError};
pub use hooks::{CheckoutKind, Console, Exit, HookInvocation, HookKind, Warden};
pub use policy::{evaluate, PolicyDecision, ReasonCode, Rejection};
pub use vcs::{Backend, Collector, GitCli, RepositoryState};

/// The `tracing` target receiving one record per audited event.
///
/// The binary routes this target into the change log.
pub const CHANGES_TARGET: &str = "config_warden::changes";
