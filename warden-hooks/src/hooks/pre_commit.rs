use std::io::Write as _;

use super::boundary::Failure;
use super::{record_change, Console, Context, Exit, HookKind};
use crate::notify::Event;
use crate::policy::{self, PolicyDecision};
use crate::PolicyConfig;

/// Decide whether the pending commit may proceed.
///
/// Accepted commits are not announced. A rejection is shown to the user and reported
/// to the operations team.
pub(super) fn run(ctx: &Context<'_>, console: &mut Console<'_>) -> Result<Exit, Failure> {
    let state = ctx.collector.identity()?;
    let policy = PolicyConfig::load(ctx.config)?;

    let rejection = match policy::evaluate(&state.author, &state.user, &state.branch, &policy) {
        PolicyDecision::Accepted => {
            tracing::debug!(author = %state.author, user = %state.user, branch = %state.branch, "commit accepted");
            return Ok(Exit::Success);
        }
        PolicyDecision::Rejected(rejection) => rejection,
    };

    let shown = format!("ERROR: {}\nNO CODE HAS BEEN COMMITTED!", rejection.reason);
    let _ = writeln!(console.err, "{shown}");
    record_change(
        HookKind::PreCommit,
        &format!(
            "rejected commit by user '{}' as author '{}' to '{}' ({:?})",
            state.user, state.author, state.branch, rejection.code
        ),
    );

    let message = ctx.composer.compose(
        Event::Rejection {
            shown: &shown,
            policy: &policy,
        },
        &state,
    );
    if ctx.dispatcher.dispatch(&message, console).is_failed() {
        let _ = writeln!(
            console.err,
            "WARNING: the operations team has not been told about this rejection."
        );
    }
    Ok(Exit::Rejected)
}
