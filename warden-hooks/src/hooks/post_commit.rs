use super::boundary::Failure;
use super::{record_change, Console, Context, Exit, HookKind};
use crate::notify::Event;

/// Announce the commit that was just made.
pub(super) fn run(ctx: &Context<'_>, console: &mut Console<'_>) -> Result<Exit, Failure> {
    let state = ctx.collector.commit()?;
    record_change(
        HookKind::PostCommit,
        &format!(
            "user '{}' committed as author '{}' to '{}' ({} files changed)",
            state.user,
            state.author,
            state.branch,
            state.changed_files.len()
        ),
    );

    let message = ctx.composer.compose(Event::Commit, &state);
    ctx.dispatcher.dispatch(&message, console);
    Ok(Exit::Success)
}
