use super::boundary::Failure;
use super::{record_change, CheckoutKind, Console, Context, Exit, HookKind};
use crate::notify::Event;
use crate::vcs::{is_null_ref, Backend, Collector, RepositoryState};
use crate::VcsError;

/// Announce a checkout between `previous` and `new`.
pub(super) fn run(
    ctx: &Context<'_>,
    previous: &str,
    new: &str,
    kind: CheckoutKind,
    console: &mut Console<'_>,
) -> Result<Exit, Failure> {
    let state = collect(&ctx.collector, previous, new)?;
    record_change(
        HookKind::PostCheckout,
        &format!(
            "user '{}' (author '{}') performed a {} checkout from '{}' to '{}'",
            state.user,
            state.author,
            kind.describe(),
            state.display_name(previous),
            state.display_name(new)
        ),
    );

    let message = ctx.composer.compose(Event::Checkout { previous, new, kind }, &state);
    ctx.dispatcher.dispatch(&message, console);
    Ok(Exit::Success)
}

/// Everything a checkout notification shows.
///
/// Refs that cannot be resolved keep their raw form, with one warning each.
/// After a clone the previous ref is the null id: every file of `new` counts as changed,
/// and the null id is shown as is.
pub(crate) fn collect<B: Backend>(
    collector: &Collector<B>,
    previous: &str,
    new: &str,
) -> Result<RepositoryState, VcsError> {
    let changed_files = if is_null_ref(previous) {
        collector.files_at(new)?
    } else {
        collector.changed_files_between(previous, new)?
    };
    let mut state = RepositoryState {
        author: collector.author()?,
        user: collector.local_user()?,
        status: collector.status()?,
        changed_files,
        ..Default::default()
    };
    for reference in [previous, new] {
        if state.ref_names.contains_key(reference) {
            continue;
        }
        if is_null_ref(reference) {
            state.ref_names.insert(reference.to_owned(), reference.to_owned());
            continue;
        }
        let name = match collector.resolve_ref(reference) {
            Ok(name) => name,
            Err(failure) => {
                let warning = format!("{failure}, showing it as is");
                tracing::warn!(reference, error = %failure.source, "{warning}");
                state.warnings.push(warning);
                reference.to_owned()
            }
        };
        state.ref_names.insert(reference.to_owned(), name);
    }
    Ok(state)
}
