//! The single place where hook failures are caught and reported.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::error::Error as _;
use std::fmt::Write as _;
use std::io::Write as _;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Once;

use super::{Console, Context, Exit, HookKind};
use crate::notify::Event;
use crate::vcs::RepositoryState;
use crate::{ConfigError, HookError, VcsError, CHANGES_TARGET};

/// An error or panic that escaped a hook body, with the place it came from.
pub(crate) struct Failure {
    pub error: HookError,
    /// `file:line:column` of the `?` that raised the error, or of the panic.
    pub location: Option<String>,
    pub backtrace: Backtrace,
}

impl Failure {
    /// Capture the caller's location and stack.
    #[track_caller]
    pub fn new(error: HookError) -> Self {
        Self {
            error,
            location: Some(Location::caller().to_string()),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// The error, its causes and the backtrace, as sent to the operations team.
    pub fn detail(&self) -> String {
        let mut text = format!("{} ({:?} error)", self.error, self.error.kind());
        let mut source = self.error.source();
        while let Some(cause) = source {
            let _ = write!(text, "\n  caused by: {cause}");
            source = cause.source();
        }
        if let Some(location) = &self.location {
            let _ = write!(text, "\n\nRaised at: {location}");
        }
        let _ = write!(text, "\n\nBacktrace:\n{}", self.backtrace);
        text
    }
}

impl From<HookError> for Failure {
    #[track_caller]
    fn from(error: HookError) -> Self {
        Self::new(error)
    }
}

impl From<ConfigError> for Failure {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        Self::new(error.into())
    }
}

impl From<VcsError> for Failure {
    #[track_caller]
    fn from(error: VcsError) -> Self {
        Self::new(error.into())
    }
}

/// Where a panic inside [`guard()`] happened, recorded before the stack unwinds.
struct PanicOrigin {
    location: Option<String>,
    backtrace: Backtrace,
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
    static PANIC_ORIGIN: RefCell<Option<PanicOrigin>> = const { RefCell::new(None) };
}

/// Chain a panic hook that records the origin of panics raised inside [`guard()`].
///
/// Panics outside of a guarded body go to the previous hook unchanged.
fn record_panic_origins() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARDED.with(Cell::get) {
                let origin = PanicOrigin {
                    location: info.location().map(ToString::to_string),
                    backtrace: Backtrace::force_capture(),
                };
                PANIC_ORIGIN.with(|slot| *slot.borrow_mut() = Some(origin));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `body`, turning panics into a [`Failure`] as well.
pub(crate) fn guard<T>(body: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    record_panic_origins();
    let was_guarded = GUARDED.with(|guarded| guarded.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(body));
    GUARDED.with(|guarded| guarded.set(was_guarded));

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let error = HookError::internal(panic_message(payload.as_ref()));
            Err(match PANIC_ORIGIN.with(|slot| slot.borrow_mut().take()) {
                Some(origin) => Failure {
                    error,
                    location: origin.location,
                    backtrace: origin.backtrace,
                },
                None => Failure {
                    error,
                    location: None,
                    backtrace: Backtrace::force_capture(),
                },
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_owned()
    }
}

/// Tell the user, then try to tell the operations team.
pub(crate) fn report(kind: HookKind, failure: Failure, ctx: &Context<'_>, console: &mut Console<'_>) -> Exit {
    tracing::error!(
        target: CHANGES_TARGET,
        hook = %kind,
        error = %failure.error,
        location = failure.location.as_deref().unwrap_or("unknown"),
        "hook failed"
    );
    tracing::debug!(backtrace = %failure.backtrace, "failure backtrace");
    notify_user(kind, &failure.error, console);

    let detail = failure.detail();
    let message = ctx.composer.compose(
        Event::Failure {
            hook: kind,
            detail: &detail,
        },
        &RepositoryState::default(),
    );
    ctx.dispatcher.dispatch(&message, console);
    Exit::Failed(kind)
}

/// Report a failure that happened before a notification could be composed.
pub(crate) fn bare_diagnostic(kind: HookKind, error: &HookError, console: &mut Console<'_>) -> Exit {
    tracing::error!(target: CHANGES_TARGET, hook = %kind, %error, "hook could not start");
    notify_user(kind, error, console);
    let _ = writeln!(
        console.err,
        "No notification could be sent. Please check the 'warden.*' entries of the git configuration."
    );
    Exit::Failed(kind)
}

fn notify_user(kind: HookKind, error: &HookError, console: &mut Console<'_>) {
    let _ = if kind.can_block() {
        writeln!(console.err, "ERROR: {kind} hook failed: {error}\nNO CODE HAS BEEN COMMITTED!")
    } else {
        writeln!(
            console.err,
            "{kind} hook failed: {error}\nHook failed! THIS DOES NOT AFFECT THE {}",
            kind.operation().to_uppercase()
        )
    };
}
