use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::{EnvFilter, Targets};
use tracing_subscriber::prelude::*;
use warden_hooks::CHANGES_TARGET;

/// Everything logged by this crate and the hooks library.
pub const DEBUG_LOG: &str = "config_warden_debug_log";
/// One line per audited event.
pub const CHANGE_LOG: &str = "config_warden_change_log";

/// Flushes the log files when dropped; keep it alive until the process exits.
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

/// Log to standard error, and to the debug and change logs in `log_dir`.
///
/// Log files that cannot be opened are skipped with a warning on standard error.
pub fn init_logging(verbose: bool, log_dir: &Path) -> LogGuards {
    let console_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let mut guards = Vec::new();
    let mut problems = Vec::new();
    let mut writer = |name: &str| match open(log_dir, name) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);
            Some(writer)
        }
        Err(err) => {
            problems.push(format!("could not open {name} in {}: {err}", log_dir.display()));
            None
        }
    };

    let debug_log = writer(DEBUG_LOG).map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(
                Targets::new()
                    .with_target("config_warden", LevelFilter::DEBUG)
                    .with_target("warden_hooks", LevelFilter::DEBUG),
            )
    });
    let change_log = writer(CHANGE_LOG).map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .with_level(false)
            .with_filter(Targets::new().with_target(CHANGES_TARGET, LevelFilter::INFO))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(debug_log)
        .with(change_log)
        .init();

    for problem in problems {
        tracing::warn!("{problem}, logging to the console only");
    }
    LogGuards(guards)
}

fn open(dir: &Path, name: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}
