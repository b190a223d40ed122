#![deny(rust_2018_idioms, unsafe_code)]

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use warden_hooks::hooks::{self, install, CheckoutKind, Console, HookInvocation};
use warden_hooks::notify::SmtpRelay;
use warden_hooks::GitCli;

mod shared;

/// Guard and audit changes to a shared configuration repository from git hooks.
#[derive(Debug, Parser)]
#[command(name = "config-warden", version)]
struct Args {
    /// Also log debug messages to standard error.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Directory receiving the debug and change logs, overriding `warden.logdir`.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Run as if started in DIR.
    #[arg(short = 'C', global = true, value_name = "DIR")]
    repository: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Check the pending commit against the commit policy.
    PreCommit,
    /// Announce the commit that was just made.
    PostCommit,
    /// Announce a checkout.
    PostCheckout {
        /// The ref of the previous HEAD.
        previous: String,
        /// The ref of the new HEAD.
        new: String,
        /// 1 for a branch checkout, 0 for a file checkout.
        #[arg(value_name = "FLAG")]
        kind: CheckoutKind,
    },
    /// Install hook scripts that run this program.
    Install {
        /// Replace existing hook scripts.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let git = match &args.repository {
        Some(dir) => GitCli::at(dir.clone()),
        None => GitCli::new(),
    };
    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| warden_hooks::config::log_dir(&git));
    let _guards = shared::init_logging(args.verbose, &log_dir);

    let invocation = match args.cmd {
        Subcommands::PreCommit => HookInvocation::PreCommit,
        Subcommands::PostCommit => HookInvocation::PostCommit,
        Subcommands::PostCheckout { previous, new, kind } => HookInvocation::PostCheckout { previous, new, kind },
        Subcommands::Install { force } => {
            return match install_hooks(&git, force) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    let _ = writeln!(io::stderr(), "Error: {err:?}");
                    ExitCode::FAILURE
                }
            };
        }
    };

    let (mut out, mut err) = (io::stdout().lock(), io::stderr().lock());
    let exit = hooks::run(
        &invocation,
        &git,
        &git,
        &SmtpRelay::new(),
        &mut Console::new(&mut out, &mut err),
    );
    tracing::debug!(?exit, "hook finished");
    ExitCode::from(exit.code())
}

fn install_hooks(git: &GitCli, force: bool) -> anyhow::Result<()> {
    let program = std::env::current_exe().context("could not determine the path of this executable")?;
    let written = install::install(git, &program, force).context("could not install the hook scripts")?;
    for path in written {
        println!("installed {}", path.display());
    }
    Ok(())
}
