//! cli
//!
//! Command-line interface layer for Stallion.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Wire configuration, credential storage and the login flow together
//! - Hand the invocation to the [`crate::engine::Runner`]
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers live in [`commands`]; validation,
//! session gating and error classification happen in the engine. Only
//! `main` turns the returned [`CommandResult`] into a process exit code.

pub mod args;
pub mod commands;

pub use args::{GlobalArgs, Invocation};

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use crate::api::ApiClient;
use crate::auth::LoginFlow;
use crate::bundle::sweep_temp_dirs;
use crate::core::config::Config;
use crate::engine::{self, CommandResult, ErrorCode, OptionMap, Registry, Runner};
use crate::secrets::FileTokenStore;

/// Command run when none is given.
const DEFAULT_COMMAND: &str = "help";

/// Exit status after an interrupt.
const INTERRUPTED_EXIT: i32 = 1;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Parse failures and
/// `--help`/`--version` are reported here; everything else is returned.
pub fn run() -> Result<CommandResult> {
    let registry = commands::builtin_registry().context("invalid command table")?;

    let invocation = match args::parse(&registry, std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => return Ok(report_parse_error(e)),
    };

    init_logging(&invocation.globals);
    let cwd = resolve_cwd(invocation.globals.cwd.as_deref())?;
    install_interrupt_handler(cwd.clone());

    let result = execute(&registry, invocation, cwd.clone());
    let swept = sweep_temp_dirs(&cwd);
    if swept > 0 {
        log::debug!("removed {} leftover temp directories", swept);
    }
    result
}

/// Execute a parsed invocation rooted at `cwd`.
pub fn execute(registry: &Registry, invocation: Invocation, cwd: PathBuf) -> Result<CommandResult> {
    let config = Config::load().context("failed to load configuration")?;
    match &config.source {
        Some(path) => log::debug!("using api {} (from {})", config.api_url, path.display()),
        None => log::debug!("using api {}", config.api_url),
    }

    let ctx = engine::Context {
        cwd,
        verbosity: invocation.globals.verbosity(),
        interactive: invocation.globals.interactive(),
        config,
    };

    let (name, options) = invocation
        .command
        .unwrap_or_else(|| (DEFAULT_COMMAND.to_string(), OptionMap::new()));

    let store = FileTokenStore::new().context("cannot locate the credential store")?;
    let api = ApiClient::new(&ctx.config.api_url);
    let login = LoginFlow::new(
        &api,
        &store,
        ctx.config.console_url.clone(),
        ctx.interactive,
        ctx.verbosity,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let runner = Runner::new(registry, &ctx, &store, &login);
    Ok(runtime.block_on(runner.execute(&name, options)))
}

fn init_logging(globals: &GlobalArgs) {
    let env = env_logger::Env::default().default_filter_or(globals.verbosity().log_filter());
    // A second initialization only happens in tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

fn resolve_cwd(explicit: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir().context("cannot determine the current directory")?;
    let Some(dir) = explicit else {
        return Ok(current);
    };
    let dir = current.join(dir);
    if !dir.is_dir() {
        bail!("--cwd {} is not a directory", dir.display());
    }
    Ok(dir)
}

/// Sweep leftover workspaces and exit with status 1 on SIGINT/SIGTERM.
fn install_interrupt_handler(cwd: PathBuf) {
    let installed = ctrlc::set_handler(move || {
        sweep_temp_dirs(&cwd);
        std::process::exit(INTERRUPTED_EXIT);
    });
    if let Err(e) = installed {
        log::debug!("signal handler not installed: {}", e);
    }
}

fn report_parse_error(error: clap::Error) -> CommandResult {
    // --help and --version also arrive here, on stdout.
    let _ = error.print();
    if error.use_stderr() {
        CommandResult::failure(ErrorCode::InvalidParameter, String::new())
    } else {
        CommandResult::Success
    }
}
