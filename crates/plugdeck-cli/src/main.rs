mod config;
mod dispatch;
mod doctor;
mod profile_flows;
mod render;

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use plugdeck_core::RepositoryNormalizer;
use plugdeck_store::{default_home, JsonStateStore, MarkerFileGuard, StateLayout};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use dispatch::{
    dispatch_profile, emit_outcome, exit_code, CommandOutcome, OutputLine, ProfileCommandTable,
    EXIT_PARSE_FAILURE, EXIT_SUCCESS,
};
use doctor::doctor_lines;
use profile_flows::ProfileContext;
use render::{resolve_output_style, OutputStyle};

const HOME_ENV: &str = "PLUGDECK_HOME";
const LOG_ENV: &str = "PLUGDECK_LOG";

#[derive(Parser, Debug)]
#[command(name = "plugdeck")]
#[command(about = "Editor plugin profile manager", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// State directory (defaults to $PLUGDECK_HOME, then ~/.plugdeck); must precede the subcommand
    #[arg(long)]
    home: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get, switch and edit plugin profiles
    #[command(disable_help_flag = true)]
    Profile {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show state paths and transaction lock health
    Doctor,
    /// Show plugdeck version
    Version,
    /// Print a shell completion script
    Completions { shell: Shell },
}

/// Resolved per-invocation environment.
struct Environment {
    layout: StateLayout,
    config: AppConfig,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = parse_error_exit_code(err.kind());
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let (outcome, style) = run_cli(cli);
    emit_outcome(&outcome, style);
    ExitCode::from(exit_code(&outcome))
}

fn run_cli(cli: Cli) -> (CommandOutcome, OutputStyle) {
    match cli.command {
        Commands::Version => (
            CommandOutcome::Ok(vec![OutputLine::Plain(
                env!("CARGO_PKG_VERSION").to_string(),
            )]),
            detect_output_style(&AppConfig::default()),
        ),
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout();
            clap_complete::generate(shell, &mut Cli::command(), "plugdeck", &mut stdout);
            (
                CommandOutcome::Ok(Vec::new()),
                detect_output_style(&AppConfig::default()),
            )
        }
        Commands::Profile { args } => with_environment(cli.home.as_deref(), |environment| {
            run_profile_command(environment, &args)
        }),
        Commands::Doctor => with_environment(cli.home.as_deref(), |environment| {
            let guard = transaction_guard(environment);
            CommandOutcome::from_result(doctor_lines(&environment.layout, &guard))
        }),
    }
}

fn with_environment<F>(home_flag: Option<&Path>, run: F) -> (CommandOutcome, OutputStyle)
where
    F: FnOnce(&Environment) -> CommandOutcome,
{
    match load_environment(home_flag, std::env::var_os(HOME_ENV)) {
        Ok(environment) => (run(&environment), detect_output_style(&environment.config)),
        Err(err) => (
            CommandOutcome::Fatal(err),
            detect_output_style(&AppConfig::default()),
        ),
    }
}

fn transaction_guard(environment: &Environment) -> MarkerFileGuard {
    MarkerFileGuard::new(environment.layout.transaction_lock_path())
        .with_stale_after(environment.config.guard.stale_after())
}

fn run_profile_command(environment: &Environment, args: &[String]) -> CommandOutcome {
    let layout = &environment.layout;
    let store = JsonStateStore::new(layout.state_path());
    let guard = transaction_guard(environment);
    let ctx = ProfileContext {
        store: &store,
        guard: &guard,
        identifier: &RepositoryNormalizer,
    };
    let table = ProfileCommandTable::standard();
    dispatch_profile(&table, &ctx, args)
}

fn load_environment(home_flag: Option<&Path>, env_home: Option<OsString>) -> Result<Environment> {
    let home = resolve_home(home_flag, env_home)?;
    let layout = StateLayout::new(home);
    let config = AppConfig::load(&layout.config_path())?;
    Ok(Environment { layout, config })
}

fn resolve_home(home_flag: Option<&Path>, env_home: Option<OsString>) -> Result<PathBuf> {
    if let Some(home) = home_flag {
        return Ok(home.to_path_buf());
    }
    if let Some(home) = env_home.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    default_home().context("failed to resolve plugdeck home")
}

fn detect_output_style(config: &AppConfig) -> OutputStyle {
    resolve_output_style(
        config.output.color,
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
    )
}

fn parse_error_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => EXIT_SUCCESS,
        _ => EXIT_PARSE_FAILURE,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
