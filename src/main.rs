//! Pomodoro Timer - a Linux Pomodoro timer daemon and client
//!
//! This tool helps you stay focused using the Pomodoro Technique:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 10 minutes of long break after every 4th work period
//! - 45 minutes of lunch followed by a 5 minute walk

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomodoro_indicator::cli::{Cli, Commands, DaemonArgs, Display, IpcClient};
use pomodoro_indicator::daemon::{self, default_socket_path, DaemonOptions};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, matches!(cli.command, Some(Commands::Daemon(_))));

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins when set; otherwise the daemon logs at info and
/// `--verbose` raises either mode to debug.
fn init_tracing(verbose: bool, daemon: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match (verbose, daemon) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let socket = cli.socket;

    match command {
        Commands::Daemon(args) => {
            let socket_path = match socket {
                Some(path) => path,
                None => default_socket_path()?,
            };
            daemon::run(daemon_options(socket_path, args)).await?;
        }
        Commands::Completions { shell } => generate_completions(shell),
        Commands::Work => Display::show_action(&client(socket)?.work().await?),
        Commands::Lunch => Display::show_action(&client(socket)?.lunch().await?),
        Commands::Toggle => Display::show_action(&client(socket)?.toggle().await?),
        Commands::Stop => Display::show_action(&client(socket)?.stop().await?),
        Commands::Status => Display::show_status(&client(socket)?.status().await?),
        Commands::Settings(args) => {
            let response = client(socket)?.settings(args.to_params()).await?;
            Display::show_settings(&response);
        }
        Commands::Lock => Display::show_action(&client(socket)?.lock(true).await?),
        Commands::Unlock => Display::show_action(&client(socket)?.lock(false).await?),
        Commands::Quit => Display::show_action(&client(socket)?.quit().await?),
    }

    Ok(())
}

fn client(socket: Option<PathBuf>) -> Result<IpcClient> {
    match socket {
        Some(path) => Ok(IpcClient::with_socket_path(path)),
        None => IpcClient::new(),
    }
}

fn daemon_options(socket_path: PathBuf, args: DaemonArgs) -> DaemonOptions {
    DaemonOptions {
        config_path: args.config,
        status_file: args.status_file,
        sound: !args.no_sound,
        lock_monitor: !args.no_lock_monitor,
        ..DaemonOptions::new(socket_path)
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
