//! Command definitions for the Pomodoro Timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{SettingsParams, MAX_SETTING_MINUTES, MIN_SETTING_MINUTES};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro Timer - a Linux Pomodoro timer with lunch mode and pause-on-lock
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro",
    version,
    about = "Pomodoro timer daemon and client",
    long_about = "A Pomodoro timer that runs as a background daemon.\n\
                  Work periods alternate with short breaks, with a long break after every \
                  fourth work period. Lunch is followed by a short walk, and locking the \
                  session pauses the timer until you come back.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (default: ~/.pomodoro/pomodoro.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a work period
    Work,

    /// Start lunch (followed by a walk)
    Lunch,

    /// Pause the timer, or resume it if paused
    #[command(visible_aliases = ["pause", "resume"])]
    Toggle,

    /// Stop the timer
    Stop,

    /// Show current timer status
    Status,

    /// Show or change durations
    Settings(SettingsArgs),

    /// Report that the session was locked
    Lock,

    /// Report that the session was unlocked
    Unlock,

    /// Shut the daemon down
    Quit,

    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Settings Arguments
// ============================================================================

/// Arguments for the settings command. Omitted values stay unchanged.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Work duration in minutes
    #[arg(long, value_parser = minutes_parser())]
    pub work: Option<u32>,

    /// Short break duration in minutes
    #[arg(long, value_parser = minutes_parser())]
    pub short_break: Option<u32>,

    /// Long break duration in minutes
    #[arg(long, value_parser = minutes_parser())]
    pub long_break: Option<u32>,

    /// Lunch duration in minutes
    #[arg(long, value_parser = minutes_parser())]
    pub lunch: Option<u32>,

    /// Walk-after-lunch duration in minutes
    #[arg(long, value_parser = minutes_parser())]
    pub walk: Option<u32>,

    /// Pause the timer while the session is locked
    #[arg(long, value_name = "BOOL")]
    pub pause_on_lock: Option<bool>,
}

impl SettingsArgs {
    /// Converts the arguments to IPC parameters.
    pub fn to_params(&self) -> SettingsParams {
        SettingsParams {
            work_minutes: self.work,
            short_break_minutes: self.short_break,
            long_break_minutes: self.long_break,
            lunch_minutes: self.lunch,
            walk_minutes: self.walk,
            pause_on_lock: self.pause_on_lock,
        }
    }
}

fn minutes_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(i64::from(MIN_SETTING_MINUTES)..=i64::from(MAX_SETTING_MINUTES))
}

// ============================================================================
// Daemon Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Disable notification sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Do not pause on session lock (skips the D-Bus monitor)
    #[arg(long)]
    pub no_lock_monitor: bool,

    /// Status label file (default: $XDG_RUNTIME_DIR/pomodoro/label)
    #[arg(long, value_name = "PATH")]
    pub status_file: Option<PathBuf>,

    /// Config file (default: ~/.config/pomodoro/pomodoro_config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomodoro"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.socket.is_none());
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["pomodoro", "-v", "status"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_global_socket() {
            let cli = Cli::parse_from(["pomodoro", "work", "--socket", "/tmp/p.sock"]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
            assert!(matches!(cli.command, Some(Commands::Work)));
        }

        #[test]
        fn test_parse_simple_commands() {
            let cases = [
                ("work", "Work"),
                ("lunch", "Lunch"),
                ("stop", "Stop"),
                ("lock", "Lock"),
                ("unlock", "Unlock"),
                ("quit", "Quit"),
            ];
            for (arg, expected) in cases {
                let cli = Cli::parse_from(["pomodoro", arg]);
                assert_eq!(
                    format!("{:?}", cli.command.unwrap()),
                    expected,
                    "arg: {}",
                    arg
                );
            }
        }

        #[test]
        fn test_toggle_aliases() {
            for arg in ["toggle", "pause", "resume"] {
                let cli = Cli::parse_from(["pomodoro", arg]);
                assert!(matches!(cli.command, Some(Commands::Toggle)), "arg: {}", arg);
            }
        }

        #[test]
        fn test_parse_completions() {
            let cli = Cli::parse_from(["pomodoro", "completions", "bash"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Completions {
                    shell: clap_complete::Shell::Bash
                })
            ));
        }
    }

    // ------------------------------------------------------------------------
    // Settings Tests
    // ------------------------------------------------------------------------

    mod settings_tests {
        use super::*;

        #[test]
        fn test_parse_settings_flags() {
            let cli = Cli::parse_from([
                "pomodoro",
                "settings",
                "--work",
                "50",
                "--walk",
                "10",
                "--pause-on-lock",
                "false",
            ]);
            match cli.command {
                Some(Commands::Settings(args)) => {
                    let params = args.to_params();
                    assert_eq!(params.work_minutes, Some(50));
                    assert_eq!(params.walk_minutes, Some(10));
                    assert_eq!(params.pause_on_lock, Some(false));
                    assert_eq!(params.lunch_minutes, None);
                }
                other => panic!("Expected Settings command, got {:?}", other),
            }
        }

        #[test]
        fn test_settings_without_flags_is_empty() {
            let cli = Cli::parse_from(["pomodoro", "settings"]);
            match cli.command {
                Some(Commands::Settings(args)) => assert!(args.to_params().is_empty()),
                other => panic!("Expected Settings command, got {:?}", other),
            }
        }

        #[test]
        fn test_settings_range_enforced() {
            assert!(Cli::try_parse_from(["pomodoro", "settings", "--work", "0"]).is_err());
            assert!(Cli::try_parse_from(["pomodoro", "settings", "--lunch", "1441"]).is_err());
            assert!(Cli::try_parse_from(["pomodoro", "settings", "--lunch", "1440"]).is_ok());
        }

        #[test]
        fn test_pause_on_lock_requires_bool() {
            assert!(
                Cli::try_parse_from(["pomodoro", "settings", "--pause-on-lock", "maybe"]).is_err()
            );
        }
    }

    // ------------------------------------------------------------------------
    // Daemon Tests
    // ------------------------------------------------------------------------

    mod daemon_tests {
        use super::*;

        #[test]
        fn test_parse_daemon_defaults() {
            let cli = Cli::parse_from(["pomodoro", "daemon"]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert!(!args.no_sound);
                    assert!(!args.no_lock_monitor);
                    assert!(args.status_file.is_none());
                    assert!(args.config.is_none());
                }
                other => panic!("Expected Daemon command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_daemon_options() {
            let cli = Cli::parse_from([
                "pomodoro",
                "daemon",
                "--no-sound",
                "--no-lock-monitor",
                "--status-file",
                "/tmp/label",
                "--config",
                "/tmp/config.json",
            ]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert!(args.no_sound);
                    assert!(args.no_lock_monitor);
                    assert_eq!(args.status_file, Some(PathBuf::from("/tmp/label")));
                    assert_eq!(args.config, Some(PathBuf::from("/tmp/config.json")));
                }
                other => panic!("Expected Daemon command, got {:?}", other),
            }
        }
    }
}
