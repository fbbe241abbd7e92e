//! Display utilities for the Pomodoro Timer CLI.
//!
//! This module provides formatted output for:
//! - Command acknowledgements
//! - Error messages
//! - Status display
//! - Settings display

use crate::indicator::format_time;
use crate::types::{Durations, IpcResponse, ResponseData};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's acknowledgement of a command, with the new label.
    pub fn show_action(response: &IpcResponse) {
        println!("{}", Self::render_action(response));
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("{}", Self::render_status(response.data.as_ref()));
    }

    /// Shows the active durations.
    pub fn show_settings(response: &IpcResponse) {
        match response.data.as_ref().and_then(|d| d.settings.as_ref()) {
            Some(durations) => {
                if !response.message.is_empty() {
                    println!("{}", response.message);
                }
                println!("{}", Self::render_settings(durations));
            }
            None => Self::show_action(response),
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn render_action(response: &IpcResponse) -> String {
        let label = response.data.as_ref().and_then(|d| d.label.as_deref());
        match label {
            Some(label) if !label.is_empty() => format!("{}  [{}]", response.message, label),
            _ => response.message.clone(),
        }
    }

    fn render_status(data: Option<&ResponseData>) -> String {
        let mut lines = vec![
            "Pomodoro Timer Status".to_string(),
            "─────────────────────".to_string(),
        ];

        let Some(data) = data else {
            lines.push("The timer is not running".to_string());
            return lines.join("\n");
        };

        let state = data.state.as_deref().unwrap_or("unknown");
        lines.push(format!("State:     {}", Self::state_name(state)));

        if state != "stopped" {
            if let Some(remaining) = data.remaining_seconds {
                lines.push(format!("Remaining: {}", format_time(remaining)));
            }
        }
        if let Some(cycles) = data.cycles {
            lines.push(format!("Completed: {} work period{}", cycles, plural(cycles)));
        }
        if data.lock_paused == Some(true) {
            lines.push("Paused by session lock; unlocking resumes".to_string());
        }

        lines.join("\n")
    }

    fn render_settings(durations: &Durations) -> String {
        let rows = [
            ("Work", durations.work),
            ("Short break", durations.short_break),
            ("Long break", durations.long_break),
            ("Lunch", durations.lunch),
            ("Walk", durations.walk_after_lunch),
        ];

        let mut lines: Vec<String> = rows
            .iter()
            .map(|(name, seconds)| format!("{:<15}{}", format!("{}:", name), minutes(*seconds)))
            .collect();
        lines.push(format!(
            "{:<15}{}",
            "Pause on lock:",
            if durations.pause_on_lock { "on" } else { "off" }
        ));
        lines.join("\n")
    }

    fn state_name(state: &str) -> &str {
        match state {
            "work" => "Working",
            "short_break" => "Short break",
            "long_break" => "Long break",
            "lunch" => "Lunch",
            "walk" => "Walk",
            "paused" => "Paused",
            "stopped" => "Stopped",
            other => other,
        }
    }
}

fn minutes(seconds: u32) -> String {
    if seconds % 60 == 0 {
        format!("{} min", seconds / 60)
    } else {
        format_time(seconds)
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn data(state: &str, remaining: u32, cycles: u32) -> ResponseData {
        ResponseData {
            state: Some(state.to_string()),
            remaining_seconds: Some(remaining),
            cycles: Some(cycles),
            label: None,
            lock_paused: Some(false),
            settings: None,
        }
    }

    // ------------------------------------------------------------------------
    // Status Tests
    // ------------------------------------------------------------------------

    mod status_tests {
        use super::*;

        #[test]
        fn test_render_status_working() {
            let out = Display::render_status(Some(&data("work", 1499, 1)));
            assert!(out.contains("State:     Working"));
            assert!(out.contains("Remaining: 24:59"));
            assert!(out.ends_with("Completed: 1 work period"));
        }

        #[test]
        fn test_render_status_stopped_hides_remaining() {
            let out = Display::render_status(Some(&data("stopped", 0, 3)));
            assert!(out.contains("Stopped"));
            assert!(!out.contains("Remaining"));
            assert!(out.contains("3 work periods"));
        }

        #[test]
        fn test_render_status_lock_paused() {
            let mut d = data("paused", 900, 0);
            d.lock_paused = Some(true);
            let out = Display::render_status(Some(&d));
            assert!(out.contains("Paused by session lock"));
        }

        #[test]
        fn test_render_status_no_data() {
            let out = Display::render_status(None);
            assert!(out.contains("not running"));
        }

        #[test]
        fn test_unknown_state_passes_through() {
            assert_eq!(Display::state_name("mystery"), "mystery");
            assert_eq!(Display::state_name("long_break"), "Long break");
        }
    }

    // ------------------------------------------------------------------------
    // Action Tests
    // ------------------------------------------------------------------------

    mod action_tests {
        use super::*;

        #[test]
        fn test_render_action_with_label() {
            let mut d = data("lunch", 2700, 0);
            d.label = Some("🍴 45:00".to_string());
            let response = IpcResponse::success("Lunch started", Some(d));
            assert_eq!(Display::render_action(&response), "Lunch started  [🍴 45:00]");
        }

        #[test]
        fn test_render_action_without_data() {
            let response = IpcResponse::success("Shutting down", None);
            assert_eq!(Display::render_action(&response), "Shutting down");
        }
    }

    // ------------------------------------------------------------------------
    // Settings Tests
    // ------------------------------------------------------------------------

    mod settings_tests {
        use super::*;

        #[test]
        fn test_render_settings_defaults() {
            let out = Display::render_settings(&Durations::default());
            assert!(out.contains("Work:          25 min"));
            assert!(out.contains("Long break:    10 min"));
            assert!(out.contains("Lunch:         45 min"));
            assert!(out.ends_with("Pause on lock: on"));
        }

        #[test]
        fn test_render_settings_odd_seconds() {
            let out = Display::render_settings(&Durations::default().with_work(90));
            assert!(out.contains("Work:          01:30"));
        }
    }
}
