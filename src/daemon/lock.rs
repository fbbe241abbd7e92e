//! Session lock monitor.
//!
//! Watches the GNOME screensaver `ActiveChanged` signal by running
//! `dbus-monitor` and parsing its text output. Each signal is followed by a
//! `boolean true|false` line carrying the new lock state, e.g.:
//!
//! ```text
//! signal time=1700000000.1 sender=:1.23 -> destination=(null destination) serial=42 path=/org/gnome/ScreenSaver; interface=org.gnome.ScreenSaver; member=ActiveChanged
//!    boolean true
//! ```

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::timer::TimerEngine;

const DBUS_MONITOR: &str = "dbus-monitor";

/// Match rule for the screensaver signal.
const SCREENSAVER_MATCH: &str =
    "type='signal',interface='org.gnome.ScreenSaver',member='ActiveChanged'";

const SIGNAL_MEMBER: &str = "member=ActiveChanged";

// ============================================================================
// LockSignalParser
// ============================================================================

/// Line-by-line parser for `dbus-monitor` output.
#[derive(Debug, Default)]
pub struct LockSignalParser {
    /// Set after an `ActiveChanged` header until its payload arrives
    awaiting_payload: bool,
}

impl LockSignalParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one output line; returns the lock state once a full signal
    /// has been read.
    pub fn feed(&mut self, line: &str) -> Option<bool> {
        let line = line.trim();

        if line.starts_with("signal ") || line.starts_with("method ") {
            self.awaiting_payload = line.contains(SIGNAL_MEMBER);
            return None;
        }

        if !self.awaiting_payload {
            return None;
        }

        let value = match line.strip_prefix("boolean ")? {
            "true" => true,
            "false" => false,
            _ => return None,
        };
        self.awaiting_payload = false;
        Some(value)
    }
}

// ============================================================================
// Monitor task
// ============================================================================

/// Runs the lock monitor until `dbus-monitor` exits.
///
/// Failures are logged; the daemon keeps running without lock monitoring.
pub async fn run_lock_monitor(engine: Arc<Mutex<TimerEngine>>) {
    match monitor(engine).await {
        Ok(()) => warn!("Lock monitor stream closed; pause-on-lock is inactive"),
        Err(e) => warn!("Lock monitor unavailable: {:#}", e),
    }
}

async fn monitor(engine: Arc<Mutex<TimerEngine>>) -> Result<()> {
    let mut child = Command::new(DBUS_MONITOR)
        .arg("--session")
        .arg(SCREENSAVER_MATCH)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start {}", DBUS_MONITOR))?;

    let stdout = child
        .stdout
        .take()
        .context("dbus-monitor stdout not captured")?;

    info!("Watching session lock via {}", DBUS_MONITOR);
    watch_lines(BufReader::new(stdout), engine).await
}

/// Applies every lock edge read from `reader` to the engine, in order.
pub async fn watch_lines<R>(reader: R, engine: Arc<Mutex<TimerEngine>>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = LockSignalParser::new();
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read lock monitor output")?
    {
        if let Some(locked) = parser.feed(&line) {
            debug!("Screensaver ActiveChanged: {}", locked);
            engine.lock().await.on_lock_changed(locked);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Durations, SessionState};
    use tokio::sync::mpsc;

    const HEADER: &str = "signal time=1700000000.1 sender=:1.23 -> destination=(null destination) serial=42 path=/org/gnome/ScreenSaver; interface=org.gnome.ScreenSaver; member=ActiveChanged";

    mod parser_tests {
        use super::*;

        #[test]
        fn test_header_then_payload() {
            let mut parser = LockSignalParser::new();
            assert_eq!(parser.feed(HEADER), None);
            assert_eq!(parser.feed("   boolean true"), Some(true));

            assert_eq!(parser.feed(HEADER), None);
            assert_eq!(parser.feed("   boolean false"), Some(false));
        }

        #[test]
        fn test_payload_without_header_ignored() {
            let mut parser = LockSignalParser::new();
            assert_eq!(parser.feed("   boolean true"), None);
        }

        #[test]
        fn test_other_signal_resets() {
            let mut parser = LockSignalParser::new();
            parser.feed(HEADER);
            parser.feed("signal time=1 sender=org.freedesktop.DBus -> destination=:1.9 serial=2 path=/org/freedesktop/DBus; interface=org.freedesktop.DBus; member=NameAcquired");
            assert_eq!(parser.feed("   boolean true"), None);
        }

        #[test]
        fn test_payload_consumed_once() {
            let mut parser = LockSignalParser::new();
            parser.feed(HEADER);
            assert_eq!(parser.feed("   boolean true"), Some(true));
            assert_eq!(parser.feed("   boolean false"), None);
        }

        #[test]
        fn test_unrelated_lines_ignored() {
            let mut parser = LockSignalParser::new();
            parser.feed(HEADER);
            assert_eq!(parser.feed("   string \"hello\""), None);
            assert_eq!(parser.feed("   boolean maybe"), None);
            assert_eq!(parser.feed("   boolean true"), Some(true));
        }
    }

    mod watch_tests {
        use super::*;

        #[tokio::test]
        async fn test_watch_lines_applies_edges_in_order() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let engine = Arc::new(Mutex::new(TimerEngine::new(Durations::default(), tx)));
            engine.lock().await.start_work();

            let output = format!("{HEADER}\n   boolean true\n");
            watch_lines(output.as_bytes(), Arc::clone(&engine))
                .await
                .unwrap();
            {
                let engine = engine.lock().await;
                assert_eq!(engine.session().state, SessionState::Paused);
                assert!(engine.session().is_lock_triggered());
            }

            let output = format!("{HEADER}\n   boolean false\n");
            watch_lines(output.as_bytes(), Arc::clone(&engine))
                .await
                .unwrap();
            assert_eq!(engine.lock().await.session().state, SessionState::Work);
        }

        #[tokio::test]
        async fn test_watch_lines_lock_unlock_in_one_stream() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let engine = Arc::new(Mutex::new(TimerEngine::new(Durations::default(), tx)));
            engine.lock().await.start_lunch();

            let output = format!("{HEADER}\n   boolean true\n{HEADER}\n   boolean false\n");
            watch_lines(output.as_bytes(), Arc::clone(&engine))
                .await
                .unwrap();

            let engine = engine.lock().await;
            assert_eq!(engine.session().state, SessionState::Lunch);
            assert_eq!(engine.session().remaining_seconds, 2700);
        }
    }
}
