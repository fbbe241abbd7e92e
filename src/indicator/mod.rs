//! Status label output for the Pomodoro Timer.
//!
//! This module provides:
//! - Glyph and label text generation (`icon`)
//! - The `LabelSink` trait the daemon renders labels through
//! - `StatusFileWriter`, which keeps a one-line status file current for
//!   status bars such as waybar or polybar
//!
//! # Architecture
//!
//! Labels arrive on every tick. The writer runs on its own thread and is fed
//! through a crossbeam channel, so a slow filesystem never holds up the
//! timer engine (running in tokio).
//!
//! ```ignore
//! use pomodoro_indicator::indicator::{Label, LabelSink, StatusFileWriter};
//!
//! let writer = StatusFileWriter::spawn(StatusFileWriter::default_path())?;
//! writer.update(&Label::paused())?;
//! ```

pub mod icon;

pub use icon::{format_time, glyph_for, Label};

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// LabelError
// ============================================================================

/// Errors from label output.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The writer thread is gone
    #[error("Status label writer is not running")]
    WriterStopped,

    /// Filesystem error
    #[error("Status file error: {0}")]
    Io(String),
}

// ============================================================================
// LabelSink
// ============================================================================

/// Receives label updates for display.
pub trait LabelSink: Send + Sync {
    /// Shows a new label. Must not block.
    fn update(&self, label: &Label) -> Result<(), LabelError>;
}

// ============================================================================
// StatusFileWriter
// ============================================================================

/// File name of the status label.
const STATUS_FILE_NAME: &str = "label";

/// Writes labels to a status file from a background thread.
#[derive(Debug)]
pub struct StatusFileWriter {
    tx: Sender<Label>,
    path: PathBuf,
}

impl StatusFileWriter {
    /// Creates the status directory and starts the writer thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the thread
    /// cannot be spawned.
    pub fn spawn(path: PathBuf) -> Result<Self, LabelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LabelError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let (tx, rx) = unbounded();
        let thread_path = path.clone();
        std::thread::Builder::new()
            .name("pomodoro-label".to_string())
            .spawn(move || write_loop(&thread_path, rx))
            .map_err(|e| LabelError::Io(e.to_string()))?;

        debug!("Status label writer started: {}", path.display());
        Ok(Self { tx, path })
    }

    /// Returns the default status file location.
    ///
    /// Uses `$XDG_RUNTIME_DIR/pomodoro/label`, falling back to the cache
    /// directory and then the temp directory.
    pub fn default_path() -> PathBuf {
        dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("pomodoro")
            .join(STATUS_FILE_NAME)
    }

    /// Returns the status file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LabelSink for StatusFileWriter {
    fn update(&self, label: &Label) -> Result<(), LabelError> {
        self.tx
            .send(label.clone())
            .map_err(|_| LabelError::WriterStopped)
    }
}

/// Writer thread body. Ends when every sender is dropped.
fn write_loop(path: &Path, rx: Receiver<Label>) {
    let mut last: Option<String> = None;

    for label in rx.iter() {
        let line = label.render();
        if last.as_deref() == Some(line.as_str()) {
            continue;
        }
        match write_atomically(path, &line) {
            Ok(()) => last = Some(line),
            Err(e) => warn!("Failed to write status label: {}", e),
        }
    }

    let _ = std::fs::remove_file(path);
    debug!("Status label writer stopped");
}

/// Replaces the file contents via a rename so readers never see a torn line.
fn write_atomically(path: &Path, line: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, format!("{}\n", line))?;
    std::fs::rename(&tmp, path)
}

// ============================================================================
// MockLabelSink
// ============================================================================

/// Label sink that records updates, for testing.
#[derive(Debug, Default)]
pub struct MockLabelSink {
    labels: Mutex<Vec<Label>>,
}

impl MockLabelSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every label received so far.
    pub fn labels(&self) -> Vec<Label> {
        self.labels.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Returns the most recent label.
    pub fn last(&self) -> Option<Label> {
        self.labels.lock().ok().and_then(|l| l.last().cloned())
    }
}

impl LabelSink for MockLabelSink {
    fn update(&self, label: &Label) -> Result<(), LabelError> {
        if let Ok(mut labels) = self.labels.lock() {
            labels.push(label.clone());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
