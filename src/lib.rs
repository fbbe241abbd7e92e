//! Pomodoro Timer Library
//!
//! This library provides the core functionality for the Pomodoro Timer.
//! It includes:
//! - Timer engine with work/break cycles, lunch/walk mode and pause-on-lock
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Type definitions for durations, session state and IPC messages
//! - Durations persistence
//! - Desktop notifications via the freedesktop notification server
//! - Sound playback for timer notifications
//! - Status label output for status bars

pub mod cli;
pub mod config;
pub mod daemon;
pub mod indicator;
pub mod notification;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Durations, IpcRequest, IpcResponse, ResponseData, Session, SessionState, SettingsParams,
};

pub use config::{ConfigError, ConfigStore};

pub use daemon::{DaemonOptions, EventDispatcher, Notification, TimerEngine, TimerEvent};

pub use indicator::{Label, LabelError, LabelSink, MockLabelSink, StatusFileWriter};

pub use notification::{
    DesktopNotifier, MockNotificationSender, NotificationError, NotificationSender,
};

pub use sound::{
    MockSoundPlayer, RodioSoundPlayer, SoundCue, SoundError, SoundPlayer, SoundSource,
    SoundWorker,
};
