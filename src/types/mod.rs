//! Core data types for the Pomodoro Timer.
//!
//! This module defines the data structures used for:
//! - Session state (the phase the timer is in)
//! - Durations configuration and settings validation
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

use crate::indicator::Label;

// ============================================================================
// SessionState
// ============================================================================

/// Represents the current phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Timer is idle
    #[default]
    Stopped,
    /// Currently in a work period
    Work,
    /// Currently in a short break
    ShortBreak,
    /// Currently in a long break (every 4th completed work period)
    LongBreak,
    /// Currently at lunch
    Lunch,
    /// Walking after lunch
    Walk,
    /// Timer is paused (manually or by a session lock)
    Paused,
}

impl SessionState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Stopped => "stopped",
            SessionState::Work => "work",
            SessionState::ShortBreak => "short_break",
            SessionState::LongBreak => "long_break",
            SessionState::Lunch => "lunch",
            SessionState::Walk => "walk",
            SessionState::Paused => "paused",
        }
    }

    /// Returns true if the timer is counting down in this state.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Work
                | SessionState::ShortBreak
                | SessionState::LongBreak
                | SessionState::Lunch
                | SessionState::Walk
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Durations
// ============================================================================

/// Period lengths in seconds, plus the pause-on-lock switch.
///
/// Serialized as a flat JSON object; missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Durations {
    /// Work period length
    pub work: u32,
    /// Short break length
    pub short_break: u32,
    /// Long break length
    pub long_break: u32,
    /// Lunch length
    pub lunch: u32,
    /// Walk-after-lunch length
    pub walk_after_lunch: u32,
    /// Whether a session lock pauses the timer
    pub pause_on_lock: bool,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work: 25 * 60,
            short_break: 5 * 60,
            long_break: 10 * 60,
            lunch: 45 * 60,
            walk_after_lunch: 5 * 60,
            pause_on_lock: true,
        }
    }
}

impl Durations {
    /// Sets the work length in seconds.
    pub fn with_work(mut self, seconds: u32) -> Self {
        self.work = seconds;
        self
    }

    /// Sets the short break length in seconds.
    pub fn with_short_break(mut self, seconds: u32) -> Self {
        self.short_break = seconds;
        self
    }

    /// Sets the long break length in seconds.
    pub fn with_long_break(mut self, seconds: u32) -> Self {
        self.long_break = seconds;
        self
    }

    /// Sets the lunch length in seconds.
    pub fn with_lunch(mut self, seconds: u32) -> Self {
        self.lunch = seconds;
        self
    }

    /// Sets the walk length in seconds.
    pub fn with_walk_after_lunch(mut self, seconds: u32) -> Self {
        self.walk_after_lunch = seconds;
        self
    }

    /// Sets the pause-on-lock switch.
    pub fn with_pause_on_lock(mut self, enabled: bool) -> Self {
        self.pause_on_lock = enabled;
        self
    }

    /// Returns the configured length of a counting state.
    ///
    /// `Stopped` and `Paused` have no length and return `None`.
    pub fn seconds_for(&self, state: SessionState) -> Option<u32> {
        match state {
            SessionState::Work => Some(self.work),
            SessionState::ShortBreak => Some(self.short_break),
            SessionState::LongBreak => Some(self.long_break),
            SessionState::Lunch => Some(self.lunch),
            SessionState::Walk => Some(self.walk_after_lunch),
            SessionState::Stopped | SessionState::Paused => None,
        }
    }
}

/// Smallest value accepted by the settings command, in minutes.
pub const MIN_SETTING_MINUTES: u32 = 1;

/// Largest value accepted by the settings command, in minutes.
pub const MAX_SETTING_MINUTES: u32 = 24 * 60;

/// Settings update, with period lengths given in minutes.
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsParams {
    #[serde(rename = "workMinutes", skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<u32>,
    #[serde(rename = "shortBreakMinutes", skip_serializing_if = "Option::is_none")]
    pub short_break_minutes: Option<u32>,
    #[serde(rename = "longBreakMinutes", skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<u32>,
    #[serde(rename = "lunchMinutes", skip_serializing_if = "Option::is_none")]
    pub lunch_minutes: Option<u32>,
    #[serde(rename = "walkMinutes", skip_serializing_if = "Option::is_none")]
    pub walk_minutes: Option<u32>,
    #[serde(rename = "pauseOnLock", skip_serializing_if = "Option::is_none")]
    pub pause_on_lock: Option<bool>,
}

impl SettingsParams {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges these settings over `current`.
    ///
    /// Returns an error message if any minute value is out of range.
    pub fn apply_to(&self, current: &Durations) -> Result<Durations, String> {
        fn merge(name: &str, minutes: Option<u32>, current: u32) -> Result<u32, String> {
            match minutes {
                None => Ok(current),
                Some(m) if (MIN_SETTING_MINUTES..=MAX_SETTING_MINUTES).contains(&m) => Ok(m * 60),
                Some(m) => Err(format!(
                    "{name} must be between {MIN_SETTING_MINUTES} and {MAX_SETTING_MINUTES} minutes (got {m})"
                )),
            }
        }

        Ok(Durations {
            work: merge("work", self.work_minutes, current.work)?,
            short_break: merge("short break", self.short_break_minutes, current.short_break)?,
            long_break: merge("long break", self.long_break_minutes, current.long_break)?,
            lunch: merge("lunch", self.lunch_minutes, current.lunch)?,
            walk_after_lunch: merge("walk", self.walk_minutes, current.walk_after_lunch)?,
            pause_on_lock: self.pause_on_lock.unwrap_or(current.pause_on_lock),
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// The mutable timer session owned by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Current state
    pub state: SessionState,
    /// Remaining seconds in the current state
    pub remaining_seconds: u32,
    /// Completed work periods
    pub cycles: u32,
    /// State to restore on resume
    #[serde(skip_serializing_if = "Option::is_none")]
    prev_state: Option<SessionState>,
    /// Whether the current pause came from a session lock
    lock_triggered: bool,
}

impl Session {
    /// Creates a stopped session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a counting state with a fresh countdown.
    ///
    /// Any saved resume target is discarded.
    pub fn enter(&mut self, state: SessionState, remaining_seconds: u32) {
        self.state = state;
        self.remaining_seconds = remaining_seconds;
        self.prev_state = None;
        self.lock_triggered = false;
    }

    /// Pauses, remembering the current state. Remaining time is kept.
    pub fn pause(&mut self, lock_triggered: bool) {
        self.prev_state = Some(self.state);
        self.state = SessionState::Paused;
        self.lock_triggered = lock_triggered;
    }

    /// Restores the state saved by `pause`.
    pub fn resume(&mut self) {
        self.state = self.prev_state.take().unwrap_or(SessionState::Stopped);
        self.lock_triggered = false;
    }

    /// Stops the timer. The cycle count survives.
    pub fn stop(&mut self) {
        self.state = SessionState::Stopped;
        self.remaining_seconds = 0;
        self.prev_state = None;
        self.lock_triggered = false;
    }

    /// Decrements the countdown by one second, saturating at zero.
    ///
    /// Returns true once the countdown is exhausted.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }

    /// Records a completed work period and returns the new count.
    pub fn complete_work(&mut self) -> u32 {
        self.cycles += 1;
        self.cycles
    }

    /// Returns the state a resume would restore.
    pub fn prev_state(&self) -> Option<SessionState> {
        self.prev_state
    }

    /// Returns true if the current pause came from a session lock.
    pub fn is_lock_triggered(&self) -> bool {
        self.lock_triggered
    }

    /// Returns true if the timer is counting down.
    pub fn is_running(&self) -> bool {
        self.state.is_active()
    }

    /// Returns true if the timer is paused.
    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start a work period
    Work,
    /// Start lunch
    Lunch,
    /// Pause, or resume if paused
    Toggle,
    /// Stop the timer
    Stop,
    /// Query the current status
    Status,
    /// Replace durations
    Settings {
        #[serde(flatten)]
        params: SettingsParams,
    },
    /// Report a session lock edge
    Lock {
        /// True when the session locked
        locked: bool,
    },
    /// Shut the daemon down
    Quit,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Completed work periods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    /// Rendered status label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether the current pause came from a session lock
    #[serde(rename = "lockPaused", skip_serializing_if = "Option::is_none")]
    pub lock_paused: Option<bool>,
    /// Active durations (settings responses only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Durations>,
}

impl ResponseData {
    /// Creates response data from a session.
    pub fn from_session(session: &Session) -> Self {
        Self {
            state: Some(session.state.as_str().to_string()),
            remaining_seconds: Some(session.remaining_seconds),
            cycles: Some(session.cycles),
            label: Some(Label::for_session(session).render()),
            lock_paused: Some(session.is_lock_triggered()),
            settings: None,
        }
    }

    /// Attaches the active durations.
    pub fn with_settings(mut self, durations: Durations) -> Self {
        self.settings = Some(durations);
        self
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for a success response.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
