//! Timer engine for the Pomodoro Timer.
//!
//! This module provides the core timer functionality:
//! - State transitions (Work → Break → Work, Lunch → Walk → Work)
//! - Manual and lock-triggered pause/resume
//! - Long break after every 4th completed work period
//! - Event firing for notifications, sounds and the status label
//!
//! The engine never fails. Every command is accepted in every state, and
//! events go out on an unbounded channel so the caller never waits on
//! whoever renders them.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::indicator::Label;
use crate::types::{Durations, Session, SessionState};

/// Every Nth completed work period is followed by a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

// ============================================================================
// TimerEvent
// ============================================================================

/// A desktop notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// State the timer is in once the notification fires; selects the sound
    pub category: SessionState,
    pub play_sound: bool,
}

/// Events emitted by the engine for the collaborators to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Show a notification (and maybe play a sound)
    Notify(Notification),
    /// Update the status label
    Label(Label),
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the session and enforces every transition.
pub struct TimerEngine {
    /// Current session
    session: Session,
    /// Period lengths; replacements apply from the next state entry
    durations: Durations,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a stopped engine with the given durations and event channel.
    pub fn new(durations: Durations, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            session: Session::new(),
            durations,
            event_tx,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts a work period, overriding whatever was running.
    pub fn start_work(&mut self) {
        let seconds = self.enter(SessionState::Work);
        info!("Work started ({}s)", seconds);

        self.notify("Work Started", format!("Focus for {} minutes", seconds / 60), true);
        self.emit_current_label();
    }

    /// Starts lunch, overriding whatever was running.
    pub fn start_lunch(&mut self) {
        let seconds = self.enter(SessionState::Lunch);
        info!("Lunch started ({}s)", seconds);

        self.notify("Lunch Time", format!("{} minutes", seconds / 60), true);
        self.emit_current_label();
    }

    /// Stops the timer from any state. The cycle count is kept.
    pub fn stop(&mut self) {
        self.session.stop();
        info!("Timer stopped");

        self.emit(TimerEvent::Label(Label::stopped()));
        self.notify(
            "Timer Stopped",
            "You can start a new session when ready".to_string(),
            false,
        );
    }

    /// Pauses, or resumes if already paused.
    ///
    /// Pausing a stopped timer is allowed and simply resumes to `Stopped`.
    /// Resuming clears any lock-triggered flag.
    pub fn toggle_pause(&mut self) {
        if self.session.is_paused() {
            self.session.resume();
            info!("Resumed to {}", self.session.state);
            self.notify("Resumed", String::new(), true);
        } else {
            self.session.pause(false);
            info!("Paused from {:?}", self.session.prev_state());
            self.notify("Paused", String::new(), true);
        }
        self.emit_current_label();
    }

    // ------------------------------------------------------------------------
    // External events
    // ------------------------------------------------------------------------

    /// Handles a session lock edge.
    ///
    /// Locking silently pauses a running timer. Unlocking resumes only a
    /// pause that a lock caused; a manual pause stays paused.
    pub fn on_lock_changed(&mut self, locked: bool) {
        if !self.durations.pause_on_lock {
            debug!("Ignoring lock change (locked={}): pause_on_lock is off", locked);
            return;
        }

        if locked {
            if !self.session.is_running() {
                debug!("Session locked while {}, nothing to pause", self.session.state);
                return;
            }
            self.session.pause(true);
            info!("Session locked, paused {:?}", self.session.prev_state());
            self.emit(TimerEvent::Label(Label::paused()));
        } else {
            if !self.session.is_lock_triggered() {
                debug!("Session unlocked, no lock-triggered pause to resume");
                return;
            }
            self.session.resume();
            info!("Session unlocked, resumed {}", self.session.state);
            self.notify("Resumed After Unlock", String::new(), true);
            self.emit_current_label();
        }
    }

    /// Advances the countdown by one unit.
    ///
    /// Always asks to be scheduled again.
    pub fn tick(&mut self) -> ControlFlow<()> {
        let state = self.session.state;

        if state.is_active() {
            let exhausted = self.session.tick();
            self.emit(TimerEvent::Label(Label::countdown(
                state,
                self.session.remaining_seconds,
            )));
            if exhausted {
                self.expire(state);
            }
        } else if self.session.is_paused() {
            self.emit(TimerEvent::Label(Label::paused()));
        } else {
            self.emit(TimerEvent::Label(Label::idle()));
        }

        ControlFlow::Continue(())
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Replaces the durations wholesale.
    ///
    /// The remaining time of the current period is left untouched.
    pub fn replace_durations(&mut self, durations: Durations) {
        info!("Durations replaced: {:?}", durations);
        self.durations = durations;
        self.notify("Settings Saved", "Durations updated".to_string(), true);
    }

    /// Sends a free-form notification, categorized by the current state.
    pub fn announce(&self, title: &str, body: &str) {
        self.notify(title, body.to_string(), true);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns a reference to the current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the active durations.
    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    /// Returns a mutable reference to the session (for testing).
    #[cfg(test)]
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Performs the expiry transition out of `from`.
    fn expire(&mut self, from: SessionState) {
        match from {
            SessionState::Work => {
                let cycles = self.session.complete_work();
                info!("Work period completed (cycles={})", cycles);
                self.start_break(cycles % LONG_BREAK_INTERVAL == 0);
            }
            SessionState::ShortBreak | SessionState::LongBreak | SessionState::Walk => {
                self.start_work();
            }
            SessionState::Lunch => self.start_walk(),
            SessionState::Stopped | SessionState::Paused => {}
        }
    }

    fn start_break(&mut self, long: bool) {
        let (state, title) = if long {
            (SessionState::LongBreak, "Long Break")
        } else {
            (SessionState::ShortBreak, "Short Break")
        };
        let seconds = self.enter(state);
        info!("{} started ({}s)", title, seconds);

        self.notify(title, format!("Take a {} minute break!", seconds / 60), true);
        self.emit_current_label();
    }

    /// Enters a counting state with its configured length.
    fn enter(&mut self, state: SessionState) -> u32 {
        let seconds = self.durations.seconds_for(state).unwrap_or_default();
        self.session.enter(state, seconds);
        seconds
    }

    fn start_walk(&mut self) {
        let seconds = self.enter(SessionState::Walk);
        info!("Walk started ({}s)", seconds);

        self.notify("Walk Break", format!("Take a {} minute walk!", seconds / 60), true);
        self.emit_current_label();
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    fn notify(&self, title: &str, body: String, play_sound: bool) {
        self.emit(TimerEvent::Notify(Notification {
            title: title.to_string(),
            body,
            category: self.session.state,
            play_sound,
        }));
    }

    fn emit_current_label(&self) {
        self.emit(TimerEvent::Label(Label::for_session(&self.session)));
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Timer event dropped: receiver closed");
        }
    }
}

// ============================================================================
// Tick scheduler
// ============================================================================

/// Drives `tick` on a fixed period until the engine asks to stop.
///
/// Missed ticks are skipped rather than replayed in a burst.
pub async fn run_ticker(engine: Arc<Mutex<TimerEngine>>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if engine.lock().await.tick().is_break() {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
