//! Glyphs and label text for the status surface.
//!
//! This module handles:
//! - Mapping each session state to its glyph
//! - Generating label text (e.g., "☕ 04:59")
//!
//! The text generation logic is pure and fully testable.

use serde::{Deserialize, Serialize};

use crate::types::{Session, SessionState};

// ============================================================================
// Constants
// ============================================================================

/// Glyph for a work period (none)
const WORK_GLYPH: &str = "";

/// Glyph for short and long breaks
const BREAK_GLYPH: &str = "☕";

/// Glyph for lunch
const LUNCH_GLYPH: &str = "🍴";

/// Glyph for the walk after lunch
const WALK_GLYPH: &str = "🚶";

/// Glyph for a paused timer
const PAUSED_GLYPH: &str = "⏸";

/// Glyph for a stopped timer
const STOPPED_GLYPH: &str = "⏹";

/// Returns the glyph shown for a state.
pub fn glyph_for(state: SessionState) -> &'static str {
    match state {
        SessionState::Work => WORK_GLYPH,
        SessionState::ShortBreak | SessionState::LongBreak => BREAK_GLYPH,
        SessionState::Lunch => LUNCH_GLYPH,
        SessionState::Walk => WALK_GLYPH,
        SessionState::Paused => PAUSED_GLYPH,
        SessionState::Stopped => STOPPED_GLYPH,
    }
}

/// Formats remaining seconds as MM:SS.
pub fn format_time(remaining_seconds: u32) -> String {
    let minutes = remaining_seconds / 60;
    let seconds = remaining_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

// ============================================================================
// Label
// ============================================================================

/// A status label: a glyph plus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub glyph: String,
    pub text: String,
}

impl Label {
    pub fn new(glyph: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            text: text.into(),
        }
    }

    /// Countdown label for a counting state.
    pub fn countdown(state: SessionState, remaining_seconds: u32) -> Self {
        Self::new(glyph_for(state), format_time(remaining_seconds))
    }

    pub fn paused() -> Self {
        Self::new(PAUSED_GLYPH, "Paused")
    }

    /// Label shown on ticks while nothing runs.
    pub fn idle() -> Self {
        Self::new("", "Idle")
    }

    /// Label shown right after the timer is stopped.
    pub fn stopped() -> Self {
        Self::new(STOPPED_GLYPH, "Stopped")
    }

    /// Returns the steady-state label for a session.
    pub fn for_session(session: &Session) -> Self {
        match session.state {
            SessionState::Paused => Self::paused(),
            SessionState::Stopped => Self::idle(),
            state => Self::countdown(state, session.remaining_seconds),
        }
    }

    /// Renders the label as a single line.
    pub fn render(&self) -> String {
        if self.glyph.is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.glyph, self.text)
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_mapping() {
        assert_eq!(glyph_for(SessionState::Work), "");
        assert_eq!(glyph_for(SessionState::ShortBreak), "☕");
        assert_eq!(glyph_for(SessionState::LongBreak), "☕");
        assert_eq!(glyph_for(SessionState::Lunch), "🍴");
        assert_eq!(glyph_for(SessionState::Walk), "🚶");
        assert_eq!(glyph_for(SessionState::Paused), "⏸");
        assert_eq!(glyph_for(SessionState::Stopped), "⏹");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(1499), "24:59");
        assert_eq!(format_time(120 * 60 + 5), "120:05");
    }

    #[test]
    fn test_work_label_has_no_glyph() {
        let label = Label::countdown(SessionState::Work, 1500);
        assert_eq!(label.render(), "25:00");
    }

    #[test]
    fn test_render_with_glyph() {
        assert_eq!(Label::countdown(SessionState::Lunch, 65).render(), "🍴 01:05");
        assert_eq!(Label::paused().render(), "⏸ Paused");
        assert_eq!(Label::stopped().render(), "⏹ Stopped");
        assert_eq!(Label::idle().render(), "Idle");
    }

    #[test]
    fn test_for_session() {
        let mut session = Session::new();
        assert_eq!(Label::for_session(&session), Label::idle());

        session.enter(SessionState::Walk, 300);
        assert_eq!(Label::for_session(&session).render(), "🚶 05:00");

        session.pause(false);
        assert_eq!(Label::for_session(&session), Label::paused());
    }
}
