//! Sound source selection.
//!
//! Maps a notification category to one of the freedesktop sound theme
//! assets. Anything not covered gets the default bell.

use std::path::{Path, PathBuf};

use crate::types::SessionState;

/// Where the freedesktop sound theme installs its stereo sounds.
pub const FREEDESKTOP_SOUND_DIR: &str = "/usr/share/sounds/freedesktop/stereo";

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A sound file on disk.
    File {
        /// Asset name (e.g., "break")
        name: String,
        /// Full path to the sound file
        path: PathBuf,
    },
    /// A short tone generated in-process.
    Chime,
}

impl SoundSource {
    /// Creates a file sound source.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Chime => "chime",
        }
    }

    /// Returns the file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Chime => None,
        }
    }
}

/// The sound assets a notification can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Break,
    Lunch,
    Walk,
    Default,
}

impl SoundCue {
    /// Selects the cue for a notification category.
    #[must_use]
    pub fn for_state(state: SessionState) -> Self {
        match state {
            SessionState::ShortBreak | SessionState::LongBreak => Self::Break,
            SessionState::Lunch => Self::Lunch,
            SessionState::Walk => Self::Walk,
            SessionState::Work | SessionState::Paused | SessionState::Stopped => Self::Default,
        }
    }

    /// Asset name of the cue.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Lunch => "lunch",
            Self::Walk => "walk",
            Self::Default => "default",
        }
    }

    /// File name inside the freedesktop theme.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Break | Self::Walk => "alarm-clock-elapsed.oga",
            Self::Lunch => "power-unplug.oga",
            Self::Default => "bell.oga",
        }
    }

    /// Returns the source for this cue under `dir`.
    #[must_use]
    pub fn source_in(&self, dir: &Path) -> SoundSource {
        SoundSource::file(self.name(), dir.join(self.file_name()))
    }

    /// Returns the source for this cue in the freedesktop theme.
    #[must_use]
    pub fn source(&self) -> SoundSource {
        self.source_in(Path::new(FREEDESKTOP_SOUND_DIR))
    }
}
