//! Sound system error types.
//!
//! None of these ever reach the timer engine; the dispatcher logs them and
//! moves on.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no sound server running).
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("Sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("Failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output sink.
    #[error("Failed to create audio stream: {0}")]
    StreamError(String),

    /// The audio thread has exited.
    #[error("Audio thread is not running")]
    WorkerStopped,
}

impl SoundError {
    /// Returns true if playback should fall back to the generated chime.
    #[must_use]
    pub fn should_fallback_to_chime(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }
}
