//! Sound playback system for the Pomodoro Timer.
//!
//! This module provides audio cues for notifications:
//!
//! - Category → asset selection (`SoundCue`)
//! - Non-blocking playback on a dedicated audio thread (`SoundWorker`)
//! - A generated chime when a theme sound is missing
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  crossbeam  ┌──────────────────┐
//! │   SoundWorker    │────────────▶│ RodioSoundPlayer │
//! │ (Send + Sync)    │             │ (audio thread)   │
//! └──────────────────┘             └────────┬─────────┘
//!                                           │
//!                         ┌─────────────────┴──────────┐
//!                         ▼                            ▼
//!                ┌──────────────────┐        ┌──────────────────┐
//!                │ freedesktop .oga │        │  sine-wave chime │
//!                └──────────────────┘        │  (fallback)      │
//!                                            └──────────────────┘
//! ```

mod error;
mod player;
mod source;

pub use error::SoundError;
pub use player::{RodioSoundPlayer, SoundWorker};
pub use source::{SoundCue, SoundSource, FREEDESKTOP_SOUND_DIR};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for sound playback implementations.
///
/// Allows the dispatcher to run against a real audio thread or a mock.
pub trait SoundPlayer: Send + Sync {
    /// Queues a sound. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the sound cannot be queued.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    disabled: bool,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A player that behaves like the daemon under `--no-sound`.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::StreamError("Mock failure".to_string()));
        }
        if self.disabled {
            return Ok(());
        }
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.push(source.clone());
        }
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let player = MockSoundPlayer::new();
        player.play(&SoundCue::Break.source()).unwrap();
        player.play(&SoundSource::Chime).unwrap();

        assert_eq!(player.play_count(), 2);
        assert_eq!(player.get_play_calls()[0].name(), "break");
    }

    #[test]
    fn test_mock_disabled_skips() {
        let player = MockSoundPlayer::disabled();
        player.play(&SoundSource::Chime).unwrap();

        assert!(player.is_disabled());
        assert_eq!(player.play_count(), 0);
    }

    #[test]
    fn test_mock_failure() {
        let player = MockSoundPlayer::new();
        player.set_should_fail(true);

        assert!(player.play(&SoundSource::Chime).is_err());
    }
}
