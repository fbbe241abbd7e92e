//! Sound player implementation using rodio.
//!
//! `RodioSoundPlayer` owns the rodio output stream, which cannot leave the
//! thread that opened it. `SoundWorker` gives the rest of the daemon a
//! `Send + Sync` handle: it starts a dedicated audio thread that owns the
//! player and feeds it through a crossbeam channel.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::SoundPlayer;

/// Chime notes as (frequency Hz, length ms).
const CHIME_NOTES: &[(f32, u64)] = &[(880.0, 150), (660.0, 250)];

/// Chime volume.
const CHIME_AMPLITUDE: f32 = 0.2;

// ============================================================================
// RodioSoundPlayer
// ============================================================================

/// A sound player that uses rodio for audio playback.
///
/// Playback is non-blocking; sounds continue in the background.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Opens the default audio output.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays a sound, falling back to the chime if a file is missing or
    /// cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if no sink can be created.
    pub fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        match source {
            SoundSource::File { name, path } => {
                debug!("Playing sound '{}' from {}", name, path.display());
                match self.play_file(path) {
                    Err(e) if e.should_fallback_to_chime() => {
                        warn!("Failed to play sound '{}': {}, falling back to chime", name, e);
                        self.play_chime()
                    }
                    other => other,
                }
            }
            SoundSource::Chime => self.play_chime(),
        }
    }

    /// Plays a sound file from the filesystem.
    fn play_file(&self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = self.new_sink()?;
        sink.append(decoder);
        sink.detach();
        Ok(())
    }

    /// Plays the generated two-note chime.
    fn play_chime(&self) -> Result<(), SoundError> {
        let sink = self.new_sink()?;
        for &(frequency, millis) in CHIME_NOTES {
            sink.append(
                SineWave::new(frequency)
                    .take_duration(Duration::from_millis(millis))
                    .amplify(CHIME_AMPLITUDE),
            );
        }
        sink.detach();
        Ok(())
    }

    fn new_sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

// ============================================================================
// SoundWorker
// ============================================================================

/// Handle to the audio thread.
///
/// If no audio device can be opened the thread keeps draining requests, so
/// callers never notice the difference beyond a single warning.
#[derive(Debug)]
pub struct SoundWorker {
    tx: Sender<SoundSource>,
    disabled: bool,
}

impl SoundWorker {
    /// Starts the audio thread. A disabled worker never opens the audio
    /// device and starts no thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(disabled: bool) -> Result<Self, SoundError> {
        let (tx, rx) = unbounded();

        if !disabled {
            std::thread::Builder::new()
                .name("pomodoro-audio".to_string())
                .spawn(move || audio_loop(rx))
                .map_err(|e| SoundError::StreamError(e.to_string()))?;
        }

        Ok(Self { tx, disabled })
    }
}

impl SoundPlayer for SoundWorker {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.is_disabled() {
            debug!("Sound playback disabled, skipping '{}'", source.name());
            return Ok(());
        }
        self.tx
            .send(source.clone())
            .map_err(|_| SoundError::WorkerStopped)
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Audio thread body. Ends when the worker handle is dropped.
fn audio_loop(rx: Receiver<SoundSource>) {
    let player = match RodioSoundPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    };

    for source in rx.iter() {
        if let Some(player) = &player {
            if let Err(e) = player.play(&source) {
                warn!("Failed to play sound '{}': {}", source.name(), e);
            }
        }
    }

    debug!("Audio thread stopped");
}
