//! IPC Server for the Pomodoro Timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Integration with TimerEngine and ConfigStore for command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::config::ConfigStore;
use crate::types::{IpcRequest, IpcResponse, ResponseData, SettingsParams};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Socket location relative to the home directory
const SOCKET_RELATIVE_PATH: &str = ".pomodoro/pomodoro.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns `~/.pomodoro/pomodoro.sock`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(SOCKET_RELATIVE_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Client hung up before sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Another daemon is listening on the socket
    #[error("A daemon is already running on {}", .0.display())]
    AlreadyRunning(PathBuf),
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// A stale socket file left by a previous daemon is removed first. A
    /// socket that still accepts connections is left alone.
    ///
    /// # Errors
    ///
    /// Returns `IpcError::AlreadyRunning` if another daemon is listening on
    /// the path, or an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            if std::os::unix::net::UnixStream::connect(socket_path).is_ok() {
                return Err(IpcError::AlreadyRunning(socket_path.to_path_buf()).into());
            }
            debug!("Removing stale socket {}", socket_path.display());
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        info!("Listening on {}", socket_path.display());
        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, an oversized request, or invalid JSON.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to TimerEngine.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Where settings changes are persisted
    store: ConfigStore,
}

impl RequestHandler {
    pub fn new(engine: Arc<Mutex<TimerEngine>>, store: ConfigStore) -> Self {
        Self { engine, store }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// Every timer command is legal in every state, so only `settings`
    /// can produce an error response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match request {
            IpcRequest::Work => {
                engine.start_work();
                Self::respond("Work started", &engine)
            }
            IpcRequest::Lunch => {
                engine.start_lunch();
                Self::respond("Lunch started", &engine)
            }
            IpcRequest::Toggle => {
                engine.toggle_pause();
                let message = if engine.session().is_paused() {
                    "Paused"
                } else {
                    "Resumed"
                };
                Self::respond(message, &engine)
            }
            IpcRequest::Stop => {
                engine.stop();
                Self::respond("Timer stopped", &engine)
            }
            IpcRequest::Status => Self::respond("", &engine),
            IpcRequest::Settings { params } => self.handle_settings(&mut engine, &params),
            IpcRequest::Lock { locked } => {
                engine.on_lock_changed(locked);
                let message = match (locked, engine.durations().pause_on_lock) {
                    (true, true) => "Session locked",
                    (false, true) => "Session unlocked",
                    (true, false) => "Session locked (pause-on-lock disabled)",
                    (false, false) => "Session unlocked (pause-on-lock disabled)",
                };
                Self::respond(message, &engine)
            }
            IpcRequest::Quit => {
                info!("Quit requested");
                Self::respond("Shutting down", &engine)
            }
        }
    }

    /// Merges, validates and persists new durations, then hands them to
    /// the engine. An empty update just reports the current durations.
    fn handle_settings(&self, engine: &mut TimerEngine, params: &SettingsParams) -> IpcResponse {
        if params.is_empty() {
            let data = ResponseData::from_session(engine.session())
                .with_settings(engine.durations().clone());
            return IpcResponse::success("Current settings", Some(data));
        }

        let durations = match params.apply_to(engine.durations()) {
            Ok(durations) => durations,
            Err(e) => {
                warn!("Rejected settings: {}", e);
                engine.announce("Error", "Invalid input");
                return IpcResponse::error(e);
            }
        };

        if let Err(e) = self.store.save(&durations) {
            warn!("Failed to save settings: {}", e);
            engine.announce("Error", "Could not save settings");
            return IpcResponse::error(e.to_string());
        }

        engine.replace_durations(durations.clone());
        let data = ResponseData::from_session(engine.session()).with_settings(durations);
        IpcResponse::success("Settings saved", Some(data))
    }

    fn respond(message: &str, engine: &TimerEngine) -> IpcResponse {
        IpcResponse::success(message, Some(ResponseData::from_session(engine.session())))
    }
}

// ============================================================================
// Tests
// ============================================================================
