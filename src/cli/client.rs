//! IPC Client for communicating with the Pomodoro Timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::daemon::default_socket_path;
use crate::types::{IpcRequest, IpcResponse, SettingsParams};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    pub async fn work(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Work).await
    }

    pub async fn lunch(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Lunch).await
    }

    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Toggle).await
    }

    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Stop).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends new durations; empty params query the current ones.
    pub async fn settings(&self, params: SettingsParams) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Settings { params })
            .await
    }

    /// Reports a session lock edge.
    pub async fn lock(&self, locked: bool) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Lock { locked })
            .await
    }

    pub async fn quit(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Quit).await
    }

    /// Sends a request, retrying transport failures.
    ///
    /// An error response from the daemon is final and is returned as `Err`.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => anyhow::bail!("{}", response.message),
                Err(e) => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Request was not sent")))
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("Cannot connect to the daemon. Start it with 'pomodoro daemon'")?;

        let request_json =
            serde_json::to_string(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Signals end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down write side")?;

        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if n == 0 {
            anyhow::bail!("No response from the daemon");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer[..n]).context("Failed to parse response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseData;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::net::UnixListener;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    fn create_mock_server(socket_path: &PathBuf) -> UnixListener {
        let _ = std::fs::remove_file(socket_path);
        UnixListener::bind(socket_path).unwrap()
    }

    /// Accepts one connection, checks the request and answers with `response`.
    fn spawn_single_reply(
        listener: UnixListener,
        response: IpcResponse,
    ) -> tokio::task::JoinHandle<IpcRequest> {
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buffer = vec![0u8; 4096];
            let n = stream.read(&mut buffer).await.unwrap();
            let request: IpcRequest = serde_json::from_slice(&buffer[..n]).unwrap();

            let json = serde_json::to_vec(&response).unwrap();
            stream.write_all(&json).await.unwrap();
            stream.flush().await.unwrap();
            request
        })
    }

    fn state_data(state: &str, remaining: u32) -> Option<ResponseData> {
        Some(ResponseData {
            state: Some(state.to_string()),
            remaining_seconds: Some(remaining),
            cycles: Some(0),
            ..Default::default()
        })
    }

    // ------------------------------------------------------------------------
    // IpcClient Tests
    // ------------------------------------------------------------------------

    mod client_tests {
        use super::*;

        #[test]
        fn test_with_socket_path() {
            let path = PathBuf::from("/tmp/test.sock");
            let client = IpcClient::with_socket_path(path.clone());
            assert_eq!(client.socket_path(), &path);
        }

        #[tokio::test]
        async fn test_connection_failure() {
            let socket_path = PathBuf::from("/tmp/nonexistent_pomodoro_socket_12345.sock");
            let client = IpcClient::with_socket_path(socket_path);

            let result = client.status().await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_send_status_request() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);
            let server = spawn_single_reply(
                listener,
                IpcResponse::success("", state_data("stopped", 0)),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let response = client.status().await.unwrap();

            assert!(response.is_success());
            assert_eq!(response.data.unwrap().state.as_deref(), Some("stopped"));
            assert!(matches!(server.await.unwrap(), IpcRequest::Status));
        }

        #[tokio::test]
        async fn test_send_work_request() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);
            let server = spawn_single_reply(
                listener,
                IpcResponse::success("Work started", state_data("work", 1500)),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let response = client.work().await.unwrap();

            assert_eq!(response.message, "Work started");
            assert_eq!(response.data.unwrap().remaining_seconds, Some(1500));
            assert!(matches!(server.await.unwrap(), IpcRequest::Work));
        }

        #[tokio::test]
        async fn test_send_lock_request() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);
            let server = spawn_single_reply(
                listener,
                IpcResponse::success("Session unlocked", state_data("work", 900)),
            );

            let client = IpcClient::with_socket_path(socket_path);
            client.lock(false).await.unwrap();

            assert!(matches!(
                server.await.unwrap(),
                IpcRequest::Lock { locked: false }
            ));
        }

        #[tokio::test]
        async fn test_send_settings_request() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);
            let server = spawn_single_reply(listener, IpcResponse::success("Settings saved", None));

            let client = IpcClient::with_socket_path(socket_path);
            let params = SettingsParams {
                short_break_minutes: Some(7),
                ..Default::default()
            };
            client.settings(params).await.unwrap();

            match server.await.unwrap() {
                IpcRequest::Settings { params } => {
                    assert_eq!(params.short_break_minutes, Some(7));
                    assert_eq!(params.work_minutes, None);
                }
                other => panic!("Expected Settings request, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_error_response_is_not_retried() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);
            let connections = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&connections);

            let server = tokio::spawn(async move {
                loop {
                    let (mut stream, _) = listener.accept().await.unwrap();
                    counter.fetch_add(1, Ordering::SeqCst);

                    let mut buffer = vec![0u8; 4096];
                    let _ = stream.read(&mut buffer).await;

                    let response = IpcResponse::error("work must be between 1 and 1440 minutes");
                    let json = serde_json::to_vec(&response).unwrap();
                    let _ = stream.write_all(&json).await;
                }
            });

            let client = IpcClient::with_socket_path(socket_path);
            let result = client
                .settings(SettingsParams {
                    work_minutes: Some(5000),
                    ..Default::default()
                })
                .await;

            let error_msg = result.unwrap_err().to_string();
            assert!(
                error_msg.contains("between 1 and 1440"),
                "Expected range error, got: {}",
                error_msg
            );
            assert_eq!(connections.load(Ordering::SeqCst), 1);

            server.abort();
        }

        #[tokio::test]
        async fn test_retry_after_empty_reply() {
            let socket_path = create_temp_socket_path();
            let listener = create_mock_server(&socket_path);

            let server = tokio::spawn(async move {
                // First connection hangs up without answering
                let (stream, _) = listener.accept().await.unwrap();
                drop(stream);

                let (mut stream, _) = listener.accept().await.unwrap();
                let mut buffer = vec![0u8; 4096];
                let _ = stream.read(&mut buffer).await.unwrap();
                let json = serde_json::to_vec(&IpcResponse::success("Resumed", None)).unwrap();
                stream.write_all(&json).await.unwrap();
            });

            let client = IpcClient::with_socket_path(socket_path);
            let response = client.toggle().await.unwrap();

            assert_eq!(response.message, "Resumed");
            server.await.unwrap();
        }
    }
}
