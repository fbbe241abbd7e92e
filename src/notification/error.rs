//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification server rejected or never received the notification.
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    /// The notification thread is gone.
    #[error("Notification worker is not running")]
    WorkerStopped,

    /// The notification thread could not be started.
    #[error("Failed to start notification worker: {0}")]
    SpawnFailed(String),
}
