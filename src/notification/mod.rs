//! Desktop notification support.
//!
//! Notifications go through the freedesktop notification protocol via
//! `notify-rust`. Showing one is a blocking D-Bus round trip, so
//! `DesktopNotifier` hands them to a dedicated thread over a crossbeam
//! channel; they are shown in the order they were sent and failures are
//! only logged.
//!
//! # Example
//!
//! ```rust,ignore
//! use pomodoro_indicator::notification::{DesktopNotifier, NotificationSender};
//!
//! let notifier = DesktopNotifier::spawn()?;
//! notifier.send(&notification)?;
//! ```

pub mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

pub use self::error::NotificationError;

use crate::daemon::timer::Notification;

/// Application name shown by the notification server.
pub const APP_NAME: &str = "Pomodoro Timer";

/// Icon name from the freedesktop icon theme.
const NOTIFICATION_ICON: &str = "dialog-information";

/// Sends notifications to the user.
pub trait NotificationSender: Send + Sync {
    /// Queues a notification for display. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be queued.
    fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Notification sender backed by the desktop notification server.
#[derive(Debug)]
pub struct DesktopNotifier {
    tx: Sender<Notification>,
}

impl DesktopNotifier {
    /// Starts the notification thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn() -> Result<Self, NotificationError> {
        let (tx, rx) = unbounded();

        std::thread::Builder::new()
            .name("pomodoro-notify".to_string())
            .spawn(move || notify_loop(rx))
            .map_err(|e| NotificationError::SpawnFailed(e.to_string()))?;

        Ok(Self { tx })
    }
}

impl NotificationSender for DesktopNotifier {
    fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| NotificationError::WorkerStopped)
    }
}

/// Notification thread body. Ends when the notifier is dropped.
fn notify_loop(rx: Receiver<Notification>) {
    for notification in rx.iter() {
        if let Err(e) = show(&notification) {
            warn!("Failed to show notification '{}': {}", notification.title, e);
        }
    }
    debug!("Notification thread stopped");
}

fn show(notification: &Notification) -> Result<(), NotificationError> {
    notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(&notification.title)
        .body(&notification.body)
        .icon(NOTIFICATION_ICON)
        .show()
        .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

    debug!("Notification shown: {}", notification.title);
    Ok(())
}

// ============================================================================
// MockNotificationSender
// ============================================================================

/// Notification sender that records what it was asked to show.
#[derive(Debug, Default)]
pub struct MockNotificationSender {
    notifications: Mutex<Vec<Notification>>,
    should_fail: AtomicBool,
}

impl MockNotificationSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().map(|n| n.len()).unwrap_or(0)
    }
}

impl NotificationSender for MockNotificationSender {
    fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification.clone());
        }
        Ok(())
    }
}
