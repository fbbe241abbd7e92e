//! Daemon module for the Pomodoro Timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with state transitions and countdown logic
//! - `dispatch`: Routing of engine events to notifications, sounds and the label
//! - `ipc`: Unix socket server and request handling
//! - `lock`: Session lock monitor
//!
//! `run` wires them together: one engine behind a mutex, shared by the
//! ticker, the lock monitor and the IPC handler.

pub mod dispatch;
pub mod ipc;
pub mod lock;
pub mod timer;

pub use dispatch::EventDispatcher;
pub use ipc::{default_socket_path, IpcError, IpcServer, RequestHandler};
pub use timer::{Notification, TimerEngine, TimerEvent};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ConfigStore;
use crate::indicator::StatusFileWriter;
use crate::notification::DesktopNotifier;
use crate::sound::SoundWorker;
use crate::types::{IpcRequest, IpcResponse};

/// Nominal tick length.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Daemon startup options.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Socket to listen on
    pub socket_path: PathBuf,
    /// Config file; the default location when `None`
    pub config_path: Option<PathBuf>,
    /// Status label file; the runtime-dir default when `None`
    pub status_file: Option<PathBuf>,
    /// Play sounds with notifications
    pub sound: bool,
    /// Watch the session lock via D-Bus
    pub lock_monitor: bool,
    /// Countdown granularity
    pub tick_period: Duration,
}

impl DaemonOptions {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            config_path: None,
            status_file: None,
            sound: true,
            lock_monitor: true,
            tick_period: TICK_PERIOD,
        }
    }
}

/// Runs the daemon with the desktop notifier, audio thread and status file.
///
/// # Errors
///
/// Returns an error if a collaborator or the socket cannot be set up.
pub async fn run(options: DaemonOptions) -> Result<()> {
    let sound = SoundWorker::spawn(!options.sound).context("Failed to start audio thread")?;
    let status_path = options
        .status_file
        .clone()
        .unwrap_or_else(StatusFileWriter::default_path);
    let label = StatusFileWriter::spawn(status_path).context("Failed to start status writer")?;

    let notifier = DesktopNotifier::spawn().context("Failed to start notification thread")?;

    let dispatcher = EventDispatcher::new(
        Arc::new(notifier),
        Arc::new(sound),
        Arc::new(label),
    );

    serve(options, dispatcher).await
}

/// Runs the daemon until a `quit` request or a termination signal.
///
/// # Errors
///
/// Returns an error if the config location or the socket cannot be set up.
pub async fn serve(options: DaemonOptions, dispatcher: EventDispatcher) -> Result<()> {
    let store = match &options.config_path {
        Some(path) => ConfigStore::with_path(path.clone()),
        None => ConfigStore::new()?,
    };
    let durations = store.load();
    info!("Loaded durations from {}: {:?}", store.path().display(), durations);

    let server = IpcServer::new(&options.socket_path)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(TimerEngine::new(durations, event_tx)));
    let handler = RequestHandler::new(Arc::clone(&engine), store);

    let dispatch_task = tokio::spawn(dispatcher.run(event_rx));
    let ticker_task = tokio::spawn(timer::run_ticker(
        Arc::clone(&engine),
        options.tick_period,
    ));
    let lock_task = options
        .lock_monitor
        .then(|| tokio::spawn(lock::run_lock_monitor(Arc::clone(&engine))));
    drop(engine);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Daemon started");
    loop {
        tokio::select! {
            accepted = server.accept() => {
                let mut stream = match accepted {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("{:#}", e);
                        continue;
                    }
                };

                let request = match IpcServer::receive_request(&mut stream).await {
                    Ok(request) => request,
                    Err(e)
                        if matches!(
                            e.downcast_ref::<IpcError>(),
                            Some(IpcError::ConnectionClosed)
                        ) =>
                    {
                        // Liveness checks connect and hang up
                        debug!("Client hung up without a request");
                        continue;
                    }
                    Err(e) => {
                        warn!("Bad request: {:#}", e);
                        let response = IpcResponse::error(e.to_string());
                        let _ = IpcServer::send_response(&mut stream, &response).await;
                        continue;
                    }
                };
                debug!("Request: {:?}", request);

                let quit = matches!(request, IpcRequest::Quit);
                let response = handler.handle(request).await;
                if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
                    warn!("{:#}", e);
                }
                if quit {
                    break;
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Signal handling failed: {:#}", e);
                }
                break;
            }
        }
    }

    info!("Daemon shutting down");
    ticker_task.abort();
    let _ = ticker_task.await;
    if let Some(task) = lock_task {
        task.abort();
        let _ = task.await;
    }
    // Dropping the last engine handle closes the event channel
    drop(handler);
    let _ = tokio::time::timeout(Duration::from_secs(1), dispatch_task).await;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
        _ = terminate.recv() => info!("Terminated"),
    }
    Ok(())
}
