//! Shutdown coordination for the HTTP service.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Shared shutdown switch. Clones observe the same state.
///
/// Once requested, shutdown cannot be withdrawn.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: watch::Sender<bool>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates a lifecycle in the running state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Asks every waiter to stop.
    pub fn request_shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes when shutdown is requested.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Spawns a task that requests shutdown on SIGTERM or SIGINT (Ctrl-C on
    /// non-unix targets). The task ends early once shutdown is requested by
    /// other means.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handlers cannot be registered.
    pub fn listen_for_signals(&self) -> std::io::Result<JoinHandle<()>> {
        let signals = ShutdownSignals::register()?;
        let lifecycle = self.clone();

        Ok(tokio::spawn(async move {
            tokio::select! {
                name = signals.recv() => info!(signal = name, "stopping server"),
                () = lifecycle.stopped() => return,
            }
            lifecycle.request_shutdown();
        }))
    }
}

#[cfg(unix)]
struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    #[allow(clippy::unnecessary_wraps)]
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(_) => std::future::pending().await,
        }
    }
}
