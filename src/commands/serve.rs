//! `actionables serve` command.

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::server::{self, AppState, Lifecycle};

/// Execute the `serve` command. Blocks until SIGTERM or SIGINT, then drains
/// in-flight requests.
///
/// # Errors
///
/// Returns an error string if the runtime cannot start, the address cannot be
/// bound, or the listener fails.
pub fn run(
    ctx: ServiceContext,
    settings: &Settings,
    bind: Option<IpAddr>,
    port: Option<u16>,
) -> Result<(), String> {
    let addr = SocketAddr::new(bind.unwrap_or(settings.bind), port.unwrap_or(settings.port));
    let state = AppState::new(ctx, settings.blocked_policy);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;

    runtime.block_on(async move {
        let listener =
            TcpListener::bind(addr).await.map_err(|e| format!("Failed to bind {addr}: {e}"))?;

        let lifecycle = Lifecycle::new();
        let signals = lifecycle
            .listen_for_signals()
            .map_err(|e| format!("Failed to register signal handlers: {e}"))?;

        info!(policy = ?settings.blocked_policy, "starting actionables service");
        let result = server::serve(listener, state, lifecycle.clone()).await;

        lifecycle.request_shutdown();
        let _ = signals.await;
        result.map_err(|e| format!("Server error: {e}"))
    })
}
