//! HTTP surface of the service.
//!
//! Every route is nested under a `v<digit>` version segment; anything else
//! is a 404.

pub mod handlers;
pub mod lifecycle;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use lifecycle::Lifecycle;

use crate::context::ServiceContext;
use crate::resolve::BlockedPolicy;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<ServiceContext>,
    policy: BlockedPolicy,
}

impl AppState {
    /// Wraps a context; `policy` applies when a request does not choose one.
    #[must_use]
    pub fn new(ctx: ServiceContext, policy: BlockedPolicy) -> Self {
        Self { ctx: Arc::new(ctx), policy }
    }
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{version}", get(handlers::health))
        .route("/{version}/oas3", get(handlers::oas3))
        .route(
            "/{version}/redmine/actionables",
            get(handlers::actionables).options(handlers::preflight),
        )
        .with_state(state)
}

/// Serves requests on `listener` until `lifecycle` requests shutdown, then
/// drains in-flight requests.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    lifecycle: Lifecycle,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { lifecycle.stopped().await })
        .await?;

    info!("server stopped");
    Ok(())
}
