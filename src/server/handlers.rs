//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::error::ResolveError;
use crate::ports::Credentials;
use crate::resolve::{self, BlockedPolicy};

/// API version reported by the health endpoint.
pub const API_VERSION: &str = "v0";

const OAS3_DOCUMENT: &str = include_str!("../../api.yaml");

/// Returns `true` for path segments of the form `v<digit>`.
fn is_version(segment: &str) -> bool {
    matches!(segment.as_bytes(), [b'v', d] if d.is_ascii_digit())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_version: Option<&'static str>,
}

/// `GET /v<digit>`
pub async fn health(Path(version): Path<String>) -> Response {
    if !is_version(&version) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(Health {
        status: "healthy",
        api_version: API_VERSION,
        git_version: option_env!("GIT_VERSION"),
    })
    .into_response()
}

/// `GET /v<digit>/oas3`
pub async fn oas3(Path(version): Path<String>) -> Response {
    if !is_version(&version) {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "application/yaml")], OAS3_DOCUMENT).into_response()
}

/// Query parameters of the actionables route.
#[derive(Debug, Default, Deserialize)]
pub struct ActionablesQuery {
    /// Base URL of the Redmine server.
    pub url: Option<String>,
    /// API key of the user to resolve for.
    pub apikey: Option<String>,
    /// Optional blocked policy override.
    pub blocked: Option<String>,
}

fn add_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("x-requested-with, content-type"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, OPTIONS"));
}

/// `OPTIONS /v<digit>/redmine/actionables`
pub async fn preflight(Path(version): Path<String>) -> Response {
    if !is_version(&version) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut response = StatusCode::NO_CONTENT.into_response();
    add_cors(response.headers_mut());
    response
}

/// `GET /v<digit>/redmine/actionables`
pub async fn actionables(
    State(state): State<AppState>,
    Path(version): Path<String>,
    Query(query): Query<ActionablesQuery>,
) -> Response {
    if !is_version(&version) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let span = info_span!("request", id = %Uuid::new_v4());
    let mut response = match run_actionables(&state, query).instrument(span).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            warn!(status = err.status_code().as_u16(), error = %err, "actionables request failed");
            err.into_response()
        }
    };
    add_cors(response.headers_mut());
    response
}

async fn run_actionables(
    state: &AppState,
    query: ActionablesQuery,
) -> Result<String, ResolveError> {
    let credentials = Credentials::new(query.url.as_deref(), query.apikey.as_deref())?;
    let policy = match query.blocked.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        Some(raw) => BlockedPolicy::from_str(raw, true)
            .map_err(|_| ResolveError::InvalidRequest(format!("unknown blocked policy {raw:?}")))?,
        None => state.policy,
    };

    let resolution = resolve::actionables(&state.ctx, &credentials, policy).await?;
    serde_json::to_string_pretty(&resolution)
        .map_err(|e| ResolveError::Upstream(format!("failed to encode resolution: {e}")))
}
