//! Issue tracker port supplying the actor, open issues and projects.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::model::{Actor, Issue, Project, ProjectId};

/// Boxed future type alias used by [`Tracker`] to keep the trait dyn-compatible.
pub type TrackerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TrackerError>> + Send + 'a>>;

/// Failures reported by a tracker adapter.
///
/// Serializable so that recorded cassettes can replay failures faithfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerError {
    /// The tracker rejected the API key.
    #[error("{0}")]
    Unauthorized(String),
    /// The tracker could not be reached or answered with something unusable.
    #[error("{0}")]
    Unavailable(String),
}

/// Location of a tracker plus the key used to talk to it.
#[derive(Clone)]
pub struct Credentials {
    base: Url,
    api_key: String,
}

impl Credentials {
    /// Validates raw request parameters.
    ///
    /// The base URL always ends with `/` so that relative paths join below it.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidRequest`] when the URL or the key is
    /// missing, empty, or the URL does not parse.
    pub fn new(url: Option<&str>, api_key: Option<&str>) -> Result<Self, ResolveError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty()).ok_or_else(|| {
            ResolveError::InvalidRequest("Redmine URL must not be empty".to_string())
        })?;
        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty()).ok_or_else(|| {
            ResolveError::InvalidRequest("API key must not be empty".to_string())
        })?;

        let mut raw = url.to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| ResolveError::InvalidRequest(format!("invalid Redmine URL {url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ResolveError::InvalidRequest(format!("invalid Redmine URL {url}")));
        }

        Ok(Self { base, api_key: api_key.to_string() })
    }

    /// The normalized tracker base URL.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base", &self.base.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Read-only access to one tracker on behalf of one API key.
pub trait Tracker: Send + Sync {
    /// Fetches the user owning the API key, with group memberships.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker rejects the key or cannot be reached.
    fn current_user(&self) -> TrackerFuture<'_, Actor>;

    /// Fetches every open issue, including relations.
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing cannot be fetched.
    fn open_issues(&self) -> TrackerFuture<'_, Vec<Issue>>;

    /// Fetches a single project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be fetched.
    fn project(&self, id: ProjectId) -> TrackerFuture<'_, Project>;
}

/// Opens a [`Tracker`] session for a set of credentials.
///
/// Every request gets its own session, so nothing fetched for one caller is
/// ever visible to another.
pub trait TrackerConnector: Send + Sync {
    /// Creates a tracker session for the given credentials.
    fn connect(&self, credentials: &Credentials) -> Box<dyn Tracker>;
}
