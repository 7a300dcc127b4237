//! Recording adapter for the `Tracker` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::model::{Actor, Issue, Project, ProjectId};
use crate::ports::{Credentials, Tracker, TrackerConnector, TrackerFuture};

/// Wraps every session opened by `inner` in a [`RecordingTracker`].
pub struct RecordingConnector {
    inner: Box<dyn TrackerConnector>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingConnector {
    /// Creates a new recording connector wrapping the given implementation.
    pub fn new(inner: Box<dyn TrackerConnector>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl TrackerConnector for RecordingConnector {
    fn connect(&self, credentials: &Credentials) -> Box<dyn Tracker> {
        Box::new(RecordingTracker {
            inner: self.inner.connect(credentials),
            recorder: Arc::clone(&self.recorder),
            base: credentials.base().to_string(),
        })
    }
}

/// Records tracker interactions while delegating to an inner session.
///
/// Only the base URL is recorded as input; the API key never reaches a
/// cassette.
pub struct RecordingTracker {
    inner: Box<dyn Tracker>,
    recorder: Arc<Mutex<CassetteRecorder>>,
    base: String,
}

#[derive(Serialize)]
struct SessionInput<'a> {
    base: &'a str,
}

#[derive(Serialize)]
struct ProjectInput<'a> {
    base: &'a str,
    id: ProjectId,
}

impl Tracker for RecordingTracker {
    fn current_user(&self) -> TrackerFuture<'_, Actor> {
        Box::pin(async move {
            let result = self.inner.current_user().await;
            let input = SessionInput { base: &self.base };
            record_result(&self.recorder, "tracker", "current_user", &input, &result);
            result
        })
    }

    fn open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        Box::pin(async move {
            let result = self.inner.open_issues().await;
            let input = SessionInput { base: &self.base };
            record_result(&self.recorder, "tracker", "open_issues", &input, &result);
            result
        })
    }

    fn project(&self, id: ProjectId) -> TrackerFuture<'_, Project> {
        Box::pin(async move {
            let result = self.inner.project(id).await;
            let input = ProjectInput { base: &self.base, id };
            record_result(&self.recorder, "tracker", "project", &input, &result);
            result
        })
    }
}
