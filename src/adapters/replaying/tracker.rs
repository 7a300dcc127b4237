//! Replaying adapter for the `Tracker` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::model::{Actor, Issue, Project, ProjectId};
use crate::ports::{Credentials, Tracker, TrackerConnector, TrackerFuture};

/// Opens replaying sessions that all draw from one cassette stream.
pub struct ReplayingConnector {
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl ReplayingConnector {
    /// Create a replaying connector backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// Create a replaying connector with no cassette. Sessions panic when used.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }
}

impl TrackerConnector for ReplayingConnector {
    fn connect(&self, _credentials: &Credentials) -> Box<dyn Tracker> {
        Box::new(ReplayingTracker { replayer: self.replayer.clone() })
    }
}

/// Serves recorded tracker results from a cassette.
pub struct ReplayingTracker {
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl Tracker for ReplayingTracker {
    fn current_user(&self) -> TrackerFuture<'_, Actor> {
        let output = next_output(self.replayer.as_ref(), "tracker", "current_user");
        Box::pin(async move { replay_result(output) })
    }

    fn open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        let output = next_output(self.replayer.as_ref(), "tracker", "open_issues");
        Box::pin(async move { replay_result(output) })
    }

    /// # Panics
    ///
    /// Panics if the recorded project is not the one requested, which means
    /// the cassette was recorded with a different lookup order.
    fn project(&self, id: ProjectId) -> TrackerFuture<'_, Project> {
        let output = next_output(self.replayer.as_ref(), "tracker", "project");
        Box::pin(async move {
            let result: Result<Project, _> = replay_result(output);
            if let Ok(project) = &result {
                assert_eq!(
                    project.id, id,
                    "cassette replay mismatch: tracker::project asked for {id}, recorded {}",
                    project.id
                );
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::ports::TrackerError;
    use chrono::Utc;
    use serde_json::json;

    fn connector(interactions: Vec<Interaction>) -> ReplayingConnector {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        };
        ReplayingConnector::new(Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    fn creds() -> Credentials {
        Credentials::new(Some("https://rm.example.com"), Some("key")).unwrap()
    }

    #[tokio::test]
    async fn replays_recorded_user_and_errors() {
        let connector = connector(vec![
            Interaction {
                seq: 0,
                port: "tracker".into(),
                method: "current_user".into(),
                input: json!({"base": "https://rm.example.com/"}),
                output: json!({"Ok": {"id": 7, "name": "jdoe", "groups": [70]}}),
            },
            Interaction {
                seq: 1,
                port: "tracker".into(),
                method: "open_issues".into(),
                input: json!({"base": "https://rm.example.com/"}),
                output: json!({"Err": {"unauthorized": "Redmine rejected the API key (401)"}}),
            },
        ]);

        let tracker = connector.connect(&creds());
        let actor = tracker.current_user().await.unwrap();
        assert_eq!(actor.id, 7);
        assert!(actor.groups.contains(&70));

        let err = tracker.open_issues().await.unwrap_err();
        assert_eq!(err, TrackerError::Unauthorized("Redmine rejected the API key (401)".into()));
    }

    #[tokio::test]
    async fn sessions_share_one_stream() {
        let user = |seq, id| Interaction {
            seq,
            port: "tracker".into(),
            method: "current_user".into(),
            input: json!({}),
            output: json!({"Ok": {"id": id, "name": "u"}}),
        };
        let connector = connector(vec![user(0, 1), user(1, 2)]);

        let first = connector.connect(&creds()).current_user().await.unwrap();
        let second = connector.connect(&creds()).current_user().await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
    }

    #[tokio::test]
    #[should_panic(expected = "asked for 2, recorded 1")]
    async fn project_lookup_order_must_match_recording() {
        let connector = connector(vec![Interaction {
            seq: 0,
            port: "tracker".into(),
            method: "project".into(),
            input: json!({"base": "https://rm.example.com/", "id": 1}),
            output: json!({"Ok": {"id": 1, "identifier": "core", "name": "Core",
                                  "status": "active"}}),
        }]);
        let _ = connector.connect(&creds()).project(2).await;
    }

    #[tokio::test]
    async fn recorded_project_is_served_for_matching_id() {
        let connector = connector(vec![Interaction {
            seq: 0,
            port: "tracker".into(),
            method: "project".into(),
            input: json!({"base": "https://rm.example.com/", "id": 1}),
            output: json!({"Ok": {"id": 1, "identifier": "core", "name": "Core",
                                  "status": "closed"}}),
        }]);
        let project = connector.connect(&creds()).project(1).await.unwrap();
        assert!(project.status.is_closed());
    }

    #[test]
    #[should_panic(expected = "not configured")]
    fn unconfigured_connector_panics_on_use() {
        let tracker = ReplayingConnector::unconfigured().connect(&creds());
        let _ = tracker.open_issues();
    }
}
