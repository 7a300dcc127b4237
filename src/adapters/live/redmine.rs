//! Live adapter for the `Tracker` port using the Redmine REST API.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{Actor, Issue, IssueId, Project, ProjectId, ProjectStatus, Relation, RelationKind};
use crate::ports::{Credentials, Tracker, TrackerConnector, TrackerError, TrackerFuture};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Page size for the open-issue listing (Redmine's maximum).
const PAGE_SIZE: usize = 100;

/// Opens Redmine sessions over a shared HTTP client.
pub struct LiveRedmineConnector {
    client: Client,
}

impl LiveRedmineConnector {
    /// Creates a connector with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for LiveRedmineConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerConnector for LiveRedmineConnector {
    fn connect(&self, credentials: &Credentials) -> Box<dyn Tracker> {
        Box::new(LiveRedmine {
            client: self.client.clone(),
            base: credentials.base().clone(),
            api_key: credentials.api_key().to_string(),
        })
    }
}

/// One Redmine session bound to a base URL and API key.
pub struct LiveRedmine {
    client: Client,
    base: Url,
    api_key: String,
}

/// `GET /users/current.json` body.
#[derive(Deserialize)]
struct UserEnvelope {
    user: WireUser,
}

#[derive(Deserialize)]
struct WireUser {
    id: u64,
    login: String,
    #[serde(default)]
    groups: Vec<WireRef>,
}

/// `{ "id": .., "name": .. }` reference used all over the Redmine API.
#[derive(Deserialize)]
struct WireRef {
    id: u64,
}

/// `GET /issues.json` page.
#[derive(Deserialize)]
struct IssuePage {
    issues: Vec<WireIssue>,
    #[serde(default)]
    total_count: usize,
}

#[derive(Deserialize)]
struct WireIssue {
    id: IssueId,
    project: Option<WireRef>,
    assigned_to: Option<WireRef>,
    parent: Option<WireRef>,
    #[serde(default)]
    subject: String,
    description: Option<String>,
    done_ratio: Option<u8>,
    start_date: Option<String>,
    due_date: Option<String>,
    #[serde(default)]
    relations: Vec<WireRelation>,
}

#[derive(Deserialize)]
struct WireRelation {
    issue_id: IssueId,
    issue_to_id: IssueId,
    relation_type: String,
}

/// `GET /projects/<id>.json` body.
#[derive(Deserialize)]
struct ProjectEnvelope {
    project: WireProject,
}

#[derive(Deserialize)]
struct WireProject {
    id: ProjectId,
    identifier: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    status: u8,
}

impl LiveRedmine {
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| TrackerError::Unavailable(format!("invalid Redmine path {path}: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| TrackerError::Unavailable(format!("Redmine request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TrackerError::Unauthorized(format!(
                "Redmine rejected the API key ({})",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(TrackerError::Unavailable(format!(
                "Redmine answered {} for {url}",
                status.as_u16()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TrackerError::Unavailable(format!("Failed to parse Redmine response: {e}")))
    }
}

impl Tracker for LiveRedmine {
    fn current_user(&self) -> TrackerFuture<'_, Actor> {
        Box::pin(async move {
            let envelope: UserEnvelope =
                self.get_json("users/current.json", &[("include", "groups".to_string())]).await?;
            let user = envelope.user;
            Ok(Actor {
                id: user.id,
                name: user.login,
                groups: user.groups.into_iter().map(|g| g.id).collect(),
            })
        })
    }

    fn open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        Box::pin(async move {
            let mut issues = Vec::new();
            let mut offset = 0;
            loop {
                let query = [
                    ("status_id", "open".to_string()),
                    ("include", "relations".to_string()),
                    ("limit", PAGE_SIZE.to_string()),
                    ("offset", offset.to_string()),
                ];
                let page: IssuePage = self.get_json("issues.json", &query).await?;
                let fetched = page.issues.len();
                issues.extend(page.issues.into_iter().map(into_issue));
                offset += fetched;
                debug!(fetched = offset, total = page.total_count, "fetched open issue page");
                if fetched == 0 || offset >= page.total_count {
                    break;
                }
            }
            Ok(issues)
        })
    }

    fn project(&self, id: ProjectId) -> TrackerFuture<'_, Project> {
        Box::pin(async move {
            let envelope: ProjectEnvelope = self.get_json(&format!("projects/{id}.json"), &[]).await?;
            let project = envelope.project;
            Ok(Project {
                id: project.id,
                identifier: project.identifier,
                name: project.name,
                description: project.description.unwrap_or_default(),
                status: ProjectStatus::from_code(project.status),
            })
        })
    }
}

fn into_issue(wire: WireIssue) -> Issue {
    let id = wire.id;
    Issue {
        id,
        assignee: wire.assigned_to.map(|r| r.id),
        parent: wire.parent.map(|r| r.id),
        project: wire.project.map(|r| r.id),
        subject: wire.subject,
        description: wire.description,
        done_ratio: wire.done_ratio,
        start_date: lenient_date(id, "start_date", wire.start_date.as_deref()),
        due_date: lenient_date(id, "due_date", wire.due_date.as_deref()),
        relations: wire.relations.iter().filter_map(|rel| owned_relation(id, rel)).collect(),
    }
}

/// Parses a Redmine date, treating unreadable values as absent.
fn lenient_date(issue: IssueId, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(issue, field, raw, error = %e, "ignoring unreadable date");
            None
        }
    }
}

/// Rewrites a Redmine relation from the perspective of `owner`.
///
/// Redmine stores each relation once, as `issue_id <type> issue_to_id`, and
/// reports the same record on both issues. When the owner sits on the
/// `issue_to_id` side the type is inverted.
fn owned_relation(owner: IssueId, rel: &WireRelation) -> Option<Relation> {
    let forward = match rel.relation_type.as_str() {
        "blocks" => RelationKind::Blocks,
        "blocked" | "blocked_by" => RelationKind::BlockedBy,
        "precedes" => RelationKind::Precedes,
        "follows" => RelationKind::Follows,
        _ => RelationKind::Unknown,
    };

    if rel.issue_id == owner {
        Some(Relation { kind: forward, counterpart: rel.issue_to_id })
    } else if rel.issue_to_id == owner {
        let kind = match forward {
            RelationKind::Blocks => RelationKind::BlockedBy,
            RelationKind::BlockedBy => RelationKind::Blocks,
            RelationKind::Precedes => RelationKind::Follows,
            RelationKind::Follows => RelationKind::Precedes,
            RelationKind::Unknown => RelationKind::Unknown,
        };
        Some(Relation { kind, counterpart: rel.issue_id })
    } else {
        warn!(
            issue = owner,
            from = rel.issue_id,
            to = rel.issue_to_id,
            "relation does not touch its issue"
        );
        None
    }
}
