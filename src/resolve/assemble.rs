//! Result assembly: partitions candidates and renders output records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::exclusion::Exclusions;
use super::BlockedPolicy;
use crate::model::{Actor, Issue, IssueId, Project, ProjectId};

/// Tracker flavour reported in every resolution.
pub const TRACKER_TYPE: &str = "redmine";

/// Identifies the tracker and user a resolution was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSummary {
    /// Tracker flavour, always `redmine`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Normalized tracker base URL.
    pub uri: String,
    /// Tracker-local user id.
    pub user_local_id: u64,
    /// User login.
    pub user_name: String,
}

/// A project touched by the resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Canonical project URL.
    pub uri: String,
    /// Tracker-local id.
    pub local_id: ProjectId,
    /// Slug.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Status name (`active`, `archived`, or the raw code).
    pub status: String,
    /// Free-text description.
    pub description: String,
}

/// An actionable or blocked issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Canonical issue URL.
    pub uri: String,
    /// Tracker-local id.
    pub local_id: IssueId,
    /// One-line summary.
    pub subject: String,
    /// Description, empty when the tracker has none.
    pub description: String,
    /// Completion percentage.
    pub percent_done: u8,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// Open parent issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_local_id: Option<IssueId>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_local_id: Option<ProjectId>,
    /// Open issues blocking this one, ascending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Vec<IssueId>>,
}

/// The full answer for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Tracker and user identity.
    pub tracker: TrackerSummary,
    /// Open projects of the reported issues, by local id.
    pub projects: BTreeMap<ProjectId, ProjectSummary>,
    /// Candidates with no open blocker, ascending.
    pub actionable: Vec<IssueId>,
    /// Candidates with at least one open blocker, ascending.
    pub blocked: Vec<IssueId>,
    /// Candidates held back by a future start date, ascending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<IssueId>,
    /// Records for every issue listed in `actionable` or `blocked`.
    pub issues: BTreeMap<IssueId, IssueSummary>,
}

/// Builds the final [`Resolution`].
///
/// Candidates with an entry in the blocked-by map go to `blocked` under
/// [`BlockedPolicy::Annotate`] and are dropped under
/// [`BlockedPolicy::Exclude`]. Closed projects never appear in `projects`.
#[must_use]
pub fn assemble(
    base: &Url,
    actor: &Actor,
    open: &BTreeMap<IssueId, &Issue>,
    exclusions: &Exclusions,
    projects: &BTreeMap<ProjectId, Project>,
    policy: BlockedPolicy,
) -> Resolution {
    let mut actionable = Vec::new();
    let mut blocked = Vec::new();
    let mut issues = BTreeMap::new();
    let mut touched = BTreeMap::new();

    for id in &exclusions.candidates {
        let Some(issue) = open.get(id) else { continue };
        let blockers = exclusions.blocked_by.get(id).filter(|b| !b.is_empty());

        match (blockers, policy) {
            (None, _) => actionable.push(*id),
            (Some(_), BlockedPolicy::Annotate) => blocked.push(*id),
            (Some(_), BlockedPolicy::Exclude) => continue,
        }

        let record = IssueSummary {
            uri: join(base, &format!("issues/{id}")),
            local_id: *id,
            subject: issue.subject.clone(),
            description: issue.description.clone().unwrap_or_default(),
            percent_done: issue.done_ratio.unwrap_or(0),
            deadline: issue.due_date,
            parent_local_id: issue.parent.filter(|p| open.contains_key(p)),
            project_local_id: issue.project,
            blocked_by: blockers.map(|b| b.iter().copied().collect()),
        };
        issues.insert(*id, record);

        if let Some(project) = issue.project.and_then(|p| projects.get(&p)) {
            if !project.status.is_closed() {
                touched.entry(project.id).or_insert_with(|| summarize_project(base, project));
            }
        }
    }

    Resolution {
        tracker: TrackerSummary {
            kind: TRACKER_TYPE.to_string(),
            uri: base.to_string(),
            user_local_id: actor.id,
            user_name: actor.name.clone(),
        },
        projects: touched,
        actionable,
        blocked,
        deferred: exclusions.deferred.iter().copied().collect(),
        issues,
    }
}

fn summarize_project(base: &Url, project: &Project) -> ProjectSummary {
    ProjectSummary {
        uri: join(base, &format!("projects/{}", project.identifier)),
        local_id: project.id,
        identifier: project.identifier.clone(),
        name: project.name.clone(),
        status: project.status.to_string(),
        description: project.description.clone(),
    }
}

/// Joins a relative path below the tracker base, normalizing the result.
fn join(base: &Url, path: &str) -> String {
    base.join(path).map_or_else(|_| format!("{base}{path}"), String::from)
}
