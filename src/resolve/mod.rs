//! Actionability resolution.
//!
//! Turns the flat set of open issues into the actionable and blocked sets for
//! one actor:
//!
//! ```text
//! tracker ──► relations ──► candidates ──► exclusion ──► assemble
//! ```
//!
//! A run performs one bulk issue fetch and at most one fetch per project.
//! Nothing is shared between runs.

pub mod assemble;
pub mod candidates;
pub mod exclusion;
pub mod relations;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use assemble::{IssueSummary, ProjectSummary, Resolution, TrackerSummary};

use crate::context::ServiceContext;
use crate::error::ResolveError;
use crate::model::{Issue, IssueId};
use crate::ports::{Credentials, Tracker};
use exclusion::ProjectCache;

/// How candidates with open blockers are reported.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockedPolicy {
    /// Report them in `blocked`, annotated with their blockers.
    #[default]
    Annotate,
    /// Drop them silently.
    Exclude,
}

/// Runs one resolution against an open tracker session.
///
/// # Errors
///
/// Returns [`ResolveError::PermissionDenied`] if the tracker rejects the key
/// and [`ResolveError::Upstream`] for any other tracker failure.
pub async fn resolve(
    tracker: &dyn Tracker,
    base: &Url,
    pivot: NaiveDate,
    policy: BlockedPolicy,
) -> Result<Resolution, ResolveError> {
    let actor = tracker.current_user().await?;
    let fetched = tracker.open_issues().await?;

    let open: BTreeMap<IssueId, &Issue> = fetched.iter().map(|issue| (issue.id, issue)).collect();
    let initial = candidates::select(open.values().copied(), &actor);

    let mut projects = ProjectCache::new(tracker);
    let exclusions = exclusion::apply(&open, &initial, pivot, &mut projects).await?;
    let projects = projects.into_projects();

    let resolution = assemble::assemble(base, &actor, &open, &exclusions, &projects, policy);

    info!(
        user = actor.id,
        open = open.len(),
        candidates = initial.len(),
        projects = projects.len(),
        actionable = resolution.actionable.len(),
        blocked = resolution.blocked.len(),
        deferred = resolution.deferred.len(),
        %pivot,
        "resolved actionables"
    );

    Ok(resolution)
}

/// Validated entry point used by the HTTP and CLI layers.
///
/// Connects to the tracker named by `credentials`, captures the pivot date
/// from the context clock, and resolves.
///
/// # Errors
///
/// Propagates every [`ResolveError`] from [`resolve`].
pub async fn actionables(
    ctx: &ServiceContext,
    credentials: &Credentials,
    policy: BlockedPolicy,
) -> Result<Resolution, ResolveError> {
    let tracker = ctx.connector.connect(credentials);
    let pivot = ctx.clock.today();
    resolve(tracker.as_ref(), credentials.base(), pivot, policy).await
}

#[cfg(test)]
pub(crate) mod fixture {
    //! In-memory tracker for engine tests.

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use crate::model::{Actor, Issue, IssueId, Project, ProjectId, Relation, RelationKind};
    use crate::ports::{Tracker, TrackerError, TrackerFuture};

    /// Serves a fixed snapshot and counts project lookups.
    pub struct StaticTracker {
        pub actor: Actor,
        pub issues: Vec<Issue>,
        pub projects: BTreeMap<ProjectId, Project>,
        pub lookups: Mutex<Vec<ProjectId>>,
        pub fail_issues: Option<TrackerError>,
    }

    impl StaticTracker {
        pub fn new(actor: Actor, issues: Vec<Issue>, projects: Vec<Project>) -> Self {
            Self {
                actor,
                issues,
                projects: projects.into_iter().map(|p| (p.id, p)).collect(),
                lookups: Mutex::new(Vec::new()),
                fail_issues: None,
            }
        }
    }

    impl Tracker for StaticTracker {
        fn current_user(&self) -> TrackerFuture<'_, Actor> {
            Box::pin(async move { Ok(self.actor.clone()) })
        }

        fn open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
            Box::pin(async move {
                match &self.fail_issues {
                    Some(err) => Err(err.clone()),
                    None => Ok(self.issues.clone()),
                }
            })
        }

        fn project(&self, id: ProjectId) -> TrackerFuture<'_, Project> {
            Box::pin(async move {
                self.lookups.lock().unwrap().push(id);
                self.projects
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| TrackerError::Unavailable(format!("404 for project {id}")))
            })
        }
    }

    pub fn issue(id: IssueId, assignee: Option<u64>) -> Issue {
        Issue {
            id,
            assignee,
            parent: None,
            project: Some(1),
            subject: format!("Issue {id}"),
            description: None,
            done_ratio: None,
            start_date: None,
            due_date: None,
            relations: vec![],
        }
    }

    pub fn related(mut issue: Issue, kind: RelationKind, counterpart: IssueId) -> Issue {
        issue.relations.push(Relation { kind, counterpart });
        issue
    }
}
