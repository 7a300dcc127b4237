//! Exclusion pass: shrinks the candidate set and records blocking edges.
//!
//! Every rule reads only the open-issue set and the initial candidate set,
//! never the partially reduced one, so the outcome does not depend on the
//! order in which issues are visited.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use super::relations::{self, Edge};
use crate::model::{Issue, IssueId, Project, ProjectId};
use crate::ports::{Tracker, TrackerError};

/// Per-run memo of project lookups.
///
/// Each project id is fetched at most once. The cache is owned by a single
/// resolution run and dropped with it.
pub struct ProjectCache<'t> {
    tracker: &'t dyn Tracker,
    entries: BTreeMap<ProjectId, Project>,
}

impl<'t> ProjectCache<'t> {
    /// Creates an empty cache backed by `tracker`.
    #[must_use]
    pub fn new(tracker: &'t dyn Tracker) -> Self {
        Self { tracker, entries: BTreeMap::new() }
    }

    /// Returns the project, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the first fetch fails.
    pub async fn get(&mut self, id: ProjectId) -> Result<&Project, TrackerError> {
        if !self.entries.contains_key(&id) {
            let project = self.tracker.project(id).await?;
            debug!(project = id, status = %project.status, "fetched project");
            self.entries.insert(id, project);
        }
        self.entries
            .get(&id)
            .ok_or_else(|| TrackerError::Unavailable(format!("project {id} missing from cache")))
    }

    /// Consumes the cache, returning every project fetched during the run.
    #[must_use]
    pub fn into_projects(self) -> BTreeMap<ProjectId, Project> {
        self.entries
    }
}

/// Outcome of the exclusion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    /// Candidates that survived every exclusion rule.
    pub candidates: BTreeSet<IssueId>,
    /// Issue id to the open issues blocking it.
    pub blocked_by: BTreeMap<IssueId, BTreeSet<IssueId>>,
    /// Candidates held back because their start date lies in the future.
    pub deferred: BTreeSet<IssueId>,
}

/// Applies all exclusion rules to `initial`.
///
/// For each open issue:
/// 1. blocking edges are merged into the blocked-by map and precedes/follows
///    waiters are removed;
/// 2. an open parent is removed;
/// 3. the issue is removed if its project is closed;
/// 4. the issue is removed and deferred if it starts after `pivot`.
///
/// Only issues held back by nothing but their start date end up deferred;
/// an issue also removed by rules 1 to 3 would not become actionable on that
/// date.
///
/// Project lookups happen only for initial candidates, the only issues rule 3
/// can remove.
///
/// # Errors
///
/// Returns the first tracker error hit while resolving a project. No partial
/// result is produced.
pub async fn apply(
    open: &BTreeMap<IssueId, &Issue>,
    initial: &BTreeSet<IssueId>,
    pivot: NaiveDate,
    projects: &mut ProjectCache<'_>,
) -> Result<Exclusions, TrackerError> {
    let mut out = Exclusions { candidates: initial.clone(), ..Exclusions::default() };
    // Removed for a reason other than the start date.
    let mut excluded = BTreeSet::new();

    for issue in open.values() {
        for edge in relations::edges(issue, open) {
            match edge {
                Edge::BlockedBy { issue: blocked, blocker } => {
                    out.blocked_by.entry(blocked).or_default().insert(blocker);
                }
                Edge::Follows { issue: waiting, predecessor } => {
                    excluded.insert(waiting);
                    if out.candidates.remove(&waiting) {
                        debug!(issue = waiting, predecessor, "excluded: waits for preceding issue");
                    }
                }
            }
        }

        if let Some(parent) = issue.parent.filter(|p| open.contains_key(p)) {
            excluded.insert(parent);
            if out.candidates.remove(&parent) {
                debug!(issue = parent, child = issue.id, "excluded: parent of open child");
            }
        }

        if !initial.contains(&issue.id) {
            continue;
        }

        if let Some(project_id) = issue.project {
            if projects.get(project_id).await?.status.is_closed() {
                excluded.insert(issue.id);
                out.candidates.remove(&issue.id);
                debug!(issue = issue.id, project = project_id, "excluded: project closed");
            }
        }

        if issue.start_date.is_some_and(|start| start > pivot) {
            out.candidates.remove(&issue.id);
            out.deferred.insert(issue.id);
            debug!(issue = issue.id, start = ?issue.start_date, "excluded: starts in the future");
        }
    }

    out.deferred.retain(|id| !excluded.contains(id));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Actor, ProjectStatus, RelationKind};
    use crate::resolve::fixture::{issue, related, StaticTracker};

    fn tracker(issues: Vec<Issue>) -> StaticTracker {
        let actor = Actor { id: 1, name: "u".into(), groups: BTreeSet::new() };
        let project = Project {
            id: 1,
            identifier: "p".into(),
            name: "P".into(),
            description: String::new(),
            status: ProjectStatus::Active,
        };
        StaticTracker::new(actor, issues, vec![project])
    }

    fn pivot() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    async fn run(tracker: &StaticTracker, initial: &[IssueId]) -> Exclusions {
        let open: BTreeMap<IssueId, &Issue> = tracker.issues.iter().map(|i| (i.id, i)).collect();
        let initial: BTreeSet<IssueId> = initial.iter().copied().collect();
        let mut cache = ProjectCache::new(tracker);
        apply(&open, &initial, pivot(), &mut cache).await.unwrap()
    }

    #[tokio::test]
    async fn blocking_edges_are_recorded_for_non_candidates_too() {
        let t = tracker(vec![
            related(issue(1, None), RelationKind::BlockedBy, 2),
            issue(2, None),
            issue(3, None),
        ]);
        let out = run(&t, &[3]).await;
        assert_eq!(out.blocked_by[&1], BTreeSet::from([2]));
        assert_eq!(out.candidates, BTreeSet::from([3]));
    }

    #[tokio::test]
    async fn parent_outside_open_set_is_ignored() {
        let mut child = issue(1, Some(1));
        child.parent = Some(50);
        let t = tracker(vec![child]);
        let out = run(&t, &[1]).await;
        assert_eq!(out.candidates, BTreeSet::from([1]));
    }

    #[tokio::test]
    async fn only_candidates_are_deferred_and_looked_up() {
        let mut later = issue(1, None);
        later.start_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        let t = tracker(vec![later]);
        let out = run(&t, &[]).await;
        assert!(out.deferred.is_empty());
        assert!(t.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn projects_of_non_candidates_are_never_fetched() {
        let t = tracker(vec![issue(1, Some(1)), issue(2, Some(1)), issue(3, Some(99))]);
        let out = run(&t, &[1, 2]).await;
        assert_eq!(out.candidates, BTreeSet::from([1, 2]));
        assert_eq!(*t.lookups.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn cache_reuses_fetched_projects() {
        let t = tracker(vec![]);
        let mut cache = ProjectCache::new(&t);
        assert_eq!(cache.get(1).await.unwrap().identifier, "p");
        assert_eq!(cache.get(1).await.unwrap().identifier, "p");
        assert_eq!(t.lookups.lock().unwrap().len(), 1);
        assert_eq!(cache.into_projects().len(), 1);
    }
}
