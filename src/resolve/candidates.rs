//! Candidate selection by assignment.

use std::collections::BTreeSet;

use crate::model::{Actor, Issue, IssueId};

/// Returns the ids of issues assigned to the actor or one of its groups.
///
/// Unassigned issues are never candidates. Relations are not consulted.
pub fn select<'a, I>(issues: I, actor: &Actor) -> BTreeSet<IssueId>
where
    I: IntoIterator<Item = &'a Issue>,
{
    issues
        .into_iter()
        .filter(|issue| issue.assignee.is_some_and(|assignee| actor.owns(assignee)))
        .map(|issue| issue.id)
        .collect()
}
