//! Relation classification: raw relations to directed scheduling edges.

use std::collections::BTreeMap;

use crate::model::{Issue, IssueId, Relation, RelationKind};

/// A scheduling consequence derived from one relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `issue` cannot proceed until `blocker` closes.
    BlockedBy {
        /// The waiting issue.
        issue: IssueId,
        /// The open issue holding it up.
        blocker: IssueId,
    },
    /// `issue` must not start before `predecessor` finishes.
    Follows {
        /// The waiting issue.
        issue: IssueId,
        /// The open issue it waits for.
        predecessor: IssueId,
    },
}

impl Edge {
    /// The issue that has to wait.
    #[must_use]
    pub const fn waiting(&self) -> IssueId {
        match *self {
            Self::BlockedBy { issue, .. } | Self::Follows { issue, .. } => issue,
        }
    }
}

/// Classifies one relation owned by `owner`.
///
/// Returns `None` for relation types without scheduling meaning and for
/// relations whose counterpart is not in the open-issue set: a closed issue
/// neither blocks nor precedes anything.
pub fn classify<V>(owner: IssueId, relation: Relation, open: &BTreeMap<IssueId, V>) -> Option<Edge> {
    let other = relation.counterpart;
    if !open.contains_key(&other) {
        return None;
    }

    match relation.kind {
        RelationKind::Blocks => Some(Edge::BlockedBy { issue: other, blocker: owner }),
        RelationKind::BlockedBy => Some(Edge::BlockedBy { issue: owner, blocker: other }),
        RelationKind::Precedes => Some(Edge::Follows { issue: other, predecessor: owner }),
        RelationKind::Follows => Some(Edge::Follows { issue: owner, predecessor: other }),
        RelationKind::Unknown => None,
    }
}

/// Classifies every relation of `issue`.
pub fn edges<'a, V>(
    issue: &'a Issue,
    open: &'a BTreeMap<IssueId, V>,
) -> impl Iterator<Item = Edge> + 'a {
    issue.relations.iter().filter_map(move |rel| classify(issue.id, *rel, open))
}
