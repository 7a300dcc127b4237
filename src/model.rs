//! Tracker records as seen by the resolution engine.
//!
//! These types are adapter-neutral: the live Redmine adapter converts wire
//! payloads into them, and cassettes store them verbatim.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tracker-local issue identifier.
pub type IssueId = u64;

/// Tracker-local project identifier.
pub type ProjectId = u64;

/// Semantic type of a relation, from the perspective of the issue owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The owner must close before the counterpart can proceed.
    Blocks,
    /// The owner cannot proceed until the counterpart closes.
    BlockedBy,
    /// The owner must finish before the counterpart may start.
    Precedes,
    /// The owner waits for the counterpart to finish.
    Follows,
    /// Any relation type without scheduling meaning (relates, duplicates, ...).
    #[serde(other)]
    Unknown,
}

/// A directed relation attached to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// What the relation means for the owning issue.
    pub kind: RelationKind,
    /// The issue on the other end.
    pub counterpart: IssueId,
}

/// An open issue with the metadata the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique, stable identifier.
    pub id: IssueId,
    /// User or group the issue is assigned to.
    #[serde(default)]
    pub assignee: Option<u64>,
    /// Parent issue, if this is a subtask.
    #[serde(default)]
    pub parent: Option<IssueId>,
    /// Owning project.
    #[serde(default)]
    pub project: Option<ProjectId>,
    /// One-line summary.
    pub subject: String,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub done_ratio: Option<u8>,
    /// Earliest date work may begin.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Deadline.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Relations reported on this issue.
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Lifecycle status of a project.
///
/// Only `Closed` affects actionability; the other values are carried through
/// to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work may proceed.
    Active,
    /// Read-only; issues inside are not actionable.
    Closed,
    /// Hidden from the tracker.
    Archived,
    /// A status code this service does not know about.
    Other(u8),
}

impl ProjectStatus {
    /// Maps a Redmine project status code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Active,
            5 => Self::Closed,
            9 => Self::Archived,
            other => Self::Other(other),
        }
    }

    /// Returns `true` for the closed status.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Closed => f.write_str("closed"),
            Self::Archived => f.write_str("archived"),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}

/// A project as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Tracker-local identifier.
    pub id: ProjectId,
    /// Human-readable slug.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
}

/// The user a resolution is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier.
    pub id: u64,
    /// Login name.
    pub name: String,
    /// Groups the user belongs to.
    #[serde(default)]
    pub groups: BTreeSet<u64>,
}

impl Actor {
    /// Returns `true` if an issue assigned to `assignee` belongs to this actor.
    #[must_use]
    pub fn owns(&self, assignee: u64) -> bool {
        assignee == self.id || self.groups.contains(&assignee)
    }
}
