use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Work item priority, `P1` highest.
///
/// The backend stores this as an integer in `1..=4`; anything outside that
/// range is rejected at the parse boundary so downstream logic never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    const fn as_u8(self) -> u8 {
        match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
            Self::P4 => 4,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::P2
    }
}

impl TryFrom<u8> for Priority {
    type Error = ParseEnumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::P1),
            2 => Ok(Self::P2),
            3 => Ok(Self::P3),
            4 => Ok(Self::P4),
            _ => Err(ParseEnumError {
                expected: "priority (1-4)",
                got: value.to_string(),
            }),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ParseEnumError {
                expected: "priority (1-4)",
                got: s.to_string(),
            })
            .and_then(Self::try_from)
    }
}

/// The closed set of relation kinds an item may carry after enrichment.
///
/// Raw backend link-type identifiers are mapped onto this set exactly once,
/// at the ingestion boundary ([`crate::relations::classify`]). Anything the
/// backend reports that does not fit the known vocabulary lands in `Other`
/// rather than leaking an arbitrary string into hierarchy or analytics code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Parent,
    Child,
    Related,
    Successor,
    Predecessor,
    Other,
}

impl RelationKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "Parent",
            Self::Child => "Child",
            Self::Related => "Related",
            Self::Successor => "Successor",
            Self::Predecessor => "Predecessor",
            Self::Other => "Other",
        }
    }

    /// Returns `true` for the two kinds that participate in tree assembly.
    #[must_use]
    pub const fn is_hierarchical(self) -> bool {
        matches!(self, Self::Parent | Self::Child)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Parent" => Ok(Self::Parent),
            "Child" => Ok(Self::Child),
            "Related" => Ok(Self::Related),
            "Successor" => Ok(Self::Successor),
            "Predecessor" => Ok(Self::Predecessor),
            "Other" => Ok(Self::Other),
            _ => Err(ParseEnumError {
                expected: "relation kind",
                got: s.to_string(),
            }),
        }
    }
}

/// A classified relation attached to a work item by the enricher.
///
/// `linked_id` is the id of the item the relation was reported against
/// (its provenance), `raw` the backend identifier it was classified from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub linked_id: u64,
    pub raw: String,
}

/// A flat work item as returned by the backend query API.
///
/// Read-only to this engine: every transformation (enrichment, hierarchy
/// assembly, analytics) either clones or borrows, never mutates fields other
/// than `relation`, which is `None` until enrichment runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    pub id: u64,
    pub title: String,
    /// Work item type as reported by the backend (Bug, Task, Story, ...).
    pub kind: String,
    pub state: String,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub changed_date: Option<DateTime<Utc>>,
    pub project: String,
    pub area_path: String,
    pub iteration_path: String,
    /// Ordered, deduplicated tag set.
    pub tags: Vec<String>,
    /// Relative-effort estimate; non-negative when present.
    pub story_points: Option<f64>,
    pub description: Option<String>,
    pub relation: Option<Relation>,
}

impl Default for WorkItem {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            kind: String::new(),
            state: String::new(),
            priority: Priority::default(),
            assigned_to: None,
            created_by: None,
            created_date: None,
            changed_date: None,
            project: String::new(),
            area_path: String::new(),
            iteration_path: String::new(),
            tags: Vec::new(),
            story_points: None,
            description: None,
            relation: None,
        }
    }
}

impl WorkItem {
    /// Relation kind shortcut; `None` when the item is unenriched.
    #[must_use]
    pub fn relation_kind(&self) -> Option<RelationKind> {
        self.relation.as_ref().map(|r| r.kind)
    }

    /// Story points, treating absent as zero for aggregation.
    #[must_use]
    pub fn story_points_or_zero(&self) -> f64 {
        self.story_points.unwrap_or(0.0)
    }
}

/// States that mark an item as finished for velocity and cycle-time purposes.
const TERMINAL_STATES: [&str; 4] = ["done", "closed", "completed", "resolved"];

/// Returns `true` when `state` names a terminal/"done" lifecycle state.
///
/// Case-insensitive; the backend's process templates disagree on the exact
/// name (Done vs Closed vs Completed vs Resolved) so all four are accepted.
#[must_use]
pub fn is_terminal_state(state: &str) -> bool {
    let normalized = state.trim().to_ascii_lowercase();
    TERMINAL_STATES.contains(&normalized.as_str())
}

/// Error returned when parsing an enum value from text or wire integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected}: '{got}'")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}
