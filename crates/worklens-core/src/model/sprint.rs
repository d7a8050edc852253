use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::item::ParseEnumError;

/// Where a sprint sits relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Past,
    Current,
    Future,
}

impl TimeFrame {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Current => "current",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "past" => Ok(Self::Past),
            "current" => Ok(Self::Current),
            "future" => Ok(Self::Future),
            _ => Err(ParseEnumError {
                expected: "time frame",
                got: s.to_string(),
            }),
        }
    }
}

/// A sprint (iteration) as reported by the backend.
///
/// `path` is the hierarchical iteration path, backslash-delimited:
/// `project\area...\sprint`. The final segment is usually but not always
/// equal to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub path: String,
    pub time_frame: TimeFrame,
}

impl Sprint {
    /// Path segments in root-to-leaf order, empty segments skipped.
    #[must_use]
    pub fn path_segments(&self) -> Vec<&str> {
        self.path.split('\\').filter(|s| !s.is_empty()).collect()
    }

    /// The path truncated after the first segment equal to `segment`
    /// (case-insensitive), or `None` when no segment matches.
    ///
    /// Used to turn an area/team name mentioned in free text into a path an
    /// `UNDER` predicate can target: the prefix covers that team's whole
    /// subtree of sprints.
    #[must_use]
    pub fn path_through_segment(&self, segment: &str) -> Option<String> {
        let needle = segment.trim();
        if needle.is_empty() {
            return None;
        }
        let segments = self.path_segments();
        let position = segments.iter().position(|s| s.eq_ignore_ascii_case(needle))?;
        Some(segments[..=position].join("\\"))
    }
}
