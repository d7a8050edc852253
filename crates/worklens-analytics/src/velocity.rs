//! Sprint velocity: planned vs completed story points per iteration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use worklens_core::model::{WorkItem, is_terminal_state};

/// Planned and completed story points for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityPoint {
    /// The iteration path the group shares.
    pub iteration: String,
    pub story_points_planned: f64,
    pub story_points_completed: f64,
    /// `completed / planned`, `0.0` when nothing was planned.
    pub completion_rate: f64,
}

struct Group {
    planned: f64,
    completed: f64,
    earliest_created: Option<DateTime<Utc>>,
}

/// Group `items` by iteration path and compute one [`VelocityPoint`] per
/// iteration, in chronological order.
///
/// Planned sums story points of every item in the group; completed sums
/// only items in a terminal state. Items without an iteration path are
/// skipped (they belong to no sprint). The backlog carries no iteration
/// dates here, so chronology is approximated by the earliest creation
/// timestamp seen in each group, tie-broken by path.
#[must_use]
pub fn calculate_sprint_velocity(items: &[WorkItem]) -> Vec<VelocityPoint> {
    let mut groups: HashMap<&str, Group> = HashMap::new();

    for item in items {
        let path = item.iteration_path.trim();
        if path.is_empty() {
            continue;
        }
        let group = groups.entry(path).or_insert(Group {
            planned: 0.0,
            completed: 0.0,
            earliest_created: None,
        });
        let points = item.story_points_or_zero();
        group.planned += points;
        if is_terminal_state(&item.state) {
            group.completed += points;
        }
        if let Some(created) = item.created_date {
            group.earliest_created = Some(match group.earliest_created {
                Some(existing) => existing.min(created),
                None => created,
            });
        }
    }

    debug!(
        items = items.len(),
        iterations = groups.len(),
        "grouped items into velocity buckets"
    );

    let mut ordered: Vec<(&str, Group)> = groups.into_iter().collect();
    // Groups without any creation timestamp sort last, then by path.
    ordered.sort_by(|(path_a, a), (path_b, b)| {
        match (a.earliest_created, b.earliest_created) {
            (Some(a), Some(b)) if a != b => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            _ => path_a.cmp(path_b),
        }
    });

    ordered
        .into_iter()
        .map(|(path, group)| VelocityPoint {
            iteration: path.to_string(),
            story_points_planned: group.planned,
            story_points_completed: group.completed,
            completion_rate: if group.planned > 0.0 {
                group.completed / group.planned
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::calculate_sprint_velocity;
    use chrono::{TimeZone, Utc};
    use worklens_core::model::WorkItem;

    fn item(iteration: &str, state: &str, points: Option<f64>, day: u32) -> WorkItem {
        WorkItem {
            iteration_path: iteration.to_string(),
            state: state.to_string(),
            story_points: points,
            created_date: Some(Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap()),
            ..WorkItem::default()
        }
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(calculate_sprint_velocity(&[]).is_empty());
    }

    #[test]
    fn planned_counts_all_completed_counts_terminal() {
        // A 3-point item done and a 5-point item open in Sprint 1.
        let points = calculate_sprint_velocity(&[
            item("Sprint 1", "Done", Some(3.0), 1),
            item("Sprint 1", "Active", Some(5.0), 2),
        ]);
        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.iteration, "Sprint 1");
        assert_eq!(p.story_points_planned, 8.0);
        assert_eq!(p.story_points_completed, 3.0);
        assert!((p.completion_rate - 0.375).abs() < 1e-9);
    }

    #[test]
    fn groups_are_chronological_by_earliest_creation() {
        let points = calculate_sprint_velocity(&[
            item("Sprint 10", "Done", Some(2.0), 20),
            item("Sprint 2", "Done", Some(1.0), 5),
            item("Sprint 10", "Done", Some(1.0), 25),
        ]);
        let labels: Vec<&str> = points.iter().map(|p| p.iteration.as_str()).collect();
        // Lexical order would put "Sprint 10" first; chronology corrects it.
        assert_eq!(labels, vec!["Sprint 2", "Sprint 10"]);
    }

    #[test]
    fn items_without_iteration_are_skipped() {
        let points = calculate_sprint_velocity(&[
            item("", "Done", Some(3.0), 1),
            item("  ", "Done", Some(4.0), 1),
            item("Sprint 1", "Done", Some(2.0), 1),
        ]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].story_points_planned, 2.0);
    }

    #[test]
    fn missing_story_points_count_as_zero() {
        let points = calculate_sprint_velocity(&[
            item("Sprint 1", "Done", None, 1),
            item("Sprint 1", "Active", Some(5.0), 1),
        ]);
        assert_eq!(points[0].story_points_planned, 5.0);
        assert_eq!(points[0].story_points_completed, 0.0);
    }

    #[test]
    fn zero_planned_has_zero_completion_rate() {
        let points = calculate_sprint_velocity(&[item("Sprint 1", "Done", None, 1)]);
        assert_eq!(points[0].story_points_planned, 0.0);
        assert_eq!(points[0].completion_rate, 0.0);
    }

    #[test]
    fn undated_groups_sort_last_by_path() {
        let mut undated = item("Zeta", "Done", Some(1.0), 1);
        undated.created_date = None;
        let points = calculate_sprint_velocity(&[undated, item("Sprint 1", "Done", Some(1.0), 1)]);
        let labels: Vec<&str> = points.iter().map(|p| p.iteration.as_str()).collect();
        assert_eq!(labels, vec!["Sprint 1", "Zeta"]);
    }
}
