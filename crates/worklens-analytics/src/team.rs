//! Team load: story points per assignee and aggregate totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use worklens_core::model::{WorkItem, is_terminal_state};

use crate::velocity::calculate_sprint_velocity;

/// Aggregate story-point load across a team.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamMetrics {
    /// Story points summed per assignee (sorted by name).
    pub story_points_by_member: BTreeMap<String, f64>,
    /// Distinct non-empty assignees, sorted.
    pub team_members: Vec<String>,
    pub total_story_points: f64,
    pub completed_story_points: f64,
    /// Mean of completed points across the velocity series; `0.0` when the
    /// series is empty.
    pub average_velocity: f64,
}

/// Compute team metrics over any item list.
///
/// Unassigned items count toward the totals but not toward any member.
/// Empty input yields all-zero metrics, never an error.
#[must_use]
pub fn calculate_team_metrics(items: &[WorkItem]) -> TeamMetrics {
    let mut metrics = TeamMetrics::default();

    for item in items {
        let points = item.story_points_or_zero();
        metrics.total_story_points += points;
        if is_terminal_state(&item.state) {
            metrics.completed_story_points += points;
        }
        if let Some(assignee) = item.assigned_to.as_deref().map(str::trim) {
            if !assignee.is_empty() {
                *metrics
                    .story_points_by_member
                    .entry(assignee.to_string())
                    .or_insert(0.0) += points;
            }
        }
    }

    metrics.team_members = metrics.story_points_by_member.keys().cloned().collect();

    let velocities = calculate_sprint_velocity(items);
    if !velocities.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let count = velocities.len() as f64;
        metrics.average_velocity = velocities
            .iter()
            .map(|v| v.story_points_completed)
            .sum::<f64>()
            / count;
    }

    metrics
}
