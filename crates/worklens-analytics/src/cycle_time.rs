//! Cycle time: elapsed days from creation to a terminal state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use worklens_core::model::{WorkItem, is_terminal_state};

/// Cycle-time aggregates in whole days.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleTimeStats {
    pub average_days: f64,
    /// True median; for an even count, the mean of the two central values.
    pub median_days: f64,
    /// Average days per work item type.
    pub by_type: BTreeMap<String, f64>,
}

/// Compute cycle-time statistics over any item list.
///
/// Only items currently in a terminal state with both a creation and a
/// change timestamp contribute; the change timestamp of a terminal item is
/// the closest thing the flat payload has to a completion time. Items
/// without a terminal timestamp are excluded outright — treating them as
/// zero-duration would drag every average toward zero. Empty input yields
/// all-zero stats.
#[must_use]
pub fn calculate_cycle_time(items: &[WorkItem]) -> CycleTimeStats {
    let mut durations: Vec<f64> = Vec::new();
    let mut by_type_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for item in items {
        if !is_terminal_state(&item.state) {
            continue;
        }
        let (Some(created), Some(finished)) = (item.created_date, item.changed_date) else {
            continue;
        };
        // Clock skew between backend fields can put the change a hair
        // before creation; clamp instead of reporting negative days.
        #[allow(clippy::cast_precision_loss)]
        let days = (finished - created).num_days().max(0) as f64;
        durations.push(days);

        let kind = if item.kind.trim().is_empty() {
            "Unknown".to_string()
        } else {
            item.kind.clone()
        };
        let entry = by_type_sums.entry(kind).or_insert((0.0, 0));
        entry.0 += days;
        entry.1 += 1;
    }

    if durations.is_empty() {
        return CycleTimeStats::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let average_days = durations.iter().sum::<f64>() / durations.len() as f64;

    let by_type = by_type_sums
        .into_iter()
        .map(|(kind, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let avg = sum / count as f64;
            (kind, avg)
        })
        .collect();

    CycleTimeStats {
        average_days,
        median_days: median(&mut durations),
        by_type,
    }
}

/// True median of a non-empty slice; sorts in place.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
