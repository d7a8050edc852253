//! Velocity trend classification and planning recommendations.
//!
//! # Overview
//!
//! Given the per-sprint velocity series, classify how completed points are
//! moving and attach up to three short, deterministic recommendations. The
//! baseline for "how much did we change" is the mean of all points before
//! the latest one: a single sprint is noise, the running mean is not.
//!
//! Thresholds are deliberately explicit tunables ([`TrendConfig`]) rather
//! than inlined constants; see that module for the defaults.

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::velocity::VelocityPoint;

/// Completion rate below which the latest sprint draws a recommendation.
const LOW_COMPLETION_RATE: f64 = 0.7;

/// Direction of the velocity series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

/// Trend classification plus supporting numbers and advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityTrend {
    pub trend: Trend,
    /// Signed percent difference between the latest point and the prior
    /// baseline (mean of all earlier points). Symmetric form: the delta is
    /// taken relative to the mean of the two values, so a 10 -> 30 jump is
    /// +100%, not +200%.
    pub change_percentage: f64,
    /// 0-3 short heuristic strings, deterministic for a given series.
    pub recommendations: Vec<String>,
}

/// Classify the velocity series with default thresholds.
#[must_use]
pub fn analyze_velocity_trends(points: &[VelocityPoint]) -> VelocityTrend {
    analyze_velocity_trends_with(points, &TrendConfig::default())
}

/// Classify the velocity series with explicit thresholds.
///
/// Fewer than two points cannot carry a trend: the result is `Stable` with
/// zero change and no recommendations beyond completion-rate advice.
#[must_use]
pub fn analyze_velocity_trends_with(
    points: &[VelocityPoint],
    config: &TrendConfig,
) -> VelocityTrend {
    if points.len() < 2 {
        return VelocityTrend {
            trend: Trend::Stable,
            change_percentage: 0.0,
            recommendations: recommendations(points, Trend::Stable),
        };
    }

    let completed: Vec<f64> = points.iter().map(|p| p.story_points_completed).collect();
    let latest = completed[completed.len() - 1];
    #[allow(clippy::cast_precision_loss)]
    let baseline =
        completed[..completed.len() - 1].iter().sum::<f64>() / (completed.len() - 1) as f64;

    let change_percentage = percent_change(baseline, latest);

    let trend = if is_volatile(&completed, config) {
        Trend::Volatile
    } else if change_percentage.abs() <= config.stable_band_pct {
        Trend::Stable
    } else if change_percentage > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    VelocityTrend {
        trend,
        change_percentage,
        recommendations: recommendations(points, trend),
    }
}

/// Signed symmetric percent difference from `from` to `to`: the delta over
/// the mean of the two magnitudes. Bounded in ±200 and defined for a zero
/// baseline, unlike the naive `delta / from` form.
fn percent_change(from: f64, to: f64) -> f64 {
    if (to - from).abs() < f64::EPSILON {
        return 0.0;
    }
    let mean = (from.abs() + to.abs()) / 2.0;
    if mean == 0.0 {
        return 0.0;
    }
    (to - from) / mean * 100.0
}

/// Sign-alternating consecutive swings, each at or beyond the volatile
/// threshold, mark a sawtooth series. Needs at least three points (two
/// swings); a single jump is a direction, not volatility.
fn is_volatile(completed: &[f64], config: &TrendConfig) -> bool {
    let swings: Vec<f64> = completed
        .windows(2)
        .map(|pair| percent_change(pair[0], pair[1]))
        .collect();

    swings.windows(2).any(|pair| {
        pair[0].signum() != pair[1].signum()
            && pair[0].abs() >= config.volatile_swing_pct
            && pair[1].abs() >= config.volatile_swing_pct
    })
}

/// Up to three deterministic, ordered recommendations.
fn recommendations(points: &[VelocityPoint], trend: Trend) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(latest) = points.last() {
        if latest.story_points_planned > 0.0 && latest.completion_rate < LOW_COMPLETION_RATE {
            out.push(format!(
                "Latest sprint completed {:.0}% of planned points; consider planning less work",
                latest.completion_rate * 100.0
            ));
        }
    }
    if trend == Trend::Decreasing {
        out.push(
            "Velocity is trending down; review team capacity and unplanned carryover".to_string(),
        );
    }
    if trend == Trend::Volatile {
        out.push(
            "Velocity swings sharply between sprints; stabilize sprint scope to improve forecasts"
                .to_string(),
        );
    }

    out
}
