#![forbid(unsafe_code)]
//! worklens-analytics library.
//!
//! Agile performance analytics over flat work-item lists: sprint velocity,
//! team load, velocity trend, and cycle time. Every function here is pure
//! and total — empty or malformed input degrades to zero-valued/empty
//! aggregates, never a panic.
//!
//! # Conventions
//!
//! - **Errors**: analytics functions are total; only config loading returns
//!   `Result`.
//! - **Logging**: use `tracing` macros where behavior needs a trace.

pub mod config;
pub mod cycle_time;
pub mod team;
pub mod trend;
pub mod velocity;

pub use config::{ConfigError, TrendConfig};
pub use cycle_time::{CycleTimeStats, calculate_cycle_time};
pub use team::{TeamMetrics, calculate_team_metrics};
pub use trend::{Trend, VelocityTrend, analyze_velocity_trends, analyze_velocity_trends_with};
pub use velocity::{VelocityPoint, calculate_sprint_velocity};
