//! Data model shared by the query, enrichment, hierarchy, and analytics
//! layers.
//!
//! Everything here is created by (or parsed from) the backend and treated as
//! read-only downstream. Closed enums (`Priority`, `RelationKind`,
//! `TimeFrame`) keep wire vocabulary out of engine logic.

pub mod filters;
pub mod item;
pub mod sprint;

pub use filters::GlobalFilters;
pub use item::{ParseEnumError, Priority, Relation, RelationKind, WorkItem, is_terminal_state};
pub use sprint::{Sprint, TimeFrame};
