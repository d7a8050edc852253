#![forbid(unsafe_code)]
//! worklens-core library.
//!
//! Data model, WIQL query building and repair, relation enrichment, and
//! hierarchy assembly for the work-item query engine.
//!
//! # Conventions
//!
//! - **Errors**: pure functions are total and return plain values;
//!   collaborator seams return `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`debug!`, `warn!`).

pub mod hierarchy;
pub mod model;
pub mod relations;
pub mod wiql;

pub use hierarchy::{
    Hierarchy, HierarchicalWorkItem, ParentBadge, build_hierarchy, has_hierarchical_relations,
};
pub use model::{
    GlobalFilters, Priority, Relation, RelationKind, Sprint, TimeFrame, WorkItem,
    is_terminal_state,
};
pub use relations::{
    DEFAULT_LOOKUP_LIMIT, RawRelation, RelationsSource, classify, enrich_work_items,
};
pub use wiql::{Command, ValidatedQuery, build_query, parse_id_token, validate_and_fix_query};
