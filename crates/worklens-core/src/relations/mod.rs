//! Relation-type classification and work-item enrichment.
//!
//! The backend reports links between work items using dotted wire
//! identifiers (`System.LinkTypes.Hierarchy-Reverse` and friends). This
//! module maps them onto the closed [`RelationKind`] set exactly once, at
//! ingestion, so hierarchy assembly and analytics never touch the wire
//! vocabulary.

pub mod enrich;

pub use enrich::{DEFAULT_LOOKUP_LIMIT, RawRelation, RelationsSource, enrich_work_items};

use crate::model::RelationKind;

/// Classify a raw backend link-type identifier.
///
/// The kind names **this item's role** in the link: a forward hierarchy
/// link points at the item's child, so the item itself is a `Parent`; a
/// reverse link points at its parent, so the item is a `Child`. Dependency
/// links follow the same convention (forward points at what comes after,
/// so the item is a `Predecessor`).
///
/// Total over arbitrary strings: anything outside the known vocabulary is
/// `Other`, never an error and never a free-form string downstream.
#[must_use]
pub fn classify(raw: &str) -> RelationKind {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("System.LinkTypes.Hierarchy-Forward") {
        RelationKind::Parent
    } else if raw.eq_ignore_ascii_case("System.LinkTypes.Hierarchy-Reverse") {
        RelationKind::Child
    } else if raw.eq_ignore_ascii_case("System.LinkTypes.Related") {
        RelationKind::Related
    } else if raw.eq_ignore_ascii_case("System.LinkTypes.Dependency-Forward") {
        RelationKind::Predecessor
    } else if raw.eq_ignore_ascii_case("System.LinkTypes.Dependency-Reverse") {
        RelationKind::Successor
    } else {
        RelationKind::Other
    }
}
