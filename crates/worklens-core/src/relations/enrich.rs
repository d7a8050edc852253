//! Bounded-concurrency relation enrichment.
//!
//! # Overview
//!
//! Each matched work item needs one remote lookup to learn its links. The
//! lookups are independent, so they fan out over a small scoped worker pool
//! rather than running one by one — but never unbounded, because the
//! upstream API rate-limits aggressively.
//!
//! # Error isolation
//!
//! A failed lookup affects exactly one item: it is logged and the item
//! passes through unenriched. The batch never aborts. Retry/backoff for
//! transient failures belongs to the HTTP collaborator behind
//! [`RelationsSource`], not here.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use super::classify;
use crate::model::{Relation, WorkItem};

/// Default worker count for the enrichment pool.
pub const DEFAULT_LOOKUP_LIMIT: usize = 4;

/// One link as reported by the backend relations API, unclassified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRelation {
    /// Id of the work item on the other end of the link.
    pub target_id: u64,
    /// Backend link-type identifier, e.g. `System.LinkTypes.Related`.
    pub link_type: String,
}

/// The external relations-fetch collaborator.
///
/// Implementations are expected to be time-bounded by their caller; this
/// module imposes no timeout of its own and performs no retries.
pub trait RelationsSource {
    /// All links reported for `id`. An empty vec means "no relations", an
    /// error means "lookup failed" — the distinction matters for logging
    /// only, both leave the item unenriched.
    ///
    /// # Errors
    ///
    /// Any transport or decoding failure from the backend.
    fn relations(&self, id: u64) -> anyhow::Result<Vec<RawRelation>>;
}

/// Enrich `items` with classified relations, preserving input order.
///
/// At most `limit` lookups are in flight at once (`0` is treated as `1`).
/// Items whose lookup fails or reports no links come back unchanged.
#[must_use]
pub fn enrich_work_items<S>(source: &S, mut items: Vec<WorkItem>, limit: usize) -> Vec<WorkItem>
where
    S: RelationsSource + Sync,
{
    if items.is_empty() {
        return items;
    }

    let workers = limit.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let mut relations: Vec<Option<Relation>> = vec![None; items.len()];

    std::thread::scope(|scope| {
        let items = &items;
        let next = &next;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut found: Vec<(usize, Relation)> = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        match source.relations(item.id) {
                            Ok(raw) => {
                                if let Some(relation) = pick_relation(&raw) {
                                    found.push((index, relation));
                                }
                            }
                            Err(err) => {
                                warn!(
                                    id = item.id,
                                    error = %err,
                                    "relation lookup failed; item left unenriched"
                                );
                            }
                        }
                    }
                    found
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(found) => {
                    for (index, relation) in found {
                        relations[index] = Some(relation);
                    }
                }
                Err(_) => warn!("enrichment worker panicked; its items stay unenriched"),
            }
        }
    });

    for (item, relation) in items.iter_mut().zip(relations) {
        item.relation = relation;
    }
    items
}

/// Choose the one relation an item carries for display.
///
/// Hierarchy links dominate: the first Parent/Child link wins, otherwise
/// the first reported link of any kind.
fn pick_relation(raw: &[RawRelation]) -> Option<Relation> {
    let to_relation = |r: &RawRelation| Relation {
        kind: classify(&r.link_type),
        linked_id: r.target_id,
        raw: r.link_type.clone(),
    };

    raw.iter()
        .map(to_relation)
        .find(|relation| relation.kind.is_hierarchical())
        .or_else(|| raw.first().map(|r| to_relation(r)))
}
