//! Assembly of enriched flat results into a display forest.
//!
//! # Overview
//!
//! A search returns a flat item list; enrichment tags some items with a
//! Parent or Child relation. This module turns that into rooted trees:
//!
//! - items without a hierarchical relation are independent single-node
//!   roots (level 0);
//! - Child-tagged items nest beneath the in-set item they link to,
//!   incrementing level;
//! - Parent-tagged items whose linked (lower-level) item is in the set are
//!   folded into a badge on that item instead of adding a tree level, which
//!   keeps the visual depth shallow.
//!
//! # Cycle safety
//!
//! Upstream relation data can be inconsistent (A reported as parent of B
//! and B as parent of A). A per-branch visited-id guard stops descent from
//! ever revisiting an id on the same path, so no item appears among its own
//! transitive descendants regardless of input.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{RelationKind, WorkItem};

/// A consumed parent surfaced as a badge on its child's root node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentBadge {
    pub id: u64,
    pub title: String,
}

/// One node of the display forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalWorkItem {
    pub item: WorkItem,
    pub children: Vec<HierarchicalWorkItem>,
    /// Depth in the tree; roots are level 0.
    pub level: u32,
    /// Present when a Parent-tagged item was folded onto this node.
    pub parent_badge: Option<ParentBadge>,
}

impl HierarchicalWorkItem {
    /// Total node count of this subtree, including self.
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchicalWorkItem::subtree_size)
            .sum::<usize>()
    }
}

/// The assembled forest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub roots: Vec<HierarchicalWorkItem>,
}

impl Hierarchy {
    /// Total node count across all roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.iter().map(HierarchicalWorkItem::subtree_size).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Pure predicate: does any item carry a Parent or Child relation?
///
/// Callers use this to skip hierarchy assembly (and its display mode)
/// entirely for flat result sets.
#[must_use]
pub fn has_hierarchical_relations(items: &[WorkItem]) -> bool {
    items
        .iter()
        .any(|item| item.relation_kind().is_some_and(RelationKind::is_hierarchical))
}

/// Build the display forest from an enriched flat list.
///
/// Root order follows input order; children keep input order. Items whose
/// linked counterpart is missing from the set degrade to plain roots.
#[must_use]
pub fn build_hierarchy(items: &[WorkItem]) -> Hierarchy {
    let by_id: HashMap<u64, &WorkItem> = items.iter().map(|item| (item.id, item)).collect();

    // Child edges: parent id -> child ids, in input order. Self-links are
    // inconsistent data and degrade to plain roots.
    let mut children_of: HashMap<u64, Vec<u64>> = HashMap::new();
    let mut attached: HashSet<u64> = HashSet::new();
    for item in items {
        if let Some(relation) = &item.relation {
            if relation.kind == RelationKind::Child
                && relation.linked_id != item.id
                && by_id.contains_key(&relation.linked_id)
            {
                children_of.entry(relation.linked_id).or_default().push(item.id);
                attached.insert(item.id);
            }
        }
    }

    // Parent-tagged items fold into a badge on their linked child, unless
    // they have children of their own attached (then they must stay a node).
    // An already-consumed linked child blocks folding, so mutual Parent
    // tags cannot erase both items.
    let mut badge_for: HashMap<u64, ParentBadge> = HashMap::new();
    let mut consumed: HashSet<u64> = HashSet::new();
    for item in items {
        if let Some(relation) = &item.relation {
            if relation.kind == RelationKind::Parent
                && relation.linked_id != item.id
                && by_id.contains_key(&relation.linked_id)
                && !children_of.contains_key(&item.id)
                && !consumed.contains(&relation.linked_id)
            {
                badge_for.entry(relation.linked_id).or_insert(ParentBadge {
                    id: item.id,
                    title: item.title.clone(),
                });
                consumed.insert(item.id);
            }
        }
    }

    let mut roots = Vec::new();
    let mut emitted: HashSet<u64> = HashSet::new();

    for item in items {
        if attached.contains(&item.id) || consumed.contains(&item.id) {
            continue;
        }
        let mut on_path = HashSet::new();
        roots.push(build_node(
            item,
            0,
            &by_id,
            &children_of,
            &badge_for,
            &mut on_path,
            &mut emitted,
        ));
    }

    // Inconsistent data can leave attachment cycles with no unattached
    // entry point (A child-of B, B child-of A). Surface each such group
    // once, rooted at its first member in input order.
    for item in items {
        if emitted.contains(&item.id) || consumed.contains(&item.id) {
            continue;
        }
        let mut on_path = HashSet::new();
        roots.push(build_node(
            item,
            0,
            &by_id,
            &children_of,
            &badge_for,
            &mut on_path,
            &mut emitted,
        ));
    }

    Hierarchy { roots }
}

/// Recursively build one node. `on_path` is the per-branch visited guard;
/// `emitted` tracks global emission so cycle groups are surfaced once.
fn build_node(
    item: &WorkItem,
    level: u32,
    by_id: &HashMap<u64, &WorkItem>,
    children_of: &HashMap<u64, Vec<u64>>,
    badge_for: &HashMap<u64, ParentBadge>,
    on_path: &mut HashSet<u64>,
    emitted: &mut HashSet<u64>,
) -> HierarchicalWorkItem {
    on_path.insert(item.id);
    emitted.insert(item.id);

    let mut children = Vec::new();
    if let Some(child_ids) = children_of.get(&item.id) {
        for child_id in child_ids {
            if on_path.contains(child_id) {
                continue; // cycle guard
            }
            if let Some(child) = by_id.get(child_id) {
                children.push(build_node(
                    child,
                    level + 1,
                    by_id,
                    children_of,
                    badge_for,
                    on_path,
                    emitted,
                ));
            }
        }
    }

    on_path.remove(&item.id);

    HierarchicalWorkItem {
        item: item.clone(),
        children,
        level,
        parent_badge: badge_for.get(&item.id).cloned(),
    }
}
