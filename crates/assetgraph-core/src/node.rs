//! # Dependency Nodes
//!
//! One `DependencyNode` exists per tracked asset, created the instant an
//! asset id becomes tracked and destroyed the instant it becomes untracked.
//! Between those events it is mutated only by the manager: `parents` and
//! `missing` are derived state, never written by callers.

use crate::{AssetId, CollectionId, Location, Reference};
use std::collections::{BTreeMap, BTreeSet};

/// Per-asset dependency record.
///
/// Outgoing edges are keyed by target, so multiple typed pointers to the
/// same target collapse to one edge. `missing` is always a subset of the
/// outgoing targets: exactly those not currently tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub(crate) id: AssetId,
    pub(crate) collection: CollectionId,
    pub(crate) location: Location,
    pub(crate) outgoing: BTreeMap<AssetId, Reference>,
    pub(crate) parents: BTreeSet<AssetId>,
    pub(crate) missing: BTreeSet<AssetId>,
}

impl DependencyNode {
    pub(crate) fn new(id: AssetId, collection: CollectionId, location: Location) -> Self {
        Self {
            id,
            collection,
            location,
            outgoing: BTreeMap::new(),
            parents: BTreeSet::new(),
            missing: BTreeSet::new(),
        }
    }

    /// The asset this node tracks.
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// The collection that owns the asset.
    #[must_use]
    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    /// The asset's current storage location.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Outgoing reference edges in deterministic target order.
    pub fn outgoing(&self) -> impl Iterator<Item = &Reference> {
        self.outgoing.values()
    }

    /// The stored edge to a particular target, if the asset references it.
    #[must_use]
    pub fn reference_to(&self, target: &AssetId) -> Option<&Reference> {
        self.outgoing.get(target)
    }

    /// Assets that reference this one (derived, maintained by the manager).
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<AssetId> {
        &self.parents
    }

    /// Outgoing targets that are not currently tracked.
    #[must_use]
    pub fn missing_targets(&self) -> &BTreeSet<AssetId> {
        &self.missing
    }

    /// Check whether any outgoing reference is unresolved.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Outgoing targets that are currently tracked.
    pub fn resolved_children(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.outgoing
            .keys()
            .filter(|target| !self.missing.contains(target))
            .copied()
    }

    /// The full `Reference` values for the currently missing targets.
    pub(crate) fn missing_references(&self) -> impl Iterator<Item = &Reference> {
        self.missing.iter().filter_map(|target| self.outgoing.get(target))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_edges() -> DependencyNode {
        let mut node = DependencyNode::new(AssetId(1), CollectionId(1), Location::new("a"));
        node.outgoing.insert(
            AssetId(2),
            Reference::content(AssetId(2), Location::new("b")),
        );
        node.outgoing.insert(
            AssetId(3),
            Reference::inheritance(AssetId(3), Location::new("c")),
        );
        node.missing.insert(AssetId(3));
        node
    }

    #[test]
    fn resolved_children_excludes_missing() {
        let node = node_with_edges();
        let resolved: Vec<_> = node.resolved_children().collect();
        assert_eq!(resolved, vec![AssetId(2)]);
    }

    #[test]
    fn missing_references_resolve_to_full_edges() {
        let node = node_with_edges();
        let missing: Vec<_> = node.missing_references().collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].target, AssetId(3));
        assert!(missing[0].is_inheritance());
        assert_eq!(missing[0].location_hint.as_str(), "c");
    }

    #[test]
    fn has_missing_reflects_set() {
        let mut node = node_with_edges();
        assert!(node.has_missing());
        node.missing.clear();
        assert!(!node.has_missing());
    }
}
