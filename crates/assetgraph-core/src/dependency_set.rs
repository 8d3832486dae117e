//! # Dependency Snapshots
//!
//! `DependencySet` is the read-only result of a dependency query: direct or
//! transitive children and parents of an asset, plus missing-reference
//! detail. It is returned by value and never aliases manager-owned state, so
//! later mutations do not retroactively change a snapshot a caller holds.

use crate::{AssetId, Reference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An owned snapshot of an asset's dependencies at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
    id: AssetId,
    children: BTreeSet<AssetId>,
    parents: BTreeSet<AssetId>,
    missing_references: BTreeSet<Reference>,
}

impl DependencySet {
    pub(crate) fn new(
        id: AssetId,
        children: BTreeSet<AssetId>,
        parents: BTreeSet<AssetId>,
        missing_references: BTreeSet<Reference>,
    ) -> Self {
        Self {
            id,
            children,
            parents,
            missing_references,
        }
    }

    /// The asset the query was made for.
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Resolved referenced assets (direct or transitive, per the query).
    #[must_use]
    pub fn children(&self) -> &BTreeSet<AssetId> {
        &self.children
    }

    /// Referencing assets (direct or transitive, per the query).
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<AssetId> {
        &self.parents
    }

    /// Whether any reference in the queried scope is unresolved.
    #[must_use]
    pub fn has_missing_references(&self) -> bool {
        !self.missing_references.is_empty()
    }

    /// Full reference detail (including location hints) for every
    /// unresolved reference in the queried scope.
    #[must_use]
    pub fn missing_references(&self) -> &BTreeSet<Reference> {
        &self.missing_references
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    #[test]
    fn snapshot_reports_missing_state() {
        let clean = DependencySet::new(
            AssetId(1),
            BTreeSet::from([AssetId(2)]),
            BTreeSet::new(),
            BTreeSet::new(),
        );
        assert!(!clean.has_missing_references());

        let broken = DependencySet::new(
            AssetId(1),
            BTreeSet::new(),
            BTreeSet::new(),
            BTreeSet::from([Reference::content(AssetId(9), Location::new("gone"))]),
        );
        assert!(broken.has_missing_references());
        assert_eq!(broken.missing_references().len(), 1);
    }
}
