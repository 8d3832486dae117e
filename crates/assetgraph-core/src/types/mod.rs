//! # Core Type Definitions
//!
//! This module contains all core types for the assetgraph dependency engine:
//! - Asset and collection identifiers (`AssetId`, `CollectionId`)
//! - Storage locations (`Location`)
//! - Directed reference edges (`Reference`, `ReferenceKind`)
//! - Externally visible asset units (`AssetHandle`)
//! - File tracking events (`AssetFileChangedEvent`, `FileChangeKind`)
//! - Error types (`AssetGraphError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer identifiers only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ASSET & COLLECTION IDENTIFIERS
// =============================================================================

/// Globally unique, stable identity of an asset, independent of its storage
/// location. Uniqueness across collections is the session collaborator's
/// contract; the engine only reports violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Identity of an asset collection (package) attached to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CollectionId(pub u64);

// =============================================================================
// LOCATION
// =============================================================================

/// Storage location of an asset.
///
/// Locations may change without changing the owning `AssetId`; they are also
/// used as human-readable hints for references whose target is not currently
/// tracked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location(pub String);

impl Location {
    /// Create a new location from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the location as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// REFERENCES
// =============================================================================

/// The semantic kind of a directed reference edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// The referencing asset embeds or uses the target's compiled output.
    Content,
    /// The referencing asset derives its default values from the target
    /// (its base/archetype).
    Inheritance,
}

/// A directed reference edge from one asset to another.
///
/// The `location_hint` is usable for diagnostics before the target is known
/// to exist. Multiple references to the same target collapse to one edge for
/// graph purposes; the extractor contract already guarantees one edge per
/// logical target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The target asset identity.
    pub target: AssetId,
    /// Content or inheritance edge.
    pub kind: ReferenceKind,
    /// Human-readable location of the target, valid even when unresolved.
    pub location_hint: Location,
}

impl Reference {
    /// Create a content reference.
    #[must_use]
    pub fn content(target: AssetId, location_hint: Location) -> Self {
        Self {
            target,
            kind: ReferenceKind::Content,
            location_hint,
        }
    }

    /// Create an inheritance (base/archetype) reference.
    #[must_use]
    pub fn inheritance(target: AssetId, location_hint: Location) -> Self {
        Self {
            target,
            kind: ReferenceKind::Inheritance,
            location_hint,
        }
    }

    /// Check whether this is an inheritance edge.
    #[must_use]
    pub fn is_inheritance(&self) -> bool {
        self.kind == ReferenceKind::Inheritance
    }
}

// =============================================================================
// ASSET HANDLE
// =============================================================================

/// The externally visible unit the engine is told about: identity, current
/// storage location, and the in-memory content the reference extractor
/// understands. The content type is opaque to the graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHandle<C> {
    /// Stable identity of the asset.
    pub id: AssetId,
    /// Current storage location.
    pub location: Location,
    /// The asset's in-memory object graph.
    pub content: C,
}

impl<C> AssetHandle<C> {
    /// Create a new handle.
    #[must_use]
    pub fn new(id: AssetId, location: Location, content: C) -> Self {
        Self {
            id,
            location,
            content,
        }
    }
}

// =============================================================================
// FILE TRACKING EVENTS
// =============================================================================

/// The kind of an external file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileChangeKind {
    /// A file appeared under a watched root.
    Added,
    /// A watched file's content changed.
    Updated,
    /// A watched file was removed.
    Deleted,
}

/// A queued external file change, drained by
/// [`find_asset_file_changed_events`](crate::DependencyManager::find_asset_file_changed_events).
///
/// The manager never applies these automatically; the caller decides whether
/// to re-parse and feed the change back through `notify_modified` /
/// `notify_removed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFileChangedEvent {
    /// The on-disk location the event refers to.
    pub location: Location,
    /// What happened to the file.
    pub kind: FileChangeKind,
    /// The tracked asset at that location, when one matches.
    pub asset_id: Option<AssetId>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the dependency engine.
///
/// Expected steady states are never errors: unresolved references are
/// recorded in the graph's own missing-reference bookkeeping, queries for
/// unknown assets return empty/absent results, and cycles are handled by
/// construction in every traversal.
#[derive(Debug, Error)]
pub enum AssetGraphError {
    /// An asset id already tracked elsewhere was seen again. The offending
    /// asset is skipped; the rest of the batch proceeds.
    #[error("Asset id already tracked: {0:?}")]
    DuplicateAssetId(AssetId),

    /// An asset handle failed validation (empty or oversized location).
    #[error("Invalid asset handle: {0:?}")]
    InvalidHandle(AssetId),

    /// A filesystem watch could not be registered or removed.
    #[error("Watch error: {0}")]
    Watch(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn reference_constructors_set_kind() {
        let hint = Location::new("textures/stone.dds");
        let content = Reference::content(AssetId(1), hint.clone());
        let base = Reference::inheritance(AssetId(2), hint);

        assert_eq!(content.kind, ReferenceKind::Content);
        assert!(!content.is_inheritance());
        assert_eq!(base.kind, ReferenceKind::Inheritance);
        assert!(base.is_inheritance());
    }

    #[test]
    fn references_order_by_target_first() {
        let mut set = BTreeSet::new();
        set.insert(Reference::content(AssetId(3), Location::new("c")));
        set.insert(Reference::inheritance(AssetId(1), Location::new("a")));
        set.insert(Reference::content(AssetId(2), Location::new("b")));

        let targets: Vec<_> = set.iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![AssetId(1), AssetId(2), AssetId(3)]);
    }

    #[test]
    fn location_roundtrip() {
        let loc = Location::new("models/ship.xkm");
        assert_eq!(loc.as_str(), "models/ship.xkm");
    }
}
