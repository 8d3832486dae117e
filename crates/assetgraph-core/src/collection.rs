//! # Asset Collections
//!
//! A collection (package) is a named group of assets attached to or detached
//! from the dependency manager as a unit. The manager borrows collections to
//! read their membership and contents; it never mutates them.

use crate::{AssetHandle, AssetId, CollectionId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named group of assets with an optional on-disk root directory.
///
/// The root directory, when present, is what the change watcher observes
/// while file tracking is enabled.
#[derive(Debug, Clone)]
pub struct AssetCollection<C> {
    id: CollectionId,
    name: String,
    root: Option<PathBuf>,
    assets: BTreeMap<AssetId, AssetHandle<C>>,
}

impl<C> AssetCollection<C> {
    /// Create a new empty collection.
    #[must_use]
    pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            root: None,
            assets: BTreeMap::new(),
        }
    }

    /// Set the on-disk root directory of this collection.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// The collection identity.
    #[must_use]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The on-disk root directory, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Insert an asset handle, returning the previous handle with the same
    /// id if one was present.
    pub fn insert(&mut self, handle: AssetHandle<C>) -> Option<AssetHandle<C>> {
        self.assets.insert(handle.id, handle)
    }

    /// Remove an asset by id.
    pub fn remove(&mut self, id: &AssetId) -> Option<AssetHandle<C>> {
        self.assets.remove(id)
    }

    /// Get an asset handle by id.
    #[must_use]
    pub fn get(&self, id: &AssetId) -> Option<&AssetHandle<C>> {
        self.assets.get(id)
    }

    /// Check membership by id.
    #[must_use]
    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    /// Iterate over asset handles in deterministic id order.
    pub fn handles(&self) -> impl Iterator<Item = &AssetHandle<C>> {
        self.assets.values()
    }

    /// Number of assets in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the collection has no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    fn handle(id: u64, loc: &str) -> AssetHandle<Vec<u8>> {
        AssetHandle::new(AssetId(id), Location::new(loc), Vec::new())
    }

    #[test]
    fn insert_and_get() {
        let mut collection = AssetCollection::new(CollectionId(1), "game");
        assert!(collection.insert(handle(1, "a")).is_none());

        assert!(collection.contains(&AssetId(1)));
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.get(&AssetId(1)).map(|h| h.location.as_str()),
            Some("a")
        );
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut collection = AssetCollection::new(CollectionId(1), "game");
        collection.insert(handle(1, "old"));
        let previous = collection.insert(handle(1, "new"));

        assert_eq!(previous.map(|h| h.location), Some(Location::new("old")));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn handles_iterate_in_id_order() {
        let mut collection = AssetCollection::new(CollectionId(1), "game");
        collection.insert(handle(3, "c"));
        collection.insert(handle(1, "a"));
        collection.insert(handle(2, "b"));

        let ids: Vec<_> = collection.handles().map(|h| h.id).collect();
        assert_eq!(ids, vec![AssetId(1), AssetId(2), AssetId(3)]);
    }

    #[test]
    fn root_is_optional() {
        let bare: AssetCollection<()> = AssetCollection::new(CollectionId(1), "bare");
        assert!(bare.root().is_none());

        let rooted: AssetCollection<()> =
            AssetCollection::new(CollectionId(2), "rooted").with_root("/tmp/project");
        assert_eq!(rooted.root(), Some(Path::new("/tmp/project")));
    }
}
