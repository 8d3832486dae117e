//! # Dependency Manager
//!
//! The coordinator of the dependency engine. It owns the node table, the two
//! global missing-reference indices, and the inheritance index; it processes
//! structural mutation events from tracked collections and answers all
//! queries.
//!
//! ## Consistency
//!
//! Every mutating call finishes all derived bookkeeping before returning:
//! parent sets, missing-target sets, and the global indices are consistent
//! whenever a query can observe them. There is no lazily recomputed state.
//!
//! ## Concurrency
//!
//! Structural mutation takes `&mut self`, queries take `&self`; the
//! exclusive/shared locking discipline is the borrow checker's. Callers that
//! share a manager across threads wrap it in `RwLock`. Watcher threads never
//! touch the graph; they only feed the bounded event queue drained by
//! [`find_asset_file_changed_events`](DependencyManager::find_asset_file_changed_events).

use crate::limits::MAX_LOCATION_LENGTH;
use crate::node::DependencyNode;
use crate::watcher::ChangeWatcher;
use crate::{
    AssetCollection, AssetFileChangedEvent, AssetGraphError, AssetHandle, AssetId, CollectionId,
    DependencySet, Location, Reference, ReferenceExtractor,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;
use tracing::{debug, warn};

/// The incremental dependency graph over every attached collection.
///
/// Reference edges come in through the injected [`ReferenceExtractor`]; the
/// manager itself never inspects asset content.
pub struct DependencyManager<X: ReferenceExtractor> {
    extractor: X,

    /// One node per tracked asset.
    nodes: BTreeMap<AssetId, DependencyNode>,

    /// Asset ids owned by each attached collection.
    collections: BTreeMap<CollectionId, BTreeSet<AssetId>>,

    /// On-disk roots of attached collections, for file tracking.
    collection_roots: BTreeMap<CollectionId, PathBuf>,

    /// Reverse lookup: storage location -> tracked asset.
    locations: BTreeMap<Location, AssetId>,

    /// Assets with at least one unresolved reference.
    assets_with_missing: BTreeSet<AssetId>,

    /// Untracked target -> assets waiting on it.
    missing_to_parents: BTreeMap<AssetId, BTreeSet<AssetId>>,

    /// Tracked base -> assets whose inheritance edge points at it.
    inheriting: BTreeMap<AssetId, BTreeSet<AssetId>>,

    /// Present while file tracking is enabled.
    watcher: Option<ChangeWatcher>,
}

impl<X: ReferenceExtractor> DependencyManager<X> {
    /// Create an empty manager around the given extractor.
    #[must_use]
    pub fn new(extractor: X) -> Self {
        Self {
            extractor,
            nodes: BTreeMap::new(),
            collections: BTreeMap::new(),
            collection_roots: BTreeMap::new(),
            locations: BTreeMap::new(),
            assets_with_missing: BTreeSet::new(),
            missing_to_parents: BTreeMap::new(),
            inheriting: BTreeMap::new(),
            watcher: None,
        }
    }

    // =========================================================================
    // COLLECTION ATTACHMENT
    // =========================================================================

    /// Ingest every asset currently in `collection`.
    ///
    /// A duplicate asset id aborts ingestion of that one asset; the rest of
    /// the batch proceeds, and the first duplicate is reported afterwards.
    /// Tracking an already-attached collection is a no-op.
    pub fn track(
        &mut self,
        collection: &AssetCollection<X::Content>,
    ) -> Result<(), AssetGraphError> {
        let collection_id = collection.id();
        if self.collections.contains_key(&collection_id) {
            return Ok(());
        }
        self.collections.insert(collection_id, BTreeSet::new());

        if let Some(root) = collection.root() {
            self.collection_roots
                .insert(collection_id, root.to_path_buf());
            if let Some(watcher) = &mut self.watcher {
                if let Err(error) = watcher.watch(root) {
                    warn!(%error, root = %root.display(), "failed to watch collection root");
                }
            }
        }

        let mut first_error = None;
        for handle in collection.handles() {
            if let Err(error) = self.insert(collection_id, handle) {
                warn!(%error, "skipping asset during track");
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        debug!(
            collection = collection_id.0,
            assets = collection.len(),
            "tracked collection"
        );
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Remove every asset owned by `collection_id`.
    ///
    /// Afterwards no query surfaces those ids, and any remaining asset that
    /// referenced them transitions to missing. Unknown collections are a
    /// no-op.
    pub fn untrack(&mut self, collection_id: CollectionId) {
        let Some(owned) = self.collections.remove(&collection_id) else {
            return;
        };
        for asset in owned {
            self.remove(asset);
        }
        if let Some(root) = self.collection_roots.remove(&collection_id) {
            if let Some(watcher) = &mut self.watcher {
                watcher.unwatch(&root);
            }
        }
        debug!(collection = collection_id.0, "untracked collection");
    }

    // =========================================================================
    // FINE-GRAINED MEMBERSHIP EVENTS
    // =========================================================================

    /// A single asset was added to an attached collection.
    pub fn notify_added(
        &mut self,
        collection_id: CollectionId,
        handle: &AssetHandle<X::Content>,
    ) -> Result<(), AssetGraphError> {
        self.collections.entry(collection_id).or_default();
        self.insert(collection_id, handle)
    }

    /// A single asset was removed from its collection. Unknown ids are a
    /// no-op.
    pub fn notify_removed(&mut self, id: AssetId) {
        if self.nodes.contains_key(&id) {
            self.remove(id);
        } else {
            debug!(asset = id.0, "notify_removed for untracked asset");
        }
    }

    /// An asset's content (and possibly location) changed. The handle
    /// carries the current content; only the edge delta is applied, so the
    /// node and the parent pointers into it survive. Handles are validated
    /// exactly as on addition; an invalid handle leaves the asset untouched.
    /// Unknown ids are a no-op.
    pub fn notify_modified(
        &mut self,
        handle: &AssetHandle<X::Content>,
    ) -> Result<(), AssetGraphError> {
        Self::validate(handle.id, &handle.location)?;
        if self.nodes.contains_key(&handle.id) {
            self.modify(handle);
        } else {
            debug!(asset = handle.id.0, "notify_modified for untracked asset");
        }
        Ok(())
    }

    // =========================================================================
    // INTERNAL MUTATION PATHS
    // =========================================================================

    fn validate(handle_id: AssetId, location: &Location) -> Result<(), AssetGraphError> {
        let location = location.as_str();
        if location.is_empty() || location.len() > MAX_LOCATION_LENGTH {
            return Err(AssetGraphError::InvalidHandle(handle_id));
        }
        Ok(())
    }

    fn insert(
        &mut self,
        collection_id: CollectionId,
        handle: &AssetHandle<X::Content>,
    ) -> Result<(), AssetGraphError> {
        Self::validate(handle.id, &handle.location)?;
        if self.nodes.contains_key(&handle.id) {
            return Err(AssetGraphError::DuplicateAssetId(handle.id));
        }

        let id = handle.id;
        let mut node = DependencyNode::new(id, collection_id, handle.location.clone());
        for reference in self.extractor.extract(&handle.content) {
            node.outgoing.insert(reference.target, reference);
        }
        let edges: Vec<(AssetId, bool)> = node
            .outgoing
            .values()
            .map(|r| (r.target, r.is_inheritance()))
            .collect();

        self.nodes.insert(id, node);
        if let Some(owned) = self.collections.get_mut(&collection_id) {
            owned.insert(id);
        }
        self.locations.insert(handle.location.clone(), id);

        for (target, is_inheritance) in edges {
            self.connect_edge(id, target, is_inheritance);
        }
        self.refresh_missing_index(id);

        // This id may resolve references other assets were waiting on.
        self.resolve_pending(id);
        Ok(())
    }

    /// Re-link every asset whose missing references pointed at the newly
    /// tracked `id`.
    fn resolve_pending(&mut self, id: AssetId) {
        let Some(waiters) = self.missing_to_parents.remove(&id) else {
            return;
        };
        for waiter in waiters {
            let mut is_inheritance = false;
            let mut resolved = false;
            if let Some(wnode) = self.nodes.get_mut(&waiter) {
                if wnode.missing.remove(&id) {
                    resolved = true;
                    is_inheritance = wnode
                        .outgoing
                        .get(&id)
                        .is_some_and(|r| r.is_inheritance());
                }
            }
            if !resolved {
                continue;
            }
            self.refresh_missing_index(waiter);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parents.insert(waiter);
            }
            if is_inheritance {
                self.inheriting.entry(id).or_default().insert(waiter);
            }
        }
    }

    fn remove(&mut self, id: AssetId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        if let Some(owned) = self.collections.get_mut(&node.collection) {
            owned.remove(&id);
        }
        self.locations.remove(&node.location);
        self.assets_with_missing.remove(&id);
        self.inheriting.remove(&id);

        // Every remaining parent now holds an unresolved reference to id.
        for &parent in &node.parents {
            let Some(pnode) = self.nodes.get_mut(&parent) else {
                continue;
            };
            pnode.missing.insert(id);
            self.assets_with_missing.insert(parent);
            self.missing_to_parents.entry(id).or_default().insert(parent);
        }

        // Drop this id from its targets' bookkeeping, tracked or not.
        for reference in node.outgoing.values() {
            self.disconnect_edge(id, reference.target, reference.is_inheritance());
        }
    }

    fn modify(&mut self, handle: &AssetHandle<X::Content>) {
        let id = handle.id;
        let mut new_outgoing: BTreeMap<AssetId, Reference> = BTreeMap::new();
        for reference in self.extractor.extract(&handle.content) {
            new_outgoing.insert(reference.target, reference);
        }

        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let old_outgoing = std::mem::replace(&mut node.outgoing, new_outgoing.clone());
        let old_location = std::mem::replace(&mut node.location, handle.location.clone());
        if old_location != handle.location {
            self.locations.remove(&old_location);
            self.locations.insert(handle.location.clone(), id);
        }

        for (target, old_ref) in &old_outgoing {
            if !new_outgoing.contains_key(target) {
                self.disconnect_edge(id, *target, old_ref.is_inheritance());
            }
        }
        for (target, new_ref) in &new_outgoing {
            match old_outgoing.get(target) {
                None => self.connect_edge(id, *target, new_ref.is_inheritance()),
                Some(old_ref) => {
                    // A kept edge can flip kind; the inheritance index only
                    // holds resolved edges.
                    if old_ref.kind != new_ref.kind && self.nodes.contains_key(target) {
                        if old_ref.is_inheritance() {
                            self.drop_inheriting(*target, id);
                        }
                        if new_ref.is_inheritance() {
                            self.inheriting.entry(*target).or_default().insert(id);
                        }
                    }
                }
            }
        }

        self.refresh_missing_index(id);
    }

    /// Wire one new edge from `source`: either resolve it against a tracked
    /// target or record it as missing.
    fn connect_edge(&mut self, source: AssetId, target: AssetId, is_inheritance: bool) {
        if self.nodes.contains_key(&target) {
            if let Some(tnode) = self.nodes.get_mut(&target) {
                tnode.parents.insert(source);
            }
            if is_inheritance {
                self.inheriting.entry(target).or_default().insert(source);
            }
        } else {
            if let Some(snode) = self.nodes.get_mut(&source) {
                snode.missing.insert(target);
            }
            self.missing_to_parents.entry(target).or_default().insert(source);
        }
    }

    /// Reverse of [`connect_edge`](Self::connect_edge) for one removed edge.
    fn disconnect_edge(&mut self, source: AssetId, target: AssetId, was_inheritance: bool) {
        if self.nodes.contains_key(&target) {
            if let Some(tnode) = self.nodes.get_mut(&target) {
                tnode.parents.remove(&source);
            }
            if was_inheritance {
                self.drop_inheriting(target, source);
            }
        } else {
            if let Some(snode) = self.nodes.get_mut(&source) {
                snode.missing.remove(&target);
            }
            let empty = if let Some(waiters) = self.missing_to_parents.get_mut(&target) {
                waiters.remove(&source);
                waiters.is_empty()
            } else {
                false
            };
            if empty {
                self.missing_to_parents.remove(&target);
            }
        }
    }

    fn drop_inheriting(&mut self, base: AssetId, derived: AssetId) {
        let empty = if let Some(set) = self.inheriting.get_mut(&base) {
            set.remove(&derived);
            set.is_empty()
        } else {
            false
        };
        if empty {
            self.inheriting.remove(&base);
        }
    }

    /// Keep the global assets-with-missing index in step with one node.
    fn refresh_missing_index(&mut self, id: AssetId) {
        match self.nodes.get(&id) {
            Some(node) if node.has_missing() => {
                self.assets_with_missing.insert(id);
            }
            _ => {
                self.assets_with_missing.remove(&id);
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Look up the raw node for a tracked asset.
    #[must_use]
    pub fn lookup(&self, id: AssetId) -> Option<&DependencyNode> {
        self.nodes.get(&id)
    }

    /// Check whether an asset id is currently tracked.
    #[must_use]
    pub fn is_tracked(&self, id: AssetId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of tracked assets.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attached collection ids in deterministic order.
    pub fn tracked_collections(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.collections.keys().copied()
    }

    /// Direct children/parents of `id` plus missing-reference detail.
    ///
    /// Returns `None` (never panics) if `id` is untracked.
    #[must_use]
    pub fn find_dependency_set(&self, id: AssetId) -> Option<DependencySet> {
        let node = self.nodes.get(&id)?;
        Some(DependencySet::new(
            id,
            node.resolved_children().collect(),
            node.parents.clone(),
            node.missing_references().cloned().collect(),
        ))
    }

    /// Transitive closure of `id` in both directions.
    ///
    /// Each node is visited at most once, so the traversal terminates on
    /// cycles; a pure cycle of N tracked assets yields a closure of exactly
    /// N members from any of them. Missing-reference detail is collected
    /// from every asset visited on the children side.
    #[must_use]
    pub fn compute_dependencies(&self, id: AssetId) -> Option<DependencySet> {
        self.nodes.get(&id)?;

        let mut children = BTreeSet::new();
        let mut missing = BTreeSet::new();
        let mut visited = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for reference in node.outgoing.values() {
                if node.missing.contains(&reference.target) {
                    missing.insert(reference.clone());
                    continue;
                }
                children.insert(reference.target);
                if visited.insert(reference.target) {
                    queue.push_back(reference.target);
                }
            }
        }

        let mut parents = BTreeSet::new();
        let mut visited = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for &parent in &node.parents {
                parents.insert(parent);
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        Some(DependencySet::new(id, children, parents, missing))
    }

    /// Whether any tracked asset currently has an unresolved reference.
    #[must_use]
    pub fn has_missing_references(&self) -> bool {
        !self.assets_with_missing.is_empty()
    }

    /// Every tracked asset with at least one unresolved reference.
    #[must_use]
    pub fn find_assets_with_missing_references(&self) -> BTreeSet<AssetId> {
        self.assets_with_missing.clone()
    }

    /// Full reference detail (including location hints) for the unresolved
    /// references of `id`. Empty for untracked or fully resolved assets.
    #[must_use]
    pub fn find_missing_references(&self, id: AssetId) -> BTreeSet<Reference> {
        self.nodes
            .get(&id)
            .map(|node| node.missing_references().cloned().collect())
            .unwrap_or_default()
    }

    /// Assets whose inheritance edge points directly at `base_id`. Direct
    /// relationship only; no transitive flattening.
    #[must_use]
    pub fn find_assets_inheriting_from(&self, base_id: AssetId) -> BTreeSet<AssetId> {
        self.inheriting.get(&base_id).cloned().unwrap_or_default()
    }

    // =========================================================================
    // FILE TRACKING
    // =========================================================================

    /// Enable or disable filesystem tracking of attached collection roots.
    ///
    /// Enabling starts one background observer per root already attached;
    /// roots attached later are observed as part of `track`. Disabling stops
    /// every observer and discards queued events.
    pub fn set_tracking_enabled(&mut self, enabled: bool) -> Result<(), AssetGraphError> {
        if !enabled {
            self.watcher = None;
            return Ok(());
        }
        if self.watcher.is_some() {
            return Ok(());
        }
        let mut watcher = ChangeWatcher::new();
        for root in self.collection_roots.values() {
            watcher.watch(root)?;
        }
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Whether filesystem tracking is currently enabled.
    #[must_use]
    pub fn is_tracking_enabled(&self) -> bool {
        self.watcher.is_some()
    }

    /// Drain the queued external file changes.
    ///
    /// Draining consumes the queue, so it takes `&mut self` like every other
    /// state-consuming operation. Events are annotated with the tracked
    /// asset at the event's location when one matches. The manager never
    /// applies these automatically; the caller decides whether to re-parse
    /// and feed the change back through `notify_modified` /
    /// `notify_removed`.
    #[must_use]
    pub fn find_asset_file_changed_events(&mut self) -> Vec<AssetFileChangedEvent> {
        let Some(watcher) = &self.watcher else {
            return Vec::new();
        };
        watcher
            .drain()
            .into_iter()
            .map(|event| {
                let location = Location::new(event.path.to_string_lossy());
                let asset_id = self.locations.get(&location).copied();
                AssetFileChangedEvent {
                    location,
                    kind: event.change,
                    asset_id,
                }
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
