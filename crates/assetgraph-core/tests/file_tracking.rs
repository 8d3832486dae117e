//! # File Tracking Tests
//!
//! External filesystem changes under a tracked collection root queue as
//! events until the caller drains them; nothing is ever applied to the graph
//! automatically.

use assetgraph_core::{
    AssetCollection, AssetFileChangedEvent, AssetHandle, AssetId, CollectionId, DependencyManager,
    Location, Reference, ReferenceExtractor,
};
use std::collections::BTreeSet;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

struct NullExtractor;

impl ReferenceExtractor for NullExtractor {
    type Content = ();

    fn extract(&self, (): &Self::Content) -> BTreeSet<Reference> {
        BTreeSet::new()
    }
}

/// Drain repeatedly until `predicate` matches an event or the deadline
/// passes. Filesystem notification latency varies by platform.
fn wait_for_event(
    manager: &mut DependencyManager<NullExtractor>,
    predicate: impl Fn(&AssetFileChangedEvent) -> bool,
) -> Vec<AssetFileChangedEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = Vec::new();
    loop {
        seen.extend(manager.find_asset_file_changed_events());
        if seen.iter().any(&predicate) || Instant::now() > deadline {
            return seen;
        }
        thread::sleep(Duration::from_millis(100));
    }
}

#[test]
fn external_change_queues_event_with_asset_annotation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    let file = root.join("ship.xkm");
    fs::write(&file, b"v1").expect("write");

    let mut collection = AssetCollection::new(CollectionId(1), "game").with_root(&root);
    collection.insert(AssetHandle::new(
        AssetId(1),
        Location::new(file.to_string_lossy()),
        (),
    ));

    let mut manager = DependencyManager::new(NullExtractor);
    manager.track(&collection).expect("track");
    manager.set_tracking_enabled(true).expect("enable tracking");
    assert!(manager.is_tracking_enabled());

    // Give the observer a moment to attach before touching the file.
    thread::sleep(Duration::from_millis(300));
    fs::write(&file, b"v2").expect("rewrite");

    let events = wait_for_event(&mut manager, |e| e.asset_id == Some(AssetId(1)));
    assert!(
        events.iter().any(|e| e.asset_id == Some(AssetId(1))),
        "expected an annotated event for the tracked asset, got: {events:?}"
    );

    // The graph itself is untouched until the caller reacts.
    assert!(manager.is_tracked(AssetId(1)));
    assert_eq!(manager.asset_count(), 1);
}

#[test]
fn events_for_unknown_files_carry_no_annotation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");

    let collection: AssetCollection<()> =
        AssetCollection::new(CollectionId(1), "game").with_root(&root);

    let mut manager = DependencyManager::new(NullExtractor);
    manager.track(&collection).expect("track");
    manager.set_tracking_enabled(true).expect("enable tracking");

    thread::sleep(Duration::from_millis(300));
    fs::write(root.join("stray.xkm"), b"data").expect("write");

    let events = wait_for_event(&mut manager, |e| e.location.as_str().ends_with("stray.xkm"));
    let stray = events
        .iter()
        .find(|e| e.location.as_str().ends_with("stray.xkm"))
        .expect("event for the new file");
    assert_eq!(stray.asset_id, None);
}

#[test]
fn disabled_tracking_yields_no_events() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");

    let collection: AssetCollection<()> =
        AssetCollection::new(CollectionId(1), "game").with_root(&root);

    let mut manager = DependencyManager::new(NullExtractor);
    manager.track(&collection).expect("track");
    assert!(!manager.is_tracking_enabled());

    fs::write(root.join("ignored.xkm"), b"data").expect("write");
    thread::sleep(Duration::from_millis(300));
    assert!(manager.find_asset_file_changed_events().is_empty());

    // Disabling after enabling discards the observers and queued events.
    manager.set_tracking_enabled(true).expect("enable");
    manager.set_tracking_enabled(false).expect("disable");
    assert!(!manager.is_tracking_enabled());
    assert!(manager.find_asset_file_changed_events().is_empty());
}
