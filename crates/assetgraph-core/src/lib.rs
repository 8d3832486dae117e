//! # assetgraph-core
//!
//! The incremental asset dependency engine - THE GRAPH.
//!
//! This crate maintains a live, queryable dependency graph over every asset
//! in a set of tracked collections: who references whom, in which direction,
//! which references are currently unresolved, and which assets inherit from
//! which base. The graph is updated incrementally as assets are added,
//! removed, and modified; it is never rebuilt from scratch in steady state.
//!
//! ## Architectural Constraints
//!
//! The engine:
//! - Holds identities and edges only; asset content stays opaque behind the
//!   injected [`ReferenceExtractor`]
//! - Treats unresolved references as a normal, queryable state, not an error
//! - Uses `BTreeMap`/`BTreeSet` throughout so every query result is
//!   deterministic
//! - Never applies external file changes automatically; watcher events queue
//!   until the caller drains them

// =============================================================================
// MODULES
// =============================================================================

pub mod collection;
pub mod dependency_set;
pub mod extract;
pub mod limits;
pub mod manager;
pub mod node;
pub mod types;

mod watcher;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AssetFileChangedEvent, AssetGraphError, AssetHandle, AssetId, CollectionId, FileChangeKind,
    Location, Reference, ReferenceKind,
};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use collection::AssetCollection;
pub use dependency_set::DependencySet;
pub use extract::ReferenceExtractor;
pub use manager::DependencyManager;
pub use node::DependencyNode;
