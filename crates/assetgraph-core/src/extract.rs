//! # Reference Extraction
//!
//! The `ReferenceExtractor` trait is the seam between the graph engine and
//! the asset model: the engine has zero knowledge of how an asset's object
//! graph is represented or introspected. The collaborator implements the
//! extractor with its own reflection or visitor mechanism behind this
//! interface.

use crate::Reference;
use std::collections::BTreeSet;

/// Capability that produces the full outgoing reference set of an asset's
/// in-memory content.
///
/// Implementations must be pure functions of the content (no side effects on
/// the manager), must terminate on self-referential in-memory structures via
/// their own visited-object tracking, and must return exactly one edge per
/// logical target even when the content holds multiple typed pointers to the
/// same target id. Edge order carries no meaning; the manager treats the
/// result as a set.
///
/// # Extension Point
///
/// This trait is intentionally defined without in-crate implementations.
/// Extractors must be `Send + Sync` so a manager wrapped in a lock can be
/// shared across threads.
pub trait ReferenceExtractor: Send + Sync {
    /// The in-memory content representation this extractor understands.
    type Content;

    /// Produce the outgoing reference set of `content`.
    fn extract(&self, content: &Self::Content) -> BTreeSet<Reference>;
}
