//! # Engine Limits
//!
//! Hardcoded runtime constants for the assetgraph engine.
//!
//! These are compiled into the binary and immutable at runtime; the engine
//! has no configuration surface beyond them.

/// Capacity of the bounded file-change event queue.
///
/// Watcher threads `try_send` onto the queue and drop events (with a
/// warning) when it is full, so a caller that never drains cannot make the
/// watchers block or the queue grow without bound.
pub const EVENT_QUEUE_CAPACITY: usize = 4096;

/// Maximum length for asset location strings.
///
/// Handles with longer locations are rejected at ingestion. This prevents
/// memory exhaustion from malformed input.
pub const MAX_LOCATION_LENGTH: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_capacity_is_nonzero() {
        assert!(EVENT_QUEUE_CAPACITY > 0);
    }
}
