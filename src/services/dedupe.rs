//! Scan deduplication over raw decoded text
//!
//! The dedupe key is the raw payload verbatim, not the parsed record: set
//! membership on the raw bytes is O(1) and skips re-parsing text we have
//! already handled. Two raw strings that parse identically but differ in
//! formatting count as distinct detections.
//!
//! State is scoped to one run: grows monotonically, never pruned, never
//! persisted.

use std::collections::HashSet;

/// Set of raw payloads already accepted in this process run
#[derive(Debug, Default)]
pub struct DedupeSet {
    seen: HashSet<String>,
}

impl DedupeSet {
    pub fn new() -> Self {
        Self { seen: HashSet::new() }
    }

    /// Has this raw payload been recorded before?
    pub fn contains(&self, raw: &str) -> bool {
        self.seen.contains(raw)
    }

    /// Record a raw payload; recording an already-present value is a no-op
    pub fn record(&mut self, raw: &str) {
        if !self.seen.contains(raw) {
            self.seen.insert(raw.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
