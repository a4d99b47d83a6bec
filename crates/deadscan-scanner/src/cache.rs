//! Run-scoped verification cache.
//!
//! Many controls (navigation bars, footers) are byte-identical across every
//! route. Without memoization the audit costs O(routes x elements); with
//! it, repeats are answered in O(1) and the cost collapses to O(distinct
//! action classes + routes).

use std::collections::HashMap;

use deadscan_core::{ActionOutcome, GlobalKey};

/// One verified outcome per [`GlobalKey`], scoped to a single run and
/// read-only once written.
#[derive(Debug, Default)]
pub struct VerificationCache {
    entries: HashMap<GlobalKey, ActionOutcome>,
}

impl VerificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &GlobalKey) -> Option<&ActionOutcome> {
        self.entries.get(key)
    }

    /// Store a verified outcome. Dead outcomes are never admitted (each
    /// occurrence is a finding), and neither are anonymous keys (the
    /// same-key-same-behavior invariant cannot be assumed for them).
    pub fn put(&mut self, key: GlobalKey, outcome: ActionOutcome) {
        if outcome.is_cacheable() && !key.is_anonymous() {
            self.entries.entry(key).or_insert(outcome);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
