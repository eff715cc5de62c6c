//! Atomically swappable snapshot of the loaded rule set.
//!
//! Hosts that reload rules (e.g. on a file-system change) publish a whole
//! new [`RuleRecordSet`]; readers take an `Arc` snapshot and resolve against
//! it without holding the lock, so an in-flight resolution never observes a
//! partially updated set.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use rulescope_core::{ResolutionResult, RuleError};

use crate::loader::{LoadFailure, LoadOptions, load_records};
use crate::resolver::resolve;
use crate::set::RuleRecordSet;
use crate::source::RuleSource;

#[derive(Debug)]
struct Published {
    set: Arc<RuleRecordSet>,
    generation: u64,
}

/// Holder of the current rule set snapshot.
#[derive(Debug)]
pub struct RuleCatalog {
    current: RwLock<Published>,
}

impl RuleCatalog {
    /// Create a catalog publishing `set` as generation 1.
    pub fn new(set: RuleRecordSet) -> Self {
        Self {
            current: RwLock::new(Published {
                set: Arc::new(set),
                generation: 1,
            }),
        }
    }

    /// Create a catalog holding an empty set (generation 0).
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(Published {
                set: Arc::new(RuleRecordSet::empty()),
                generation: 0,
            }),
        }
    }

    /// The current set. Stays valid after later publications.
    pub fn snapshot(&self) -> Arc<RuleRecordSet> {
        Arc::clone(&self.current.read().set)
    }

    /// Monotonic counter bumped on every publication.
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Replace the current set, returning the previous one.
    pub fn publish(&self, set: RuleRecordSet) -> Arc<RuleRecordSet> {
        let mut current = self.current.write();
        let previous = std::mem::replace(&mut current.set, Arc::new(set));
        current.generation += 1;
        info!(
            generation = current.generation,
            rules = current.set.len(),
            "rule set published"
        );
        previous
    }

    /// Load `sources` and publish the result.
    ///
    /// On failure the previous snapshot stays in place. On success the
    /// non-fatal load errors are returned.
    pub fn reload<I>(&self, sources: I, options: LoadOptions) -> Result<Vec<RuleError>, LoadFailure>
    where
        I: IntoIterator<Item = RuleSource>,
    {
        let report = load_records(sources, options)?;
        let _ = self.publish(report.set);
        Ok(report.errors)
    }

    /// Resolve `path` against the current snapshot.
    pub fn resolve(&self, path: &str) -> Result<ResolutionResult, RuleError> {
        let snapshot = self.snapshot();
        resolve(path, &snapshot)
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
