use crate::api::NodePatch;
use ahash::{AHashMap, AHashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// How long a caller should let edits settle before draining the coalescer.
pub const DEBOUNCE_MS: u64 = 500;

/// Coalesces rapid-fire node edits into at most one pending save per node.
///
/// The transport and the timer live with the caller; the coalescer only owns
/// the merge-and-dedup bookkeeping:
///
/// - queued patches for the same node merge, last write wins per field;
/// - a patch identical to the last completed save for that node is dropped;
/// - while a node's save is in flight, newer edits keep accumulating and are
///   handed out as a fresh patch once the flight completes.
#[derive(Debug, Default)]
pub struct SaveCoalescer {
    pending: AHashMap<String, NodePatch>,
    in_flight: AHashSet<String>,
    last_saved: AHashMap<String, NodePatch>,
}

impl SaveCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one edit. Returns `false` when the patch matches what was last
    /// saved for that node and nothing newer is pending.
    pub fn queue(&mut self, patch: NodePatch) -> bool {
        if !self.pending.contains_key(&patch.id)
            && self.last_saved.get(&patch.id) == Some(&patch)
        {
            return false;
        }
        match self.pending.get_mut(&patch.id) {
            Some(existing) => existing.merge(patch),
            None => {
                self.pending.insert(patch.id.clone(), patch);
            }
        }
        true
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    /// Takes one patch ready to send, marking its node in flight. Nodes with
    /// a save already in flight are skipped until [`Self::complete`].
    pub fn next_ready(&mut self) -> Option<NodePatch> {
        let id = self
            .pending
            .keys()
            .find(|id| !self.in_flight.contains(*id))?
            .clone();
        let patch = self.pending.remove(&id)?;
        self.in_flight.insert(id);
        Some(patch)
    }

    /// Records a successful save, releasing the node for its next flight.
    pub fn complete(&mut self, patch: NodePatch) {
        self.in_flight.remove(&patch.id);
        self.last_saved.insert(patch.id.clone(), patch);
    }

    /// Records a failed save: the patch goes back to pending (merged under
    /// anything newer) so the next drain retries it.
    pub fn fail(&mut self, patch: NodePatch) {
        self.in_flight.remove(&patch.id);
        match self.pending.get_mut(&patch.id) {
            Some(newer) => {
                let mut merged = patch;
                merged.merge(newer.clone());
                *newer = merged;
            }
            None => {
                self.pending.insert(patch.id.clone(), patch);
            }
        }
    }
}

/// Liveness flag for one editing session.
///
/// Saves complete asynchronously; a completion that lands after the session
/// ended must not write through. Callers check [`SessionGuard::admit`] before
/// applying any late result.
#[derive(Debug)]
pub struct SessionGuard {
    alive: AtomicBool,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
        }
    }

    pub fn end(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// True when a late-arriving result may still be applied.
    pub fn admit(&self) -> bool {
        self.is_alive()
    }
}
