//! Deferred deletion of stored assets.
//!
//! Removing an image does not delete its bytes: the user may undo back into a
//! state that shows it, or a saved presentation may still show it. Candidate
//! ids wait in a queue until the configured [`ReapPolicy`] judges them
//! unreachable.

use std::collections::{HashMap, HashSet};

use slidedeck_core::{document::Document, ids::AssetId};
use slidedeck_storage::AssetStore;

use crate::config::ReapPolicy;
use crate::history::{HistoryEntry, HistoryStore};

/// How many places reference each asset: the live document, every snapshot in
/// `past` and `future`, and the persisted presentations in `saved`.
pub fn reference_counts(
    live: &Document,
    history: &HistoryStore,
    saved: &HashSet<AssetId>,
) -> HashMap<AssetId, usize> {
    let mut counts = HashMap::new();
    let refs = live
        .asset_refs()
        .chain(history.entries().flat_map(|e| e.snapshot.asset_refs()))
        .chain(saved.iter().copied());
    for asset_id in refs {
        *counts.entry(asset_id).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug)]
pub struct Reaper {
    policy: ReapPolicy,
    pending: Vec<AssetId>,
}

impl Reaper {
    pub fn new(policy: ReapPolicy) -> Self {
        Self {
            policy,
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[AssetId] {
        &self.pending
    }

    pub fn enqueue(&mut self, asset_ids: impl IntoIterator<Item = AssetId>) {
        for asset_id in asset_ids {
            if !self.pending.contains(&asset_id) {
                tracing::debug!(asset = %asset_id, "Asset queued for deletion");
                self.pending.push(asset_id);
            }
        }
    }

    /// Queue every asset the discarded history entries referenced.
    pub fn enqueue_discarded(&mut self, discarded: &[HistoryEntry]) {
        self.enqueue(discarded.iter().flat_map(|e| e.snapshot.asset_refs()));
    }

    /// Hand unreachable queued assets to `assets` for deletion. Ids in `saved`
    /// are never deleted under either policy. Failures are logged and the id
    /// is dropped without retry. Returns how many deletions were issued.
    pub fn drain<A: AssetStore>(
        &mut self,
        live: &Document,
        history: &HistoryStore,
        saved: &HashSet<AssetId>,
        assets: &mut A,
    ) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let doomed: Vec<AssetId> = match self.policy {
            ReapPolicy::ReferenceCount => {
                let counts = reference_counts(live, history, saved);
                let (doomed, kept): (Vec<AssetId>, Vec<AssetId>) = std::mem::take(&mut self.pending)
                    .into_iter()
                    .partition(|id| counts.get(id).copied().unwrap_or(0) == 0);
                self.pending = kept;
                doomed
            }
            ReapPolicy::LastEntryHeuristic => {
                let flags = history.flags();
                if flags.past_len != 1 || flags.future_len != 0 {
                    return 0;
                }
                let (held, doomed): (Vec<AssetId>, Vec<AssetId>) =
                    std::mem::take(&mut self.pending)
                        .into_iter()
                        .partition(|id| saved.contains(id));
                self.pending = held;
                doomed
            }
        };

        for asset_id in &doomed {
            match assets.delete_asset(*asset_id) {
                Ok(()) => tracing::info!(asset = %asset_id, "Deleted unreachable asset"),
                Err(e) => tracing::warn!(
                    asset = %asset_id,
                    error = %e,
                    "Asset deletion failed, dropping from queue"
                ),
            }
        }
        doomed.len()
    }
}
