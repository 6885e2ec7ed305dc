use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// When queued assets are handed to the asset store for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReapPolicy {
    /// Delete an asset once neither the live document nor any history entry
    /// references it.
    #[default]
    ReferenceCount,
    /// Drain the whole queue whenever history holds exactly one undo entry and
    /// no redo entries. Does not prove the assets are unreachable.
    LastEntryHeuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of undo entries; the oldest is evicted beyond this.
    /// Values below 1 are treated as 1.
    pub max_history: usize,
    pub reap_policy: ReapPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_DEPTH,
            reap_policy: ReapPolicy::default(),
        }
    }
}
