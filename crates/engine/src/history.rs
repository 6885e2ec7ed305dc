use std::collections::VecDeque;

use crate::context::ActionContext;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: Snapshot,
    pub context: ActionContext,
}

/// Undo/redo availability, derived from the stacks on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryFlags {
    pub can_undo: bool,
    pub can_redo: bool,
    pub past_len: usize,
    pub future_len: usize,
}

/// Two stacks of history entries.
///
/// `past` runs oldest to newest; its back is the most recent edit.
/// `future` runs nearest-redo first. Recording a new edit discards `future`
/// entirely, and `past` never holds more than `max_depth` entries.
#[derive(Debug)]
pub struct HistoryStore {
    past: VecDeque<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    max_depth: usize,
}

impl HistoryStore {
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Append an entry for a committed edit. Returns the entries this
    /// discarded: the whole redo branch plus any evicted oldest entries.
    pub fn record(&mut self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        let mut discarded: Vec<HistoryEntry> = self.future.drain(..).collect();
        self.past.push_back(entry);
        while self.past.len() > self.max_depth {
            if let Some(oldest) = self.past.pop_front() {
                discarded.push(oldest);
            }
        }
        discarded
    }

    /// Pop the newest `past` entry for restoration, leaving `current` (paired
    /// with the popped entry's context) at the front of `future`.
    pub fn step_back(&mut self, current: Snapshot) -> Option<HistoryEntry> {
        let entry = self.past.pop_back()?;
        self.future.push_front(HistoryEntry {
            snapshot: current,
            context: entry.context.clone(),
        });
        Some(entry)
    }

    /// Inverse of [`step_back`](Self::step_back).
    pub fn step_forward(&mut self, current: Snapshot) -> Option<HistoryEntry> {
        let entry = self.future.pop_front()?;
        self.past.push_back(HistoryEntry {
            snapshot: current,
            context: entry.context.clone(),
        });
        Some(entry)
    }

    /// Empty both stacks, returning everything that was in them.
    pub fn clear(&mut self) -> Vec<HistoryEntry> {
        self.past.drain(..).chain(self.future.drain(..)).collect()
    }

    pub fn past(&self) -> &VecDeque<HistoryEntry> {
        &self.past
    }

    pub fn future(&self) -> &VecDeque<HistoryEntry> {
        &self.future
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter().chain(self.future.iter())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn flags(&self) -> HistoryFlags {
        HistoryFlags {
            can_undo: !self.past.is_empty(),
            can_redo: !self.future.is_empty(),
            past_len: self.past.len(),
            future_len: self.future.len(),
        }
    }
}
