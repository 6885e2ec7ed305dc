use crate::history::HistoryFlags;
use crate::restore::ResolvedFocus;

/// Receives the engine's UI-facing state: undo/redo availability, and where
/// the cursor landed after time travel (e.g. to scroll a thumbnail into view).
pub trait HistoryObserver {
    fn history_changed(&mut self, _flags: HistoryFlags) {}

    fn focus_changed(&mut self, _focus: &ResolvedFocus) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl HistoryObserver for NoopObserver {}
