pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod observer;
pub mod reaper;
pub mod restore;
pub mod snapshot;
pub mod store;

pub use config::{EngineConfig, ReapPolicy};
pub use context::ActionContext;
pub use error::EngineError;
pub use history::{HistoryEntry, HistoryFlags, HistoryStore};
pub use observer::{HistoryObserver, NoopObserver};
pub use restore::ResolvedFocus;
pub use snapshot::Snapshot;
pub use store::DocumentStore;

use std::collections::{HashMap, HashSet, VecDeque};

use slidedeck_core::{
    commands::{Command, CommandClass, CommandKind},
    document::{Document, Element, Selection, Size, Slide},
    ids::*,
};
use slidedeck_storage::{AssetStore, PresentationStore, SaveOutcome};

use crate::reaper::Reaper;
use crate::restore::ReplayGuard;

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// An edit changed the document and was pushed onto the undo stack.
    Recorded(CommandKind),
    /// An edit left slides and title as they were; nothing was recorded.
    Unchanged,
    /// Selection change, or a command arriving during a replay.
    PassedThrough,
    Travelled(TravelResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TravelResult {
    Applied(ResolvedFocus),
    /// Nothing to undo or redo.
    Empty,
}

/// Wraps the document store and records every edit that changes it.
pub struct Engine<A: AssetStore> {
    config: EngineConfig,
    store: DocumentStore,
    history: HistoryStore,
    replay: ReplayGuard,
    reaper: Reaper,
    assets: A,
    observer: Box<dyn HistoryObserver>,
    last_focus: Option<ResolvedFocus>,
    /// Asset refs of each presentation this engine last saved or loaded.
    saved: HashMap<OwnerId, HashSet<AssetId>>,
}

impl<A: AssetStore> Engine<A> {
    pub fn new(document: Document, assets: A) -> Self {
        Self::with_config(EngineConfig::default(), document, assets)
    }

    pub fn with_config(config: EngineConfig, document: Document, assets: A) -> Self {
        Self {
            store: DocumentStore::new(document),
            history: HistoryStore::new(config.max_history),
            replay: ReplayGuard::default(),
            reaper: Reaper::new(config.reap_policy),
            assets,
            observer: Box::new(NoopObserver),
            last_focus: None,
            saved: HashMap::new(),
            config,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn HistoryObserver>) {
        self.observer = observer;
        self.observer.history_changed(self.history.flags());
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    pub fn flags(&self) -> HistoryFlags {
        self.history.flags()
    }

    pub fn can_undo(&self) -> bool {
        self.history.flags().can_undo
    }

    pub fn can_redo(&self) -> bool {
        self.history.flags().can_redo
    }

    pub fn past(&self) -> &VecDeque<HistoryEntry> {
        self.history.past()
    }

    pub fn future(&self) -> &VecDeque<HistoryEntry> {
        self.history.future()
    }

    /// Where the cursor landed after the most recent undo or redo.
    pub fn last_focus(&self) -> Option<&ResolvedFocus> {
        self.last_focus.as_ref()
    }

    pub fn pending_assets(&self) -> &[AssetId] {
        self.reaper.pending()
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    // ========================================================================
    // Interception
    // ========================================================================

    /// Route a command to the document store, recording it if it is an edit
    /// that changes the document.
    pub fn dispatch(&mut self, command: Command) -> Result<Dispatched, EngineError> {
        // Replay commands never go through here, so this only guards against
        // a future caller re-entering mid-restore.
        if self.replay.is_active() {
            tracing::warn!(?command, "Command arrived during snapshot replay, not recorded");
            self.store.apply(&command);
            return Ok(Dispatched::PassedThrough);
        }

        match command.class() {
            CommandClass::TimeTravel => {
                let result = match command {
                    Command::Redo => self.redo(),
                    _ => self.undo(),
                }?;
                Ok(Dispatched::Travelled(result))
            }
            CommandClass::Selection => {
                self.store.apply(&command);
                Ok(Dispatched::PassedThrough)
            }
            CommandClass::Edit(kind) => self.record(kind, command),
        }
    }

    fn record(&mut self, kind: CommandKind, command: Command) -> Result<Dispatched, EngineError> {
        command
            .validate()
            .map_err(|e| EngineError::InvalidCommand {
                kind: kind.as_str(),
                reason: e.to_string(),
            })?;

        let before = Snapshot::capture(&self.store);
        self.store.apply(&command);

        if before.matches(self.store.document()) {
            tracing::debug!(kind = kind.as_str(), "Edit left document unchanged, not recorded");
            return Ok(Dispatched::Unchanged);
        }

        let context = context::derive(&command, &self.store);

        // Assets the edit dropped from the live document.
        let live: HashSet<AssetId> = self.store.document().asset_refs().collect();
        self.reaper
            .enqueue(before.asset_refs().filter(|id| !live.contains(id)));

        let discarded = self.history.record(HistoryEntry {
            snapshot: before,
            context,
        });
        self.reaper.enqueue_discarded(&discarded);

        let flags = self.history.flags();
        tracing::debug!(
            kind = kind.as_str(),
            past = flags.past_len,
            discarded = discarded.len(),
            "Edit recorded"
        );
        self.publish_history();
        self.reap();
        Ok(Dispatched::Recorded(kind))
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Restore the state before the most recent edit.
    pub fn undo(&mut self) -> Result<TravelResult, EngineError> {
        if !self.history.flags().can_undo {
            return Ok(TravelResult::Empty);
        }
        let current = Snapshot::capture(&self.store);
        let Some(entry) = self.history.step_back(current) else {
            return Ok(TravelResult::Empty);
        };
        let focus = self.restore(entry);
        tracing::debug!(
            past = self.history.past().len(),
            future = self.history.future().len(),
            "Undo"
        );
        self.publish_history();
        self.reap();
        Ok(TravelResult::Applied(focus))
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Result<TravelResult, EngineError> {
        if !self.history.flags().can_redo {
            return Ok(TravelResult::Empty);
        }
        let current = Snapshot::capture(&self.store);
        let Some(entry) = self.history.step_forward(current) else {
            return Ok(TravelResult::Empty);
        };
        let focus = self.restore(entry);
        tracing::debug!(
            past = self.history.past().len(),
            future = self.history.future().len(),
            "Redo"
        );
        self.publish_history();
        self.reap();
        Ok(TravelResult::Applied(focus))
    }

    fn restore(&mut self, entry: HistoryEntry) -> ResolvedFocus {
        let HistoryEntry { snapshot, context } = entry;
        let scope = self.replay.enter();
        let focus = restore::apply(&mut self.store, snapshot, &context, &scope);
        self.observer.focus_changed(&focus);
        self.last_focus = Some(focus.clone());
        drop(scope);
        focus
    }

    /// Forget all history, e.g. when leaving the editor for playback.
    pub fn clear_history(&mut self) {
        let discarded = self.history.clear();
        self.reaper.enqueue_discarded(&discarded);
        tracing::debug!(discarded = discarded.len(), "History cleared");
        self.publish_history();
        self.reap();
    }

    fn publish_history(&mut self) {
        self.observer.history_changed(self.history.flags());
    }

    fn reap(&mut self) -> usize {
        let saved: HashSet<AssetId> = self.saved.values().flatten().copied().collect();
        self.reaper.drain(
            self.store.document(),
            &self.history,
            &saved,
            &mut self.assets,
        )
    }


    // ========================================================================
    // Assets and persistence
    // ========================================================================

    /// Store image bytes and build an element showing them. The element still
    /// has to be added with [`Command::AddElement`].
    pub fn upload_image(
        &mut self,
        owner_id: OwnerId,
        bytes: &[u8],
        mime: &str,
        natural: Size,
    ) -> Result<Element, EngineError> {
        let asset_id = self.assets.put_asset(owner_id, bytes, mime)?;
        Ok(Element::image(asset_id, format!("asset://{asset_id}"), natural))
    }

    /// Persist the live document. Its assets are then held for as long as the
    /// saved copy references them, even if later edits remove them.
    pub fn save<P: PresentationStore>(
        &mut self,
        presentations: &mut P,
        owner_id: OwnerId,
    ) -> Result<SaveOutcome, EngineError> {
        let outcome = presentations.save_presentation(owner_id, self.store.document())?;
        tracing::debug!(owner = %owner_id, ?outcome, "Presentation saved");
        self.saved
            .insert(owner_id, self.store.document().asset_refs().collect());
        self.reap();
        Ok(outcome)
    }

    /// Start a new editing session on the owner's stored presentation, or on
    /// a fresh one-slide document if none is stored.
    pub fn load<P: PresentationStore>(
        &mut self,
        presentations: &P,
        owner_id: OwnerId,
    ) -> Result<(), EngineError> {
        let document = match presentations.load_presentation(owner_id)? {
            Some(document) => {
                self.saved.insert(owner_id, document.asset_refs().collect());
                document
            }
            None => Document::new(slidedeck_core::DEFAULT_TITLE, vec![Slide::new()]),
        };
        tracing::debug!(owner = %owner_id, slides = document.slides.len(), "Presentation loaded");
        self.store.reset(document);
        self.last_focus = None;
        self.clear_history();
        Ok(())
    }
}
