//! Re-applies a history snapshot and puts the selection cursor somewhere
//! plausible in it.

use slidedeck_core::{
    document::{Document, Selection},
    ids::*,
};

use crate::context::ActionContext;
use crate::snapshot::Snapshot;
use crate::store::{DocumentStore, ReplayCommand};

/// Tracks whether a snapshot replay is in flight.
#[derive(Debug, Default)]
pub(crate) struct ReplayGuard {
    active: bool,
}

impl ReplayGuard {
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Mark a replay as in flight until the returned scope is dropped.
    pub(crate) fn enter(&mut self) -> ReplayScope<'_> {
        debug_assert!(!self.active, "nested snapshot replay");
        self.active = true;
        ReplayScope {
            active: &mut self.active,
        }
    }
}

/// Proof that a replay is in flight. Required to issue [`ReplayCommand`]s;
/// clears the guard when dropped, on every exit path.
pub(crate) struct ReplayScope<'a> {
    active: &'a mut bool,
}

impl Drop for ReplayScope<'_> {
    fn drop(&mut self) {
        *self.active = false;
    }
}

/// Where the cursor landed after time travel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedFocus {
    pub slide_ids: Vec<SlideId>,
    pub element_ids: Vec<ElementId>,
}

/// Resolve the cursor for a just-restored `document`.
///
/// Slides: the context's slides that still exist, else the snapshot's own
/// selection that still exists, else the first slide, else nothing.
/// Elements are only kept when exactly one slide was resolved, and only those
/// present on it.
pub fn resolve_focus(
    document: &Document,
    recorded: &Selection,
    context: &ActionContext,
) -> ResolvedFocus {
    let existing = |ids: &[SlideId]| -> Vec<SlideId> {
        ids.iter()
            .copied()
            .filter(|id| document.contains_slide(*id))
            .collect()
    };

    let mut slide_ids = existing(&context.slide_ids);
    if slide_ids.is_empty() {
        slide_ids = existing(&recorded.slide_ids);
    }
    if slide_ids.is_empty() {
        slide_ids.extend(document.slides.first().map(|s| s.id));
    }

    let element_ids = match (slide_ids.as_slice(), context.element_ids.is_empty()) {
        ([primary], false) => document
            .slide(*primary)
            .map(|slide| {
                context
                    .element_ids
                    .iter()
                    .copied()
                    .filter(|id| slide.contains_element(*id))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    ResolvedFocus {
        slide_ids,
        element_ids,
    }
}

/// Replace the live document with `snapshot` and move the cursor.
pub(crate) fn apply(
    store: &mut DocumentStore,
    snapshot: Snapshot,
    context: &ActionContext,
    scope: &ReplayScope<'_>,
) -> ResolvedFocus {
    let (title, slides, recorded) = snapshot.into_parts();
    store.replay(ReplayCommand::ReplaceDocument { title, slides }, scope);

    let focus = resolve_focus(store.document(), &recorded, context);
    store.replay(ReplayCommand::SetSlideSelection(focus.slide_ids.clone()), scope);
    store.replay(
        ReplayCommand::SetElementSelection(focus.element_ids.clone()),
        scope,
    );
    focus
}
