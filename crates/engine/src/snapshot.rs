use slidedeck_core::{
    document::{Document, Selection, Slide},
    ids::AssetId,
};

use crate::store::DocumentStore;

/// An owned copy of `{slides, title, selection}` at one instant.
///
/// Slides are cloned element by element, so later edits to the live document
/// can never reach a captured snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    slides: Vec<Slide>,
    title: String,
    selection: Selection,
}

impl Snapshot {
    pub fn capture(store: &DocumentStore) -> Self {
        let document = store.document();
        Self {
            slides: document.slides.clone(),
            title: document.title.clone(),
            selection: store.selection().clone(),
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether `document` has the same title and slide collection.
    pub fn matches(&self, document: &Document) -> bool {
        self.title == document.title && self.slides == document.slides
    }

    pub fn asset_refs(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.slides.iter().flat_map(Slide::asset_refs)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Slide>, Selection) {
        (self.title, self.slides, self.selection)
    }
}
