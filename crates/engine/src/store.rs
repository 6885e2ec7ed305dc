use slidedeck_core::{
    commands::{Command, PositionUpdate},
    document::{Document, ElementKind, Selection, Slide},
    ids::*,
};

use crate::restore::ReplayScope;

/// Commands only the restoration path may issue. Not reachable through
/// [`Command`].
#[derive(Debug, Clone)]
pub(crate) enum ReplayCommand {
    ReplaceDocument { title: String, slides: Vec<Slide> },
    SetSlideSelection(Vec<SlideId>),
    SetElementSelection(Vec<ElementId>),
}

/// The authoritative document and selection cursor.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    document: Document,
    selection: Selection,
}

impl DocumentStore {
    /// Start from `document` with its first slide selected.
    pub fn new(document: Document) -> Self {
        let mut store = Self::default();
        store.reset(document);
        store
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn reset(&mut self, document: Document) {
        self.selection = match document.slides.first() {
            Some(slide) => Selection::slide(slide.id),
            None => Selection::default(),
        };
        self.document = document;
    }

    pub(crate) fn replay(&mut self, command: ReplayCommand, _scope: &ReplayScope<'_>) {
        match command {
            ReplayCommand::ReplaceDocument { title, slides } => {
                self.document.title = title;
                self.document.slides = slides;
            }
            ReplayCommand::SetSlideSelection(slide_ids) => {
                self.selection.slide_ids = slide_ids;
                self.selection.element_ids.clear();
            }
            ReplayCommand::SetElementSelection(element_ids) => {
                self.selection.element_ids = element_ids;
            }
        }
    }

    /// Apply a selection or edit command. Commands naming a slide or element
    /// that does not exist leave the document untouched.
    pub(crate) fn apply(&mut self, command: &Command) {
        match command {
            Command::Undo | Command::Redo => {}

            Command::SelectSlides(slide_ids) => {
                self.selection.slide_ids = slide_ids.clone();
                self.selection.element_ids.clear();
            }
            Command::SelectElements(element_ids) => {
                self.selection.element_ids = element_ids.clone();
            }
            Command::ClearSelection => {
                self.selection.element_ids.clear();
            }

            Command::ChangeTitle { title } => {
                self.document.title = title.clone();
            }

            Command::AddSlide { slide } => {
                if self.document.contains_slide(slide.id) {
                    return;
                }
                // After the last selected slide in document order.
                let anchor = self
                    .document
                    .slides
                    .iter()
                    .rposition(|s| self.selection.slide_ids.contains(&s.id));
                match anchor {
                    Some(index) => self.document.slides.insert(index + 1, slide.clone()),
                    None => self.document.slides.push(slide.clone()),
                }
            }

            Command::RemoveSlides { slide_ids } => {
                self.document.slides.retain(|s| !slide_ids.contains(&s.id));
                self.selection.slide_ids.retain(|id| !slide_ids.contains(id));
                if self.selection.slide_ids.is_empty() {
                    self.selection.element_ids.clear();
                    if let Some(first) = self.document.slides.first() {
                        self.selection.slide_ids.push(first.id);
                    }
                }
            }

            Command::ReorderSlides {
                slide_ids,
                target_index,
            } => {
                if slide_ids.is_empty() {
                    return;
                }
                let (moved, mut remaining): (Vec<Slide>, Vec<Slide>) =
                    std::mem::take(&mut self.document.slides)
                        .into_iter()
                        .partition(|s| slide_ids.contains(&s.id));
                let at = (*target_index).min(remaining.len());
                remaining.splice(at..at, moved);
                self.document.slides = remaining;
            }

            Command::UpdateSlideBackground {
                slide_id,
                background,
            } => {
                if let Some(slide) = self.document.slide_mut(*slide_id) {
                    slide.background = background.clone();
                }
            }

            Command::AddElement { slide_id, element } => {
                if let Some(slide) = self.document.slide_mut(*slide_id)
                    && !slide.contains_element(element.id)
                {
                    slide.elements.push(element.clone());
                }
            }

            Command::RemoveElements {
                slide_id,
                element_ids,
            } => {
                if let Some(slide) = self.document.slide_mut(*slide_id) {
                    slide.elements.retain(|e| !element_ids.contains(&e.id));
                    self.selection
                        .element_ids
                        .retain(|id| !element_ids.contains(id));
                }
            }

            Command::UpdateElementPosition {
                slide_id,
                element_id,
                position,
            } => {
                let Some(slide) = self.document.slide_mut(*slide_id) else {
                    return;
                };
                let Some(index) = slide.elements.iter().position(|e| e.id == *element_id) else {
                    return;
                };
                // A moved element is raised to the top of the stacking order.
                let mut element = slide.elements.remove(index);
                element.position = *position;
                slide.elements.push(element);
            }

            Command::UpdateElementSize {
                slide_id,
                element_id,
                size,
            } => {
                if let Some(element) = self
                    .document
                    .slide_mut(*slide_id)
                    .and_then(|s| s.element_mut(*element_id))
                {
                    element.size = *size;
                }
            }

            Command::UpdateTextContent {
                slide_id,
                element_id,
                text,
            } => {
                if let Some(element) = self
                    .document
                    .slide_mut(*slide_id)
                    .and_then(|s| s.element_mut(*element_id))
                    && let ElementKind::Text { content, .. } = &mut element.kind
                {
                    *content = text.clone();
                }
            }

            Command::UpdateElementPositions { updates } => {
                for PositionUpdate {
                    slide_id,
                    element_id,
                    position,
                } in updates
                {
                    if let Some(element) = self
                        .document
                        .slide_mut(*slide_id)
                        .and_then(|s| s.element_mut(*element_id))
                    {
                        element.position = *position;
                    }
                }
            }

            Command::UpdateTextStyle {
                slide_id,
                element_id,
                style,
            } => {
                if let Some(element) = self
                    .document
                    .slide_mut(*slide_id)
                    .and_then(|s| s.element_mut(*element_id))
                    && let ElementKind::Text { style: current, .. } = &mut element.kind
                {
                    *current = style.clone();
                }
            }
        }
    }
}
