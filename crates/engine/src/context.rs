//! Derives what an edit was about, so time travel can put the cursor back
//! on it.
//!
//! Each recordable [`CommandKind`] maps to a pure extractor in [`REGISTRY`].
//! Kinds without an entry, or extractors that cannot read their payload, fall
//! back to the current selection.

use slidedeck_core::{
    commands::{Command, CommandKind},
    ids::*,
};

use crate::store::DocumentStore;

/// The slides and elements a history entry should restore focus to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionContext {
    pub slide_ids: Vec<SlideId>,
    pub element_ids: Vec<ElementId>,
}

impl ActionContext {
    pub fn slides(slide_ids: Vec<SlideId>) -> Self {
        Self {
            slide_ids,
            element_ids: Vec::new(),
        }
    }

    pub fn elements(slide_id: SlideId, element_ids: Vec<ElementId>) -> Self {
        Self {
            slide_ids: vec![slide_id],
            element_ids,
        }
    }
}

type Extractor = fn(&Command, &DocumentStore) -> Option<ActionContext>;

const REGISTRY: &[(CommandKind, Extractor)] = &[
    (CommandKind::AddSlide, add_slide),
    (CommandKind::RemoveSlides, remove_slides),
    (CommandKind::AddElement, add_element),
    (CommandKind::RemoveElements, remove_elements),
    (CommandKind::UpdateElementPosition, single_element),
    (CommandKind::UpdateElementSize, single_element),
    (CommandKind::UpdateTextContent, single_element),
    (CommandKind::UpdateElementPositions, batch_positions),
    (CommandKind::UpdateSlideBackground, slide_background),
    (CommandKind::ChangeTitle, primary_slide),
    (CommandKind::ReorderSlides, reorder_slides),
];

/// Derive the context of `command` from the state it produced.
pub fn derive(command: &Command, post: &DocumentStore) -> ActionContext {
    command
        .kind()
        .and_then(|kind| REGISTRY.iter().find(|(k, _)| *k == kind))
        .and_then(|(_, extract)| extract(command, post))
        .unwrap_or_else(|| fallback(post))
}

pub fn is_registered(kind: CommandKind) -> bool {
    REGISTRY.iter().any(|(k, _)| *k == kind)
}

fn fallback(post: &DocumentStore) -> ActionContext {
    let selection = post.selection();
    ActionContext {
        slide_ids: selection.primary_slide().into_iter().collect(),
        element_ids: selection.element_ids.clone(),
    }
}

fn add_slide(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::AddSlide { slide } => Some(ActionContext::slides(vec![slide.id])),
        _ => None,
    }
}

fn remove_slides(command: &Command, post: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::RemoveSlides { .. } => Some(ActionContext::slides(
            post.document().slide_ids().take(1).collect(),
        )),
        _ => None,
    }
}

fn add_element(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::AddElement { slide_id, element } => {
            Some(ActionContext::elements(*slide_id, vec![element.id]))
        }
        _ => None,
    }
}

fn remove_elements(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::RemoveElements { slide_id, .. } => Some(ActionContext::slides(vec![*slide_id])),
        _ => None,
    }
}

fn single_element(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::UpdateElementPosition {
            slide_id,
            element_id,
            ..
        }
        | Command::UpdateElementSize {
            slide_id,
            element_id,
            ..
        }
        | Command::UpdateTextContent {
            slide_id,
            element_id,
            ..
        } => Some(ActionContext::elements(*slide_id, vec![*element_id])),
        _ => None,
    }
}

fn batch_positions(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::UpdateElementPositions { updates } => {
            let first = updates.first()?;
            Some(ActionContext::elements(
                first.slide_id,
                updates.iter().map(|u| u.element_id).collect(),
            ))
        }
        _ => None,
    }
}

fn slide_background(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::UpdateSlideBackground { slide_id, .. } => {
            Some(ActionContext::slides(vec![*slide_id]))
        }
        _ => None,
    }
}

fn primary_slide(_: &Command, post: &DocumentStore) -> Option<ActionContext> {
    Some(ActionContext::slides(
        post.selection().primary_slide().into_iter().collect(),
    ))
}

fn reorder_slides(command: &Command, _: &DocumentStore) -> Option<ActionContext> {
    match command {
        Command::ReorderSlides { slide_ids, .. } => Some(ActionContext::slides(slide_ids.clone())),
        _ => None,
    }
}
