use serde::{Deserialize, Serialize};

use crate::document::{Background, Element, ElementKind, FontStyle, Position, Size, Slide};
use crate::error::CoreError;
use crate::ids::{ElementId, SlideId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub slide_id: SlideId,
    pub element_id: ElementId,
    pub position: Position,
}

/// Every command an editing surface can dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Undo,
    Redo,

    SelectSlides(Vec<SlideId>),
    SelectElements(Vec<ElementId>),
    ClearSelection,

    ChangeTitle {
        title: String,
    },
    AddSlide {
        slide: Slide,
    },
    RemoveSlides {
        slide_ids: Vec<SlideId>,
    },
    ReorderSlides {
        slide_ids: Vec<SlideId>,
        target_index: usize,
    },
    UpdateSlideBackground {
        slide_id: SlideId,
        background: Background,
    },
    AddElement {
        slide_id: SlideId,
        element: Element,
    },
    RemoveElements {
        slide_id: SlideId,
        element_ids: Vec<ElementId>,
    },
    UpdateElementPosition {
        slide_id: SlideId,
        element_id: ElementId,
        position: Position,
    },
    UpdateElementSize {
        slide_id: SlideId,
        element_id: ElementId,
        size: Size,
    },
    UpdateTextContent {
        slide_id: SlideId,
        element_id: ElementId,
        text: String,
    },
    UpdateElementPositions {
        updates: Vec<PositionUpdate>,
    },
    UpdateTextStyle {
        slide_id: SlideId,
        element_id: ElementId,
        style: FontStyle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// `Undo` / `Redo`: never recorded.
    TimeTravel,
    /// Pure selection changes: passed through, never recorded.
    Selection,
    /// Document edits: recorded when they change the document.
    Edit(CommandKind),
}

/// Closed set of recordable command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    ChangeTitle,
    AddSlide,
    RemoveSlides,
    ReorderSlides,
    UpdateSlideBackground,
    AddElement,
    RemoveElements,
    UpdateElementPosition,
    UpdateElementSize,
    UpdateTextContent,
    UpdateElementPositions,
    UpdateTextStyle,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChangeTitle => "change_title",
            Self::AddSlide => "add_slide",
            Self::RemoveSlides => "remove_slides",
            Self::ReorderSlides => "reorder_slides",
            Self::UpdateSlideBackground => "update_slide_background",
            Self::AddElement => "add_element",
            Self::RemoveElements => "remove_elements",
            Self::UpdateElementPosition => "update_element_position",
            Self::UpdateElementSize => "update_element_size",
            Self::UpdateTextContent => "update_text_content",
            Self::UpdateElementPositions => "update_element_positions",
            Self::UpdateTextStyle => "update_text_style",
        }
    }
}

impl Command {
    pub fn class(&self) -> CommandClass {
        match self {
            Self::Undo | Self::Redo => CommandClass::TimeTravel,
            Self::SelectSlides(_) | Self::SelectElements(_) | Self::ClearSelection => {
                CommandClass::Selection
            }
            Self::ChangeTitle { .. } => CommandClass::Edit(CommandKind::ChangeTitle),
            Self::AddSlide { .. } => CommandClass::Edit(CommandKind::AddSlide),
            Self::RemoveSlides { .. } => CommandClass::Edit(CommandKind::RemoveSlides),
            Self::ReorderSlides { .. } => CommandClass::Edit(CommandKind::ReorderSlides),
            Self::UpdateSlideBackground { .. } => {
                CommandClass::Edit(CommandKind::UpdateSlideBackground)
            }
            Self::AddElement { .. } => CommandClass::Edit(CommandKind::AddElement),
            Self::RemoveElements { .. } => CommandClass::Edit(CommandKind::RemoveElements),
            Self::UpdateElementPosition { .. } => {
                CommandClass::Edit(CommandKind::UpdateElementPosition)
            }
            Self::UpdateElementSize { .. } => CommandClass::Edit(CommandKind::UpdateElementSize),
            Self::UpdateTextContent { .. } => CommandClass::Edit(CommandKind::UpdateTextContent),
            Self::UpdateElementPositions { .. } => {
                CommandClass::Edit(CommandKind::UpdateElementPositions)
            }
            Self::UpdateTextStyle { .. } => CommandClass::Edit(CommandKind::UpdateTextStyle),
        }
    }

    pub fn kind(&self) -> Option<CommandKind> {
        match self.class() {
            CommandClass::Edit(kind) => Some(kind),
            _ => None,
        }
    }

    /// Reject payloads no document may contain. Missing targets are not
    /// checked here; they make the command a no-op.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::UpdateElementSize { size, .. } => check_size(size),
            Self::UpdateElementPosition { position, .. } => check_position(position),
            Self::UpdateElementPositions { updates } => updates
                .iter()
                .try_for_each(|update| check_position(&update.position)),
            Self::AddElement { element, .. } => check_element(element),
            Self::AddSlide { slide } => slide.elements.iter().try_for_each(check_element),
            Self::UpdateTextStyle { style, .. } => check_font(style),
            _ => Ok(()),
        }
    }
}

fn check_element(element: &Element) -> Result<(), CoreError> {
    check_position(&element.position)?;
    check_size(&element.size)?;
    match &element.kind {
        ElementKind::Text { style, .. } => check_font(style),
        ElementKind::Image { .. } => Ok(()),
    }
}

fn check_position(position: &Position) -> Result<(), CoreError> {
    if !position.is_valid() {
        return Err(CoreError::InvalidOperation(format!(
            "non-finite position {position:?}"
        )));
    }
    Ok(())
}

fn check_size(size: &Size) -> Result<(), CoreError> {
    if !size.is_valid() {
        return Err(CoreError::InvalidOperation(format!(
            "invalid element size {size:?}"
        )));
    }
    Ok(())
}

fn check_font(style: &FontStyle) -> Result<(), CoreError> {
    if !style.has_valid_size() {
        return Err(CoreError::InvalidOperation(format!(
            "font size {} below 1",
            style.font_size
        )));
    }
    Ok(())
}
