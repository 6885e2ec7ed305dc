use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{AssetId, ElementId, SlideId};

pub const DEFAULT_TITLE: &str = "Untitled presentation";

/// Slide canvas dimensions. Image elements are scaled down to fit.
pub const SLIDE_WIDTH: f64 = 960.0;
pub const SLIDE_HEIGHT: f64 = 477.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Finite and non-negative in both dimensions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn white() -> Self {
        Self::new("#ffffff")
    }

    pub fn black() -> Self {
        Self::new("#000000")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub font_style: String,
    pub color: Color,
}

impl FontStyle {
    /// Font size is finite and at least 1.
    pub fn has_valid_size(&self) -> bool {
        self.font_size.is_finite() && self.font_size >= 1.0
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 18.0,
            font_weight: "normal".into(),
            font_style: "normal".into(),
            color: Color::black(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Background {
    Color(Color),
    Picture { asset: AssetId, src: String },
    Gradient { colors: Vec<Color> },
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(Color::white())
    }
}

impl Background {
    pub fn asset(&self) -> Option<AssetId> {
        match self {
            Self::Picture { asset, .. } => Some(*asset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Text { content: String, style: FontStyle },
    Image { asset: AssetId, src: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub position: Position,
    pub size: Size,
    pub kind: ElementKind,
}

impl Element {
    /// An empty text box at the slide origin.
    pub fn text() -> Self {
        Self {
            id: ElementId::new(),
            position: Position::default(),
            size: Size::new(200.0, 40.0),
            kind: ElementKind::Text {
                content: String::new(),
                style: FontStyle::default(),
            },
        }
    }

    /// An image element for an uploaded asset. `natural` is the pixel size of
    /// the source image; it is scaled down, preserving aspect, to fit the slide.
    pub fn image(asset: AssetId, src: impl Into<String>, natural: Size) -> Self {
        let mut width = natural.width;
        let mut height = natural.height;
        if width > SLIDE_WIDTH || height > SLIDE_HEIGHT {
            let scale = (SLIDE_WIDTH / width).min(SLIDE_HEIGHT / height);
            width = (width * scale).round();
            height = (height * scale).round();
        }
        Self {
            id: ElementId::new(),
            position: Position::default(),
            size: Size::new(width.min(SLIDE_WIDTH), height.min(SLIDE_HEIGHT)),
            kind: ElementKind::Image {
                asset,
                src: src.into(),
            },
        }
    }

    pub fn asset(&self) -> Option<AssetId> {
        match &self.kind {
            ElementKind::Image { asset, .. } => Some(*asset),
            ElementKind::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub elements: Vec<Element>,
    pub background: Background,
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

impl Slide {
    pub fn new() -> Self {
        Self {
            id: SlideId::new(),
            elements: Vec::new(),
            background: Background::default(),
        }
    }

    pub fn element(&self, element_id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == element_id)
    }

    pub fn element_mut(&mut self, element_id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == element_id)
    }

    pub fn contains_element(&self, element_id: ElementId) -> bool {
        self.element(element_id).is_some()
    }

    /// Assets referenced by this slide's background and image elements.
    pub fn asset_refs(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.background
            .asset()
            .into_iter()
            .chain(self.elements.iter().filter_map(Element::asset))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub slides: Vec<Slide>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            slides: Vec::new(),
        }
    }
}

impl Document {
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            title: title.into(),
            slides,
        }
    }

    pub fn slide(&self, slide_id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == slide_id)
    }

    pub fn slide_mut(&mut self, slide_id: SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.id == slide_id)
    }

    pub fn contains_slide(&self, slide_id: SlideId) -> bool {
        self.slide(slide_id).is_some()
    }

    pub fn slide_ids(&self) -> impl Iterator<Item = SlideId> + '_ {
        self.slides.iter().map(|s| s.id)
    }

    /// Every asset reference in the document, with repetition.
    pub fn asset_refs(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.slides.iter().flat_map(Slide::asset_refs)
    }

    /// Check the document against the persisted presentation schema.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.is_empty() {
            return Err(CoreError::invalid("/title", "must not be empty"));
        }

        let mut slide_ids = HashSet::new();
        for (i, slide) in self.slides.iter().enumerate() {
            if !slide_ids.insert(slide.id) {
                return Err(CoreError::invalid(
                    format!("/slides/{i}/id"),
                    format!("duplicate slide id {}", slide.id),
                ));
            }

            let mut element_ids = HashSet::new();
            for (j, element) in slide.elements.iter().enumerate() {
                let path = format!("/slides/{i}/elements/{j}");
                if !element_ids.insert(element.id) {
                    return Err(CoreError::invalid(
                        format!("{path}/id"),
                        format!("duplicate element id {}", element.id),
                    ));
                }
                if !element.position.is_valid() {
                    return Err(CoreError::invalid(
                        format!("{path}/position"),
                        "x and y must be finite",
                    ));
                }
                if !element.size.is_valid() {
                    return Err(CoreError::invalid(
                        format!("{path}/size"),
                        "width and height must be finite and >= 0",
                    ));
                }
                if let ElementKind::Text { style, .. } = &element.kind
                    && !style.has_valid_size()
                {
                    return Err(CoreError::invalid(
                        format!("{path}/style/font_size"),
                        "must be >= 1",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Content hash over the msgpack encoding.
    pub fn checksum(&self) -> Result<[u8; 32], CoreError> {
        let bytes = self.to_msgpack()?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub slide_ids: Vec<SlideId>,
    pub element_ids: Vec<ElementId>,
}

impl Selection {
    pub fn new(slide_ids: Vec<SlideId>, element_ids: Vec<ElementId>) -> Self {
        Self {
            slide_ids,
            element_ids,
        }
    }

    pub fn slide(slide_id: SlideId) -> Self {
        Self::new(vec![slide_id], Vec::new())
    }

    /// The focused slide when several are selected.
    pub fn primary_slide(&self) -> Option<SlideId> {
        self.slide_ids.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slide_ids.is_empty() && self.element_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_with_font(size: f64) -> Element {
        let mut element = Element::text();
        if let ElementKind::Text { style, .. } = &mut element.kind {
            style.font_size = size;
        }
        element
    }

    #[test]
    fn image_scaled_to_fit_slide() {
        let element = Element::image(AssetId::new(), "blob:a", Size::new(1920.0, 954.0));
        assert_eq!(element.size, Size::new(960.0, 477.0));

        let small = Element::image(AssetId::new(), "blob:b", Size::new(100.0, 50.0));
        assert_eq!(small.size, Size::new(100.0, 50.0));

        let tall = Element::image(AssetId::new(), "blob:c", Size::new(477.0, 954.0));
        assert_eq!(tall.size, Size::new(239.0, 477.0));
    }

    #[test]
    fn asset_refs_cover_backgrounds_and_images() {
        let asset_a = AssetId::new();
        let asset_b = AssetId::new();
        let mut slide = Slide::new();
        slide.background = Background::Picture {
            asset: asset_a,
            src: "blob:bg".into(),
        };
        slide
            .elements
            .push(Element::image(asset_b, "blob:img", Size::new(10.0, 10.0)));
        slide.elements.push(Element::text());

        let doc = Document::new("Deck", vec![slide, Slide::new()]);
        let refs: Vec<AssetId> = doc.asset_refs().collect();
        assert_eq!(refs, vec![asset_a, asset_b]);
    }

    #[test]
    fn validate_rejects_empty_title() {
        let doc = Document::new("", vec![Slide::new()]);
        match doc.validate() {
            Err(CoreError::InvalidData { path, .. }) => assert_eq!(path, "/title"),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        let mut slide = Slide::new();
        let mut element = Element::text();
        element.size = Size::new(-1.0, 10.0);
        slide.elements.push(element);
        let doc = Document::new("Deck", vec![slide]);
        match doc.validate() {
            Err(CoreError::InvalidData { path, .. }) => assert_eq!(path, "/slides/0/elements/0/size"),
            other => panic!("expected InvalidData, got {other:?}"),
        }

        let mut slide = Slide::new();
        slide.elements.push(text_with_font(0.5));
        let doc = Document::new("Deck", vec![slide]);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_geometry() {
        let mut slide = Slide::new();
        let mut element = Element::text();
        element.position = Position::new(f64::NAN, 0.0);
        slide.elements.push(element);
        let doc = Document::new("Deck", vec![slide]);
        match doc.validate() {
            Err(CoreError::InvalidData { path, .. }) => {
                assert_eq!(path, "/slides/0/elements/0/position")
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }

        let mut slide = Slide::new();
        let mut element = Element::text();
        element.size = Size::new(f64::INFINITY, 10.0);
        slide.elements.push(element);
        assert!(Document::new("Deck", vec![slide]).validate().is_err());

        let mut slide = Slide::new();
        slide.elements.push(text_with_font(f64::NAN));
        assert!(Document::new("Deck", vec![slide]).validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_slides() {
        let slide = Slide::new();
        let doc = Document::new("Deck", vec![slide.clone(), slide]);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn msgpack_preserves_document() {
        let mut slide = Slide::new();
        slide.elements.push(text_with_font(24.0));
        slide.background = Background::Gradient {
            colors: vec![Color::white(), Color::black()],
        };
        let doc = Document::new("Quarterly review", vec![slide]);

        let bytes = doc.to_msgpack().unwrap();
        let decoded = Document::from_msgpack(&bytes).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.checksum().unwrap(), doc.checksum().unwrap());
    }

    #[test]
    fn checksum_tracks_content() {
        let doc = Document::new("A", vec![Slide::new()]);
        let mut renamed = doc.clone();
        renamed.title = "B".into();
        assert_ne!(doc.checksum().unwrap(), renamed.checksum().unwrap());
    }
}
