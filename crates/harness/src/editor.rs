use std::error::Error;

use slidedeck_core::{
    commands::Command,
    document::{Document, Element, Size, Slide},
    ids::*,
};
use slidedeck_engine::{Dispatched, Engine, EngineConfig, EngineError};
use slidedeck_storage::SqliteStorage;
use tempfile::TempDir;

use crate::assets::InstrumentedAssets;

/// An engine over a two-slide deck, with in-memory assets and a presentation
/// store that is either in memory or in a temporary directory.
pub struct TestEditor {
    pub owner_id: OwnerId,
    pub engine: Engine<InstrumentedAssets>,
    pub presentations: SqliteStorage,
    dir: Option<TempDir>,
    uploads: usize,
}

impl TestEditor {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            owner_id: OwnerId::new(),
            engine: Engine::with_config(config, two_slide_deck(), InstrumentedAssets::new()?),
            presentations: SqliteStorage::open_in_memory()?,
            dir: None,
            uploads: 0,
        })
    }

    /// Like [`new`](Self::new), but presentations live in a database file so
    /// [`reopen`](Self::reopen) can simulate a restart.
    pub fn on_disk() -> Result<Self, Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let presentations = SqliteStorage::open(&db_path(&dir)?)?;
        Ok(Self {
            owner_id: OwnerId::new(),
            engine: Engine::new(two_slide_deck(), InstrumentedAssets::new()?),
            presentations,
            dir: Some(dir),
            uploads: 0,
        })
    }

    /// Reopen the presentation database and load this owner's deck into a
    /// new session.
    pub fn reopen(&mut self) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = &self.dir {
            self.presentations = SqliteStorage::open(&db_path(dir)?)?;
        }
        self.engine.load(&self.presentations, self.owner_id)?;
        Ok(())
    }

    pub fn slide(&self, index: usize) -> SlideId {
        self.engine.document().slides[index].id
    }

    pub fn assets(&self) -> &InstrumentedAssets {
        self.engine.assets()
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Dispatched, EngineError> {
        self.engine.dispatch(command)
    }

    pub fn select_slide(&mut self, slide_id: SlideId) -> Result<(), EngineError> {
        self.dispatch(Command::SelectSlides(vec![slide_id]))?;
        Ok(())
    }

    pub fn add_slide(&mut self) -> Result<SlideId, EngineError> {
        let slide = Slide::new();
        let slide_id = slide.id;
        self.dispatch(Command::AddSlide { slide })?;
        Ok(slide_id)
    }

    pub fn add_text(&mut self, slide_id: SlideId) -> Result<ElementId, EngineError> {
        let element = Element::text();
        let element_id = element.id;
        self.dispatch(Command::AddElement { slide_id, element })?;
        Ok(element_id)
    }

    /// Upload a small fake PNG and place it on `slide_id`.
    pub fn add_image(&mut self, slide_id: SlideId) -> Result<(ElementId, AssetId), EngineError> {
        self.uploads += 1;
        let bytes = format!("\u{89}PNG fake image {}", self.uploads).into_bytes();
        let element =
            self.engine
                .upload_image(self.owner_id, &bytes, "image/png", Size::new(640.0, 480.0))?;
        let element_id = element.id;
        let asset_id = element.asset().ok_or_else(|| EngineError::InvalidCommand {
            kind: "add_element",
            reason: "uploaded element has no asset".into(),
        })?;
        self.dispatch(Command::AddElement { slide_id, element })?;
        Ok((element_id, asset_id))
    }

    pub fn remove_elements(
        &mut self,
        slide_id: SlideId,
        element_ids: Vec<ElementId>,
    ) -> Result<Dispatched, EngineError> {
        self.dispatch(Command::RemoveElements {
            slide_id,
            element_ids,
        })
    }

    pub fn set_title(&mut self, title: &str) -> Result<Dispatched, EngineError> {
        self.dispatch(Command::ChangeTitle {
            title: title.to_string(),
        })
    }
}

fn two_slide_deck() -> Document {
    Document::new("Deck", vec![Slide::new(), Slide::new()])
}

fn db_path(dir: &TempDir) -> Result<String, Box<dyn Error>> {
    dir.path()
        .join("presentations.db")
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| "temp path is not valid UTF-8".into())
}
