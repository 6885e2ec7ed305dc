use slidedeck_core::{document::Document, ids::*};

use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub asset_id: AssetId,
    pub owner_id: OwnerId,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub checksum: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The stored row already had this content; nothing was written.
    Unchanged,
}

/// Per-owner persistence of the document under edit.
pub trait PresentationStore {
    fn save_presentation(
        &mut self,
        owner_id: OwnerId,
        document: &Document,
    ) -> Result<SaveOutcome, StorageError>;

    fn load_presentation(&self, owner_id: OwnerId) -> Result<Option<Document>, StorageError>;
}

/// Binary store for uploaded images and picture backgrounds.
pub trait AssetStore {
    fn put_asset(
        &mut self,
        owner_id: OwnerId,
        bytes: &[u8],
        mime: &str,
    ) -> Result<AssetId, StorageError>;

    fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetRecord>, StorageError>;

    /// Fails with `NotFound` if the asset is not stored.
    fn delete_asset(&mut self, asset_id: AssetId) -> Result<(), StorageError>;

    fn asset_count(&self) -> Result<u64, StorageError>;
}
