use slidedeck_core::{document::Document, ids::*};
use slidedeck_storage::{AssetRecord, AssetStore, SqliteStorage, StorageError};

/// An in-memory asset store that remembers every deletion it was asked to
/// perform, and can be told to refuse them.
pub struct InstrumentedAssets {
    inner: SqliteStorage,
    deletes: Vec<AssetId>,
    fail_deletes: bool,
}

impl InstrumentedAssets {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            inner: SqliteStorage::open_in_memory()?,
            deletes: Vec::new(),
            fail_deletes: false,
        })
    }

    /// Every id passed to `delete_asset`, in call order, including failed calls.
    pub fn delete_calls(&self) -> &[AssetId] {
        &self.deletes
    }

    pub fn fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }

    pub fn contains(&self, asset_id: AssetId) -> Result<bool, StorageError> {
        Ok(self.inner.get_asset(asset_id)?.is_some())
    }

    /// Stored ids that `document` does not reference.
    pub fn orphans(&self, document: &Document) -> Result<Vec<AssetId>, StorageError> {
        let live: Vec<AssetId> = document.asset_refs().collect();
        let mut stmt = self
            .inner
            .conn()
            .prepare("SELECT asset_id FROM assets ORDER BY asset_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids
            .into_iter()
            .filter_map(|bytes| <[u8; 16]>::try_from(bytes).ok())
            .map(AssetId::from_bytes)
            .filter(|id| !live.contains(id))
            .collect())
    }
}

impl AssetStore for InstrumentedAssets {
    fn put_asset(
        &mut self,
        owner_id: OwnerId,
        bytes: &[u8],
        mime: &str,
    ) -> Result<AssetId, StorageError> {
        self.inner.put_asset(owner_id, bytes, mime)
    }

    fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetRecord>, StorageError> {
        self.inner.get_asset(asset_id)
    }

    fn delete_asset(&mut self, asset_id: AssetId) -> Result<(), StorageError> {
        self.deletes.push(asset_id);
        if self.fail_deletes {
            return Err(StorageError::NotFound(format!(
                "asset {asset_id} (injected failure)"
            )));
        }
        self.inner.delete_asset(asset_id)
    }

    fn asset_count(&self) -> Result<u64, StorageError> {
        self.inner.asset_count()
    }
}
