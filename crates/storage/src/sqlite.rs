use rusqlite::{Connection, OptionalExtension};

use slidedeck_core::{
    document::{Document, Slide},
    ids::*,
};

use crate::error::StorageError;
use crate::traits::{AssetRecord, AssetStore, PresentationStore, SaveOutcome};

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::Serialization(format!("invalid {label} length")))
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn stored_checksum(&self, owner_id: OwnerId) -> Result<Option<[u8; 32]>, StorageError> {
        let checksum: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT checksum FROM presentations WHERE owner_id = ?1",
                rusqlite::params![owner_id.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;
        checksum.map(|c| to_array::<32>(c, "checksum")).transpose()
    }
}

impl PresentationStore for SqliteStorage {
    fn save_presentation(
        &mut self,
        owner_id: OwnerId,
        document: &Document,
    ) -> Result<SaveOutcome, StorageError> {
        document.validate()?;
        let checksum = document.checksum()?;
        if self.stored_checksum(owner_id)? == Some(checksum) {
            return Ok(SaveOutcome::Unchanged);
        }

        let slides = rmp_serde::to_vec(&document.slides)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO presentations (owner_id, title, slides, checksum) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (owner_id) DO UPDATE SET
                title = excluded.title,
                slides = excluded.slides,
                checksum = excluded.checksum,
                updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER)",
            rusqlite::params![
                owner_id.as_bytes().as_slice(),
                document.title,
                slides,
                checksum.as_slice(),
            ],
        )?;
        Ok(SaveOutcome::Saved)
    }

    fn load_presentation(&self, owner_id: OwnerId) -> Result<Option<Document>, StorageError> {
        let row: Option<(String, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT title, slides FROM presentations WHERE owner_id = ?1",
                rusqlite::params![owner_id.as_bytes().as_slice()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((title, slides_bytes)) = row else {
            return Ok(None);
        };
        let slides: Vec<Slide> = rmp_serde::from_slice(&slides_bytes)
            .map_err(|e| StorageError::InvalidPresentation(e.to_string()))?;
        let document = Document::new(title, slides);
        document
            .validate()
            .map_err(|e| StorageError::InvalidPresentation(e.to_string()))?;
        Ok(Some(document))
    }
}

impl AssetStore for SqliteStorage {
    fn put_asset(
        &mut self,
        owner_id: OwnerId,
        bytes: &[u8],
        mime: &str,
    ) -> Result<AssetId, StorageError> {
        let asset_id = AssetId::new();
        let checksum = blake3::hash(bytes);
        self.conn.execute(
            "INSERT INTO assets (asset_id, owner_id, mime, bytes, checksum) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                asset_id.as_bytes().as_slice(),
                owner_id.as_bytes().as_slice(),
                mime,
                bytes,
                checksum.as_bytes().as_slice(),
            ],
        )?;
        Ok(asset_id)
    }

    fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetRecord>, StorageError> {
        let row: Option<(Vec<u8>, String, Vec<u8>, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT owner_id, mime, bytes, checksum FROM assets WHERE asset_id = ?1",
                rusqlite::params![asset_id.as_bytes().as_slice()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((owner_bytes, mime, bytes, checksum)) = row else {
            return Ok(None);
        };
        Ok(Some(AssetRecord {
            asset_id,
            owner_id: OwnerId::from_bytes(to_array::<16>(owner_bytes, "owner_id")?),
            mime,
            bytes,
            checksum: to_array::<32>(checksum, "checksum")?,
        }))
    }

    fn delete_asset(&mut self, asset_id: AssetId) -> Result<(), StorageError> {
        let deleted = self.conn.execute(
            "DELETE FROM assets WHERE asset_id = ?1",
            rusqlite::params![asset_id.as_bytes().as_slice()],
        )?;
        if deleted == 0 {
            return Err(StorageError::NotFound(format!("asset {asset_id}")));
        }
        Ok(())
    }

    fn asset_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidedeck_core::document::{Element, Size};

    fn sample_document() -> Document {
        let mut slide = Slide::new();
        slide.elements.push(Element::text());
        slide
            .elements
            .push(Element::image(AssetId::new(), "blob:photo", Size::new(640.0, 480.0)));
        Document::new("Roadmap", vec![slide, Slide::new()])
    }

    #[test]
    fn save_then_load() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let owner = OwnerId::new();
        let doc = sample_document();

        assert_eq!(storage.save_presentation(owner, &doc).unwrap(), SaveOutcome::Saved);
        let loaded = storage.load_presentation(owner).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn identical_save_is_skipped() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let owner = OwnerId::new();
        let mut doc = sample_document();

        storage.save_presentation(owner, &doc).unwrap();
        assert_eq!(
            storage.save_presentation(owner, &doc).unwrap(),
            SaveOutcome::Unchanged
        );

        doc.title = "Roadmap v2".into();
        assert_eq!(storage.save_presentation(owner, &doc).unwrap(), SaveOutcome::Saved);
        assert_eq!(
            storage.load_presentation(owner).unwrap().unwrap().title,
            "Roadmap v2"
        );
    }

    #[test]
    fn missing_presentation_is_none() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.load_presentation(OwnerId::new()).unwrap().is_none());
    }

    #[test]
    fn invalid_document_is_not_saved() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let doc = Document::new("", vec![Slide::new()]);
        let result = storage.save_presentation(OwnerId::new(), &doc);
        assert!(matches!(result, Err(StorageError::Core(_))));
    }

    #[test]
    fn corrupt_row_is_rejected_on_load() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let owner = OwnerId::new();
        storage
            .conn()
            .execute(
                "INSERT INTO presentations (owner_id, title, slides, checksum) VALUES (?1, 'x', ?2, ?3)",
                rusqlite::params![
                    owner.as_bytes().as_slice(),
                    vec![0xC1u8, 0xFF],
                    [0u8; 32].as_slice(),
                ],
            )
            .unwrap();
        let result = storage.load_presentation(owner);
        assert!(matches!(result, Err(StorageError::InvalidPresentation(_))));
    }

    #[test]
    fn asset_lifecycle() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let owner = OwnerId::new();
        let asset = storage.put_asset(owner, b"\x89PNG....", "image/png").unwrap();
        assert_eq!(storage.asset_count().unwrap(), 1);

        let record = storage.get_asset(asset).unwrap().unwrap();
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.mime, "image/png");
        assert_eq!(record.checksum, *blake3::hash(b"\x89PNG....").as_bytes());

        storage.delete_asset(asset).unwrap();
        assert!(storage.get_asset(asset).unwrap().is_none());
        assert!(matches!(
            storage.delete_asset(asset),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.db");
        let path = path.to_str().unwrap();
        let owner = OwnerId::new();
        let doc = sample_document();

        {
            let mut storage = SqliteStorage::open(path).unwrap();
            storage.save_presentation(owner, &doc).unwrap();
        }
        let storage = SqliteStorage::open(path).unwrap();
        assert_eq!(storage.load_presentation(owner).unwrap(), Some(doc));
    }
}
