use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("stored presentation is corrupt or outdated: {0}")]
    InvalidPresentation(String),

    #[error("core error: {0}")]
    Core(#[from] slidedeck_core::CoreError),
}
