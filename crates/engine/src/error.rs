use slidedeck_core::CoreError;
use slidedeck_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("invalid {kind} command: {reason}")]
    InvalidCommand { kind: &'static str, reason: String },
}
