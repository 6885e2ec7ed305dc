pub mod commands;
pub mod document;
pub mod error;
pub mod ids;

pub use commands::{Command, CommandClass, CommandKind, PositionUpdate};
pub use document::*;
pub use error::CoreError;
pub use ids::*;
