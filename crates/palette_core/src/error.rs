//! Errors for explicit tree commands
//!
//! Lookups never fail: a stale reference simply resolves to nothing. These
//! errors only surface when a command names a node that must exist.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("Folder not found: {0}")]
    FolderNotFound(NodeId),

    #[error("Entry {entry} not found in folder {folder}")]
    EntryNotFound { folder: NodeId, entry: NodeId },

    #[error("Cannot move folder {folder} into itself or one of its descendants")]
    InvalidMove { folder: NodeId },

    #[error("Nothing to {0}")]
    HistoryEmpty(&'static str),

    #[error("Unreadable collection snapshot: {0}")]
    Snapshot(String),
}

pub type PaletteResult<T> = Result<T, PaletteError>;
