//! Asset Palette Core
//!
//! Data model and editing logic for the Asset Palette: a user-curated
//! collection of shortcuts to project content, organized in nested folders.
//! - Folder/entry tree with stable identity tokens
//! - Reference paths that survive reordering, undo and reload
//! - Active folder, entry selection and the global sort mode
//! - Drop ingestion with container expansion and user decisions
//! - JSON persistence, TOML settings and undo history

pub mod collection;
pub mod content;
pub mod entry;
pub mod error;
pub mod folder;
pub mod history;
pub mod id;
pub mod ingest;
pub mod reference_path;
pub mod selection;
pub mod session;
pub mod settings;
pub mod sort;
pub mod store;

pub use collection::{Collection, DEFAULT_FOLDER_NAME, PERSONAL_COLLECTION_NAME};
pub use content::{ContentClass, ContentResolver, InMemoryContent};
pub use entry::{Entry, EntryKind, EntryVariant};
pub use error::{PaletteError, PaletteResult};
pub use folder::Folder;
pub use history::History;
pub use id::{ContentRef, NodeId, SCENE_SCHEME};
pub use ingest::{IngestPipeline, IngestState, StepOutcome};
pub use reference_path::{NodeRef, PathParseError, PathTarget, ReferencePath};
pub use selection::SelectionEngine;
pub use session::PaletteSession;
pub use settings::{AppPaths, PaletteSettings};
pub use sort::{SortMode, UnknownSortMode};
pub use store::{CollectionSource, CollectionStore, JsonFileStore};
