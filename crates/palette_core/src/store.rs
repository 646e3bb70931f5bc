//! Collection persistence
//!
//! Collections are stored as pretty-printed JSON documents mirroring the
//! folder tree. The personal collection lives in the user's app data and is
//! created in memory on first use; any other collection is a file the user
//! created or picked.

use crate::collection::Collection;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which collection is current
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSource {
    #[default]
    Personal,
    File(PathBuf),
}

impl CollectionSource {
    pub fn display_name(&self) -> String {
        match self {
            CollectionSource::Personal => crate::collection::PERSONAL_COLLECTION_NAME.to_string(),
            CollectionSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

pub trait CollectionStore {
    fn load(&self, source: &CollectionSource) -> Result<Collection>;

    fn save(&self, source: &CollectionSource, collection: &Collection) -> Result<()>;
}

/// Stores collections as JSON files on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    personal_file: PathBuf,
}

impl JsonFileStore {
    pub fn new(personal_file: PathBuf) -> Self {
        Self { personal_file }
    }

    pub fn personal_file(&self) -> &Path {
        &self.personal_file
    }

    fn path_for<'a>(&'a self, source: &'a CollectionSource) -> &'a Path {
        match source {
            CollectionSource::Personal => &self.personal_file,
            CollectionSource::File(path) => path,
        }
    }

    /// Write a new, empty collection with a default folder to `path`
    pub fn create(&self, path: &Path) -> Result<Collection> {
        if path.exists() {
            anyhow::bail!("A collection already exists at {:?}", path);
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "New Palette".to_string());
        let mut collection = Collection::new(name);
        collection.ensure_root_folder();
        write_collection(path, &collection)?;
        tracing::info!("Created collection {:?}", path);
        Ok(collection)
    }
}

fn write_collection(path: &Path, collection: &Collection) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }
    let bytes = collection
        .to_bytes()
        .context("Failed to serialize collection")?;
    fs::write(path, bytes).with_context(|| format!("Failed to write collection {:?}", path))
}

impl CollectionStore for JsonFileStore {
    fn load(&self, source: &CollectionSource) -> Result<Collection> {
        let path = self.path_for(source);
        if *source == CollectionSource::Personal && !path.exists() {
            tracing::debug!("No personal collection stored yet, starting a new one");
            return Ok(Collection::personal());
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read collection {:?}", path))?;
        Collection::from_bytes(&bytes).with_context(|| format!("Failed to parse collection {:?}", path))
    }

    fn save(&self, source: &CollectionSource, collection: &Collection) -> Result<()> {
        write_collection(self.path_for(source), collection)
    }
}
