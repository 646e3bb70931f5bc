//! Palette collections
//!
//! A collection is the unit of persistence: an ordered list of root folders,
//! serialized as a recursive document that mirrors the in-memory tree.
//!
//! Every structural mutation stamps the collection with a fresh revision taken
//! from a process-wide counter. A collection loaded from bytes (reload, undo)
//! gets a fresh revision too, so anything cached against an older revision
//! knows it has to look again.

use crate::entry::Entry;
use crate::error::{PaletteError, PaletteResult};
use crate::folder::Folder;
use crate::id::NodeId;
use crate::sort::SortMode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the root folder synthesized for an empty collection
pub const DEFAULT_FOLDER_NAME: &str = "Default";

/// Name of the collection kept in the user's app data
pub const PERSONAL_COLLECTION_NAME: &str = "Personal Palette";

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    name: String,
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(skip, default = "next_revision")]
    revision: u64,
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.folders == other.folders
    }
}

impl Eq for Collection {}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folders: Vec::new(),
            revision: next_revision(),
        }
    }

    /// The in-memory personal collection used when nothing is stored yet
    pub fn personal() -> Self {
        let mut collection = Self::new(PERSONAL_COLLECTION_NAME);
        collection.ensure_root_folder();
        collection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    pub fn root_folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn first_root(&self) -> Option<NodeId> {
        self.folders.first().map(Folder::id)
    }

    /// Returns the first root folder, creating a `Default` one if the
    /// collection has none.
    pub fn ensure_root_folder(&mut self) -> NodeId {
        if let Some(id) = self.first_root() {
            return id;
        }
        let folder = Folder::new(DEFAULT_FOLDER_NAME);
        let id = folder.id();
        tracing::debug!("Collection '{}' had no folders, created '{}'", self.name, DEFAULT_FOLDER_NAME);
        self.folders.push(folder);
        self.touch();
        id
    }

    pub fn folder(&self, id: NodeId) -> Option<&Folder> {
        self.folders.iter().find_map(|root| root.find(id))
    }

    pub(crate) fn folder_mut(&mut self, id: NodeId) -> Option<&mut Folder> {
        self.folders.iter_mut().find_map(|root| root.find_mut(id))
    }

    pub fn contains_folder(&self, id: NodeId) -> bool {
        self.folder(id).is_some()
    }

    /// Locate an entry anywhere in the tree along with the folder holding it
    pub fn find_entry(&self, id: NodeId) -> Option<(&Folder, &Entry)> {
        fn search(folder: &Folder, id: NodeId) -> Option<(&Folder, &Entry)> {
            if let Some(entry) = folder.entry(id) {
                return Some((folder, entry));
            }
            folder.children().iter().find_map(|child| search(child, id))
        }
        self.folders.iter().find_map(|root| search(root, id))
    }

    /// Append a new folder under `parent`, or as a root folder when `parent`
    /// is `None`. The new folder is not selected.
    pub fn add_folder(&mut self, parent: Option<NodeId>, name: impl Into<String>) -> PaletteResult<NodeId> {
        let folder = Folder::new(name);
        let id = folder.id();
        match parent {
            None => self.folders.push(folder),
            Some(parent_id) => self
                .folder_mut(parent_id)
                .ok_or(PaletteError::FolderNotFound(parent_id))?
                .children_mut()
                .push(folder),
        }
        self.touch();
        Ok(id)
    }

    /// Detach a folder and its whole subtree
    pub fn remove_folder(&mut self, id: NodeId) -> PaletteResult<Folder> {
        let removed = match self.folders.iter().position(|f| f.id() == id) {
            Some(index) => Some(self.folders.remove(index)),
            None => self
                .folders
                .iter_mut()
                .find_map(|root| root.take_descendant(id)),
        };
        let removed = removed.ok_or(PaletteError::FolderNotFound(id))?;
        tracing::debug!(
            "Removed folder '{}' with {} entries",
            removed.name(),
            removed.entry_count()
        );
        self.touch();
        Ok(removed)
    }

    pub fn rename_folder(&mut self, id: NodeId, name: impl Into<String>) -> PaletteResult<()> {
        self.folder_mut(id)
            .ok_or(PaletteError::FolderNotFound(id))?
            .set_name(name);
        self.touch();
        Ok(())
    }

    /// Move a folder under `new_parent` (or to the root list) at `index`,
    /// appending when `index` is `None` or past the end.
    pub fn move_folder(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> PaletteResult<()> {
        let folder = self.folder(id).ok_or(PaletteError::FolderNotFound(id))?;

        if let Some(parent_id) = new_parent {
            // Dropping a folder onto itself or its own child would orphan the subtree
            if folder.find(parent_id).is_some() {
                return Err(PaletteError::InvalidMove { folder: id });
            }
            if !self.contains_folder(parent_id) {
                return Err(PaletteError::FolderNotFound(parent_id));
            }
        }

        let subtree = self.remove_folder(id)?;
        let siblings = match new_parent {
            None => &mut self.folders,
            Some(parent_id) => self
                .folder_mut(parent_id)
                .ok_or(PaletteError::FolderNotFound(parent_id))?
                .children_mut(),
        };
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, subtree);
        self.touch();
        Ok(())
    }

    /// Append entries to a folder in one batch. Returns how many were added.
    pub fn add_entries(&mut self, folder: NodeId, entries: Vec<Entry>) -> PaletteResult<usize> {
        let target = self
            .folder_mut(folder)
            .ok_or(PaletteError::FolderNotFound(folder))?;
        let count = entries.len();
        if count == 0 {
            return Ok(0);
        }
        target.add_entries(entries);
        self.touch();
        Ok(count)
    }

    /// Detach an entry by identity
    pub fn remove_entry(&mut self, folder: NodeId, entry: NodeId) -> PaletteResult<Entry> {
        let removed = self
            .folder_mut(folder)
            .ok_or(PaletteError::FolderNotFound(folder))?
            .remove_entry(entry)
            .ok_or(PaletteError::EntryNotFound { folder, entry })?;
        self.touch();
        Ok(removed)
    }

    /// Sort one folder's entries. Returns whether the order changed.
    pub fn sort_folder(&mut self, folder: NodeId, mode: SortMode) -> PaletteResult<bool> {
        let target = self
            .folder_mut(folder)
            .ok_or(PaletteError::FolderNotFound(folder))?;
        let before: Vec<NodeId> = target.entries().iter().map(Entry::id).collect();
        target.sort_entries(mode);
        let changed = target
            .entries()
            .iter()
            .map(Entry::id)
            .ne(before.iter().copied());
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
