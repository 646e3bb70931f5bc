//! Palette folders
//!
//! Folders own their child folders and entries outright. A node therefore has
//! exactly one parent container and the tree cannot form cycles.

use crate::entry::Entry;
use crate::id::{ContentRef, NodeId};
use crate::sort::{sort_entries, SortMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    id: NodeId,
    name: String,
    #[serde(default)]
    children: Vec<Folder>,
    #[serde(default)]
    entries: Vec<Entry>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            children: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn children(&self) -> &[Folder] {
        &self.children
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Folder> {
        &mut self.children
    }

    pub fn child(&self, id: NodeId) -> Option<&Folder> {
        self.children.iter().find(|f| f.id == id)
    }

    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Entry in this folder that references the given content, if any
    pub fn entry_for_content(&self, content: &ContentRef) -> Option<&Entry> {
        self.entries.iter().find(|e| e.content() == content)
    }

    pub fn has_entry_for_content(&self, content: &ContentRef) -> bool {
        self.entry_for_content(content).is_some()
    }

    /// Depth-first search of this folder and its descendants
    pub fn find(&self, id: NodeId) -> Option<&Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Token chain from this folder down to the folder with `id`, inclusive
    pub(crate) fn folder_chain(&self, id: NodeId) -> Option<Vec<NodeId>> {
        if self.id == id {
            return Some(vec![self.id]);
        }
        self.children.iter().find_map(|child| {
            child.folder_chain(id).map(|mut chain| {
                chain.insert(0, self.id);
                chain
            })
        })
    }

    /// Token chain from this folder down to the entry with `id`, inclusive
    pub(crate) fn entry_chain(&self, id: NodeId) -> Option<Vec<NodeId>> {
        if self.entry(id).is_some() {
            return Some(vec![self.id, id]);
        }
        self.children.iter().find_map(|child| {
            child.entry_chain(id).map(|mut chain| {
                chain.insert(0, self.id);
                chain
            })
        })
    }

    /// Detach a direct or indirect child folder, returning its subtree
    pub(crate) fn take_descendant(&mut self, id: NodeId) -> Option<Folder> {
        if let Some(index) = self.children.iter().position(|f| f.id == id) {
            return Some(self.children.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.take_descendant(id))
    }

    pub(crate) fn add_entries(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.entries.extend(entries);
    }

    pub(crate) fn remove_entry(&mut self, id: NodeId) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(index))
    }

    pub fn sort_entries(&mut self, mode: SortMode) {
        sort_entries(&mut self.entries, mode);
    }

    /// Number of folders in this subtree, including this one
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(Folder::folder_count).sum::<usize>()
    }

    /// Number of entries in this subtree
    pub fn entry_count(&self) -> usize {
        self.entries.len() + self.children.iter().map(Folder::entry_count).sum::<usize>()
    }
}
