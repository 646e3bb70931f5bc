//! Reference paths
//!
//! A reference path addresses a folder or entry by the identity tokens of its
//! ownership chain, root first. Sibling indices would be invalidated by
//! inserts, removals, sorting and undo; identity tokens stay valid as long as
//! the node itself exists.
//!
//! Paths are lookup keys, not handles. Compute one from a node's current
//! position, store it, and resolve it again whenever the node is needed.
//! Resolution never guesses: any segment that no longer matches yields `None`.
//!
//! Text form: `folder:<token>/<token>` or `entry:<token>/.../<token>`.

use crate::collection::Collection;
use crate::entry::Entry;
use crate::folder::Folder;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which child list the final token resolves into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTarget {
    Folder,
    Entry,
}

impl PathTarget {
    fn prefix(&self) -> &'static str {
        match self {
            PathTarget::Folder => "folder",
            PathTarget::Entry => "entry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ReferencePath {
    target: PathTarget,
    tokens: Vec<NodeId>,
}

/// A node found by resolving a reference path
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Folder(&'a Folder),
    Entry(&'a Entry),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Folder(folder) => folder.id(),
            NodeRef::Entry(entry) => entry.id(),
        }
    }
}

impl ReferencePath {
    pub fn new(target: PathTarget, tokens: Vec<NodeId>) -> Self {
        Self { target, tokens }
    }

    /// Path of the folder with `id`, or `None` if it is not in the collection
    pub fn of_folder(collection: &Collection, id: NodeId) -> Option<Self> {
        collection
            .root_folders()
            .iter()
            .find_map(|root| root.folder_chain(id))
            .map(|tokens| Self::new(PathTarget::Folder, tokens))
    }

    /// Path of the entry with `id`, or `None` if it is not in the collection
    pub fn of_entry(collection: &Collection, id: NodeId) -> Option<Self> {
        collection
            .root_folders()
            .iter()
            .find_map(|root| root.entry_chain(id))
            .map(|tokens| Self::new(PathTarget::Entry, tokens))
    }

    pub fn target(&self) -> PathTarget {
        self.target
    }

    pub fn tokens(&self) -> &[NodeId] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token of the addressed node itself
    pub fn last(&self) -> Option<NodeId> {
        self.tokens.last().copied()
    }

    /// The path of the folder that owns the addressed node
    pub fn parent(&self) -> Option<ReferencePath> {
        match self.tokens.len() {
            0 | 1 => None,
            len => Some(Self::new(PathTarget::Folder, self.tokens[..len - 1].to_vec())),
        }
    }

    /// True when this path points inside the folder addressed by `folder`
    /// (or at it).
    pub fn starts_with(&self, folder: &ReferencePath) -> bool {
        folder.target == PathTarget::Folder && self.tokens.starts_with(&folder.tokens)
    }

    /// Walk the folder part of the chain: every token except the last must be
    /// a folder, the first among the roots and the rest among child folders.
    fn resolve_parent<'a>(&self, collection: &'a Collection) -> Option<(&'a [Folder], NodeId)> {
        let (last, folders) = self.tokens.split_last()?;
        let mut siblings = collection.root_folders();
        for token in folders {
            let folder = siblings.iter().find(|f| f.id() == *token)?;
            siblings = folder.children();
        }
        Some((siblings, *last))
    }

    pub fn resolve_folder<'a>(&self, collection: &'a Collection) -> Option<&'a Folder> {
        if self.target != PathTarget::Folder {
            return None;
        }
        let (siblings, last) = self.resolve_parent(collection)?;
        siblings.iter().find(|f| f.id() == last)
    }

    pub fn resolve_entry<'a>(&self, collection: &'a Collection) -> Option<&'a Entry> {
        if self.target != PathTarget::Entry || self.tokens.len() < 2 {
            return None;
        }
        let parent = self.parent()?.resolve_folder(collection)?;
        parent.entry(self.last()?)
    }

    pub fn resolve<'a>(&self, collection: &'a Collection) -> Option<NodeRef<'a>> {
        match self.target {
            PathTarget::Folder => self.resolve_folder(collection).map(NodeRef::Folder),
            PathTarget::Entry => self.resolve_entry(collection).map(NodeRef::Entry),
        }
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.target.prefix())?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("Reference path is missing its 'folder:' or 'entry:' prefix: '{0}'")]
    MissingPrefix(String),

    #[error("Unknown reference path target '{0}'")]
    UnknownTarget(String),

    #[error("Invalid identity token '{0}' in reference path")]
    InvalidToken(String),

    #[error("Entry paths need at least a folder and an entry token")]
    EntryWithoutFolder,
}

impl FromStr for ReferencePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once(':')
            .ok_or_else(|| PathParseError::MissingPrefix(s.to_string()))?;
        let target = match prefix {
            "folder" => PathTarget::Folder,
            "entry" => PathTarget::Entry,
            other => return Err(PathParseError::UnknownTarget(other.to_string())),
        };
        let tokens = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .parse::<NodeId>()
                    .map_err(|_| PathParseError::InvalidToken(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if target == PathTarget::Entry && tokens.len() == 1 {
            return Err(PathParseError::EntryWithoutFolder);
        }
        Ok(Self { target, tokens })
    }
}

impl From<ReferencePath> for String {
    fn from(path: ReferencePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for ReferencePath {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        collection: Collection,
        root: NodeId,
        props: NodeId,
        chairs: NodeId,
        chair: NodeId,
    }

    fn fixture() -> Fixture {
        let mut collection = Collection::personal();
        let root = collection.ensure_root_folder();
        let props = collection.add_folder(Some(root), "Props").unwrap();
        let chairs = collection.add_folder(Some(props), "Chairs").unwrap();
        let entry = Entry::asset("Assets/chair.prefab");
        let chair = entry.id();
        collection.add_entries(chairs, vec![entry]).unwrap();
        Fixture { collection, root, props, chairs, chair }
    }

    #[test]
    fn test_folder_path_roundtrip() {
        let fx = fixture();
        for id in [fx.root, fx.props, fx.chairs] {
            let path = ReferencePath::of_folder(&fx.collection, id).unwrap();
            assert_eq!(path.resolve_folder(&fx.collection).map(Folder::id), Some(id));
            assert_eq!(path.resolve(&fx.collection).map(|n| n.id()), Some(id));
        }
        let path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        assert_eq!(path.tokens(), &[fx.root, fx.props, fx.chairs]);
    }

    #[test]
    fn test_entry_path_roundtrip() {
        let fx = fixture();
        let path = ReferencePath::of_entry(&fx.collection, fx.chair).unwrap();
        assert_eq!(path.target(), PathTarget::Entry);
        assert_eq!(path.resolve_entry(&fx.collection).map(Entry::id), Some(fx.chair));
        assert_eq!(
            path.parent(),
            ReferencePath::of_folder(&fx.collection, fx.chairs)
        );
    }

    #[test]
    fn test_paths_survive_reordering() {
        let mut fx = fixture();
        let path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        let sibling = fx.collection.add_folder(Some(fx.props), "Tables").unwrap();
        fx.collection.move_folder(sibling, Some(fx.props), Some(0)).unwrap();
        assert_eq!(path.resolve_folder(&fx.collection).map(Folder::id), Some(fx.chairs));
    }

    #[test]
    fn test_removed_subtree_no_longer_resolves() {
        let mut fx = fixture();
        let chairs_path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        let chair_path = ReferencePath::of_entry(&fx.collection, fx.chair).unwrap();
        fx.collection.remove_folder(fx.props).unwrap();
        assert!(chairs_path.resolve(&fx.collection).is_none());
        assert!(chair_path.resolve(&fx.collection).is_none());
    }

    #[test]
    fn test_moved_folder_needs_a_new_path() {
        let mut fx = fixture();
        let old_path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        fx.collection.move_folder(fx.chairs, Some(fx.root), None).unwrap();
        assert!(old_path.resolve_folder(&fx.collection).is_none());
        let new_path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        assert_eq!(new_path.tokens(), &[fx.root, fx.chairs]);
    }

    #[test]
    fn test_wrong_target_is_no_match() {
        let fx = fixture();
        let folder_path = ReferencePath::of_folder(&fx.collection, fx.chairs).unwrap();
        let as_entry = ReferencePath::new(PathTarget::Entry, folder_path.tokens().to_vec());
        assert!(as_entry.resolve(&fx.collection).is_none());

        let entry_path = ReferencePath::of_entry(&fx.collection, fx.chair).unwrap();
        let as_folder = ReferencePath::new(PathTarget::Folder, entry_path.tokens().to_vec());
        assert!(as_folder.resolve(&fx.collection).is_none());
    }

    #[test]
    fn test_empty_path_and_empty_collection() {
        let fx = fixture();
        let empty = ReferencePath::new(PathTarget::Folder, Vec::new());
        assert!(empty.resolve(&fx.collection).is_none());

        let path = ReferencePath::of_folder(&fx.collection, fx.root).unwrap();
        let bare = Collection::new("Empty");
        assert!(path.resolve(&bare).is_none());
        assert!(ReferencePath::of_folder(&bare, fx.root).is_none());
    }

    #[test]
    fn test_paths_survive_serialization() {
        let fx = fixture();
        let path = ReferencePath::of_entry(&fx.collection, fx.chair).unwrap();
        let reloaded = Collection::from_bytes(&fx.collection.to_bytes().unwrap()).unwrap();
        assert_eq!(path.resolve_entry(&reloaded).map(Entry::id), Some(fx.chair));
    }

    #[test]
    fn test_text_form() {
        let fx = fixture();
        let path = ReferencePath::of_entry(&fx.collection, fx.chair).unwrap();
        let text = path.to_string();
        assert!(text.starts_with("entry:"));
        assert_eq!(text.parse::<ReferencePath>(), Ok(path.clone()));

        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, format!("\"{}\"", text));
        assert_eq!(serde_json::from_str::<ReferencePath>(&json).unwrap(), path);
    }

    #[test]
    fn test_text_form_errors() {
        assert!(matches!(
            "nothing".parse::<ReferencePath>(),
            Err(PathParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "shelf:abc".parse::<ReferencePath>(),
            Err(PathParseError::UnknownTarget(_))
        ));
        assert!(matches!(
            "folder:abc".parse::<ReferencePath>(),
            Err(PathParseError::InvalidToken(_))
        ));
        let lone = format!("entry:{}", NodeId::new());
        assert_eq!(lone.parse::<ReferencePath>(), Err(PathParseError::EntryWithoutFolder));
    }
}
