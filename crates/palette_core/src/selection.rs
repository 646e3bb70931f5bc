//! Active folder, entry selection and sorting
//!
//! Nothing here holds a reference or an index into the tree. The active folder
//! and the selected entries are stored as reference paths and re-resolved
//! against whatever collection is current, because the collection can be
//! rewritten behind our back (undo, reload) without any notification.

use crate::collection::Collection;
use crate::entry::Entry;
use crate::id::NodeId;
use crate::reference_path::ReferencePath;
use crate::sort::SortMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedFolder {
    revision: u64,
    folder: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    active_folder: Option<ReferencePath>,
    cached: Option<CachedFolder>,
    selected: Vec<ReferencePath>,
    sort_mode: SortMode,
}

impl SelectionEngine {
    pub fn new(sort_mode: SortMode, active_folder: Option<ReferencePath>) -> Self {
        Self {
            active_folder,
            cached: None,
            selected: Vec::new(),
            sort_mode,
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// The stored active folder path. `None` means the first root folder.
    pub fn active_folder_path(&self) -> Option<&ReferencePath> {
        self.active_folder.as_ref()
    }

    /// Forget every cached resolution, e.g. after switching collections
    pub fn reset(&mut self) {
        self.active_folder = None;
        self.cached = None;
        self.selected.clear();
    }

    /// Make the folder at `path` active. Returns `false` if it already was.
    ///
    /// Switching folders clears the selection and sorts the newly active
    /// folder with the current mode, so a mode chosen while looking at one
    /// folder applies to every folder visited afterwards.
    pub fn set_active_folder(&mut self, collection: &mut Collection, path: ReferencePath) -> bool {
        if self.active_folder.as_ref() == Some(&path) {
            return false;
        }
        tracing::debug!("Active folder set to {}", path);
        self.active_folder = Some(path);
        self.cached = None;
        self.clear_selection();
        self.sort_active_folder(collection);
        true
    }

    /// Identity of the active folder, resolving the stored path again if the
    /// collection changed since the last lookup. A stale path is dropped and
    /// the first root folder is used instead.
    pub fn active_folder(&mut self, collection: &mut Collection) -> NodeId {
        let fallback = collection.ensure_root_folder();

        if let Some(cached) = self.cached {
            if cached.revision == collection.revision() && collection.contains_folder(cached.folder) {
                return cached.folder;
            }
        }

        let resolved = self
            .active_folder
            .as_ref()
            .and_then(|path| path.resolve_folder(collection))
            .map(|folder| folder.id());

        let folder = match resolved {
            Some(id) => id,
            None => {
                if let Some(stale) = self.active_folder.take() {
                    tracing::debug!("Active folder {} no longer exists, falling back to first folder", stale);
                    self.selected.clear();
                }
                fallback
            }
        };

        self.cached = Some(CachedFolder {
            revision: collection.revision(),
            folder,
        });
        folder
    }

    /// Store fresh paths for the active folder and the selected entries after
    /// a command that may have changed their token chains, such as moving a
    /// folder or restoring a snapshot. Nodes that no longer exist are left to
    /// the usual fallback.
    pub fn reanchor(&mut self, collection: &Collection, active: NodeId, selected: &[NodeId]) {
        let Some(path) = ReferencePath::of_folder(collection, active) else {
            return;
        };
        let implicit = self.active_folder.is_none() && collection.first_root() == Some(active);
        if !implicit && self.active_folder.as_ref() != Some(&path) {
            tracing::debug!("Active folder now at {}", path);
            self.active_folder = Some(path);
        }
        self.cached = None;
        self.selected = selected
            .iter()
            .filter_map(|id| ReferencePath::of_entry(collection, *id))
            .collect();
    }

    /// Path of the active folder after resolution and fallback
    pub fn current_active_folder(&mut self, collection: &mut Collection) -> Option<ReferencePath> {
        let id = self.active_folder(collection);
        ReferencePath::of_folder(collection, id)
    }

    /// Store a new global sort mode and apply it to the active folder
    pub fn set_sort_mode(&mut self, collection: &mut Collection, mode: SortMode) {
        self.sort_mode = mode;
        self.sort_active_folder(collection);
    }

    pub fn sort_active_folder(&mut self, collection: &mut Collection) {
        let folder = self.active_folder(collection);
        let mode = self.sort_mode;
        // The folder was resolved just above, so it exists.
        if let Ok(true) = collection.sort_folder(folder, mode) {
            tracing::debug!("Sorted active folder by {}", mode);
        }
    }

    /// Drop selected entries that no longer resolve, or that no longer live
    /// directly in the active folder.
    fn prune_selection(&mut self, collection: &mut Collection) {
        if self.selected.is_empty() {
            return;
        }
        let active = self.active_folder(collection);
        let before = self.selected.len();
        self.selected.retain(|path| {
            path.parent().and_then(|p| p.last()) == Some(active)
                && path.resolve_entry(collection).is_some()
        });
        let dropped = before - self.selected.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} stale entry selection(s)", dropped);
        }
    }

    /// Select an entry of the active folder. Entries elsewhere are ignored.
    pub fn select(&mut self, collection: &mut Collection, entry: NodeId) -> bool {
        let active = self.active_folder(collection);
        let Some(path) = ReferencePath::of_entry(collection, entry) else {
            return false;
        };
        if path.parent().and_then(|p| p.last()) != Some(active) {
            return false;
        }
        if !self.selected.contains(&path) {
            self.selected.push(path);
        }
        true
    }

    pub fn deselect(&mut self, entry: NodeId) {
        self.selected.retain(|path| path.last() != Some(entry));
    }

    pub fn toggle(&mut self, collection: &mut Collection, entry: NodeId) {
        if self.selected.iter().any(|path| path.last() == Some(entry)) {
            self.deselect(entry);
        } else {
            self.select(collection, entry);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&mut self, collection: &mut Collection, entry: NodeId) -> bool {
        self.prune_selection(collection);
        self.selected.iter().any(|path| path.last() == Some(entry))
    }

    pub fn selected_ids(&mut self, collection: &mut Collection) -> Vec<NodeId> {
        self.prune_selection(collection);
        self.selected.iter().filter_map(ReferencePath::last).collect()
    }

    /// Selected entries in selection order
    pub fn selected_entries<'a>(&mut self, collection: &'a mut Collection) -> Vec<&'a Entry> {
        self.prune_selection(collection);
        let collection: &'a Collection = collection;
        self.selected
            .iter()
            .filter_map(|path| path.resolve_entry(collection))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn names(collection: &Collection, folder: NodeId) -> Vec<String> {
        collection
            .folder(folder)
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.display_name().to_string())
            .collect()
    }

    fn setup() -> (Collection, NodeId, NodeId) {
        let mut collection = Collection::personal();
        let x = collection.ensure_root_folder();
        let y = collection.add_folder(None, "Y").unwrap();
        for folder in [x, y] {
            collection
                .add_entries(
                    folder,
                    vec![
                        Entry::asset("Assets/b.prefab"),
                        Entry::asset("Assets/c.prefab"),
                        Entry::asset("Assets/a.prefab"),
                    ],
                )
                .unwrap();
        }
        (collection, x, y)
    }

    #[test]
    fn test_defaults_to_first_root_folder() {
        let (mut collection, x, _) = setup();
        let mut engine = SelectionEngine::default();
        assert_eq!(engine.active_folder(&mut collection), x);
        assert!(engine.active_folder_path().is_none());
    }

    #[test]
    fn test_synthesizes_folder_for_empty_collection() {
        let mut collection = Collection::new("Empty");
        let mut engine = SelectionEngine::default();
        let folder = engine.active_folder(&mut collection);
        assert_eq!(collection.root_folders().len(), 1);
        assert_eq!(collection.root_folders()[0].id(), folder);
    }

    #[test]
    fn test_set_same_folder_is_noop() {
        let (mut collection, _, y) = setup();
        let mut engine = SelectionEngine::default();
        let path = ReferencePath::of_folder(&collection, y).unwrap();
        assert!(engine.set_active_folder(&mut collection, path.clone()));
        let entry = collection.folder(y).unwrap().entries()[0].id();
        engine.select(&mut collection, entry);
        assert!(!engine.set_active_folder(&mut collection, path));
        assert!(engine.is_selected(&mut collection, entry));
    }

    #[test]
    fn test_switching_folder_clears_selection() {
        let (mut collection, x, y) = setup();
        let mut engine = SelectionEngine::default();
        let entry = collection.folder(x).unwrap().entries()[0].id();
        assert!(engine.select(&mut collection, entry));

        let path = ReferencePath::of_folder(&collection, y).unwrap();
        engine.set_active_folder(&mut collection, path);
        assert!(engine.selected_ids(&mut collection).is_empty());
    }

    #[test]
    fn test_sort_mode_is_global() {
        let (mut collection, x, y) = setup();
        let mut engine = SelectionEngine::default();

        engine.set_sort_mode(&mut collection, SortMode::Alphabetical);
        assert_eq!(names(&collection, x), vec!["a", "b", "c"]);
        assert_eq!(names(&collection, y), vec!["b", "c", "a"]);

        let y_path = ReferencePath::of_folder(&collection, y).unwrap();
        engine.set_active_folder(&mut collection, y_path);
        assert_eq!(names(&collection, y), vec!["a", "b", "c"]);

        engine.set_sort_mode(&mut collection, SortMode::ReverseAlphabetical);
        assert_eq!(names(&collection, y), vec!["c", "b", "a"]);

        let x_path = ReferencePath::of_folder(&collection, x).unwrap();
        engine.set_active_folder(&mut collection, x_path);
        assert_eq!(names(&collection, x), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_stale_active_folder_falls_back() {
        let (mut collection, x, y) = setup();
        let mut engine = SelectionEngine::default();
        let path = ReferencePath::of_folder(&collection, y).unwrap();
        engine.set_active_folder(&mut collection, path);
        assert_eq!(engine.active_folder(&mut collection), y);

        collection.remove_folder(y).unwrap();
        assert_eq!(engine.active_folder(&mut collection), x);
        assert!(engine.active_folder_path().is_none());
    }

    #[test]
    fn test_recovers_after_external_rewrite() {
        let (mut collection, _, y) = setup();
        let snapshot = collection.to_bytes().unwrap();
        let mut engine = SelectionEngine::default();

        let path = ReferencePath::of_folder(&collection, y).unwrap();
        engine.set_active_folder(&mut collection, path);
        let entry = collection.folder(y).unwrap().entries()[0].id();
        engine.select(&mut collection, entry);

        // Rewrite the whole tree, as undo would
        let mut rewritten = Collection::from_bytes(&snapshot).unwrap();
        assert_eq!(engine.active_folder(&mut rewritten), y);
        assert!(engine.is_selected(&mut rewritten, entry));

        rewritten.remove_entry(y, entry).unwrap();
        assert!(engine.selected_ids(&mut rewritten).is_empty());
    }

    #[test]
    fn test_reanchor_follows_a_moved_ancestor() {
        let (mut collection, x, y) = setup();
        let shelf = collection.add_folder(Some(x), "Shelf").unwrap();
        let top = collection.add_folder(Some(shelf), "Top").unwrap();
        collection.add_entries(top, vec![Entry::asset("Assets/d.prefab")]).unwrap();
        let entry = collection.folder(top).unwrap().entries()[0].id();

        let mut engine = SelectionEngine::default();
        let path = ReferencePath::of_folder(&collection, top).unwrap();
        engine.set_active_folder(&mut collection, path);
        assert!(engine.select(&mut collection, entry));

        collection.move_folder(shelf, Some(y), None).unwrap();
        engine.reanchor(&collection, top, &[entry]);

        assert_eq!(engine.active_folder(&mut collection), top);
        assert_eq!(engine.active_folder_path().unwrap().tokens(), &[y, shelf, top]);
        assert_eq!(engine.selected_ids(&mut collection), vec![entry]);
    }

    #[test]
    fn test_reanchor_keeps_implicit_first_root() {
        let (mut collection, x, _) = setup();
        let mut engine = SelectionEngine::default();
        let z = collection.add_folder(None, "Z").unwrap();
        collection.move_folder(z, None, Some(1)).unwrap();
        engine.reanchor(&collection, x, &[]);
        assert!(engine.active_folder_path().is_none());
        assert_eq!(engine.active_folder(&mut collection), x);
    }

    #[test]
    fn test_reanchor_ignores_missing_folder() {
        let (mut collection, x, y) = setup();
        let mut engine = SelectionEngine::default();
        let path = ReferencePath::of_folder(&collection, y).unwrap();
        engine.set_active_folder(&mut collection, path);
        collection.remove_folder(y).unwrap();
        engine.reanchor(&collection, y, &[]);
        assert_eq!(engine.active_folder(&mut collection), x);
    }

    #[test]
    fn test_cannot_select_entries_outside_active_folder() {
        let (mut collection, _, y) = setup();
        let mut engine = SelectionEngine::default();
        let entry = collection.folder(y).unwrap().entries()[0].id();
        assert!(!engine.select(&mut collection, entry));
        assert!(!engine.select(&mut collection, NodeId::new()));
    }

    #[test]
    fn test_toggle_and_selected_entries() {
        let (mut collection, x, _) = setup();
        let mut engine = SelectionEngine::default();
        let ids: Vec<NodeId> = collection.folder(x).unwrap().entries().iter().map(Entry::id).collect();

        engine.toggle(&mut collection, ids[0]);
        engine.toggle(&mut collection, ids[2]);
        engine.toggle(&mut collection, ids[0]);
        let selected: Vec<NodeId> = engine
            .selected_entries(&mut collection)
            .into_iter()
            .map(Entry::id)
            .collect();
        assert_eq!(selected, vec![ids[2]]);
    }
}
