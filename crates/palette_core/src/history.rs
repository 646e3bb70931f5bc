//! Undo/redo
//!
//! Snapshots are the serialized collection, the same bytes the store writes.
//! Restoring one rewrites the whole tree, so anything addressing nodes has to
//! go through reference paths to find them again.

use crate::collection::Collection;
use crate::error::{PaletteError, PaletteResult};

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Vec<u8>>,
    redo: Vec<Vec<u8>>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn snapshot(collection: &Collection) -> PaletteResult<Vec<u8>> {
        collection
            .to_bytes()
            .map_err(|e| PaletteError::Snapshot(e.to_string()))
    }

    /// Record the state a command is about to change. Clears the redo stack.
    pub fn push(&mut self, snapshot: Vec<u8>) {
        self.undo.push(snapshot);
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    pub fn undo(&mut self, current: &Collection) -> PaletteResult<Collection> {
        let snapshot = self.undo.pop().ok_or(PaletteError::HistoryEmpty("undo"))?;
        let restored = restore(&snapshot)?;
        self.redo.push(Self::snapshot(current)?);
        Ok(restored)
    }

    pub fn redo(&mut self, current: &Collection) -> PaletteResult<Collection> {
        let snapshot = self.redo.pop().ok_or(PaletteError::HistoryEmpty("redo"))?;
        let restored = restore(&snapshot)?;
        self.undo.push(Self::snapshot(current)?);
        Ok(restored)
    }
}

fn restore(snapshot: &[u8]) -> PaletteResult<Collection> {
    Collection::from_bytes(snapshot).map_err(|e| PaletteError::Snapshot(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::default();
        let mut collection = Collection::personal();
        let original = collection.clone();

        history.push(History::snapshot(&collection).unwrap());
        collection.add_folder(None, "Props").unwrap();
        let edited = collection.clone();

        let undone = history.undo(&collection).unwrap();
        assert_eq!(undone, original);
        assert!(history.can_redo());

        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, edited);
        assert!(history.can_undo());
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        let collection = Collection::personal();
        assert_eq!(history.undo(&collection), Err(PaletteError::HistoryEmpty("undo")));
        assert_eq!(history.redo(&collection), Err(PaletteError::HistoryEmpty("redo")));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(2);
        let mut collection = Collection::personal();
        for name in ["A", "B", "C"] {
            history.push(History::snapshot(&collection).unwrap());
            collection.add_folder(None, name).unwrap();
        }
        let one = history.undo(&collection).unwrap();
        let two = history.undo(&one).unwrap();
        assert_eq!(two.root_folders().len(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::default();
        let mut collection = Collection::personal();
        history.push(History::snapshot(&collection).unwrap());
        collection.add_folder(None, "A").unwrap();
        let undone = history.undo(&collection).unwrap();
        assert!(history.can_redo());
        history.push(History::snapshot(&undone).unwrap());
        assert!(!history.can_redo());
    }
}
