//! Palette session
//!
//! The command surface a host drives. A session owns the current collection
//! together with the selection engine, the ingestion pipeline and the undo
//! history, and routes every command through `&mut self`. Hosts that need to
//! share a session across threads wrap it in a single mutex.
//!
//! Commands that change the tree record an undo snapshot only when they
//! actually changed something, which the collection revision tells us.

use crate::collection::Collection;
use crate::content::ContentResolver;
use crate::entry::{Entry, EntryVariant};
use crate::error::{PaletteError, PaletteResult};
use crate::history::History;
use crate::id::{ContentRef, NodeId};
use crate::ingest::{IngestPipeline, IngestState, StepOutcome};
use crate::reference_path::ReferencePath;
use crate::selection::SelectionEngine;
use crate::settings::PaletteSettings;
use crate::sort::SortMode;
use crate::store::{CollectionSource, CollectionStore};

/// Run `f` against the collection, pushing the prior state onto the undo
/// stack if the revision moved.
fn tracked<T>(
    history: &mut History,
    collection: &mut Collection,
    f: impl FnOnce(&mut Collection) -> T,
) -> PaletteResult<T> {
    let before = collection.revision();
    let snapshot = History::snapshot(collection)?;
    let out = f(collection);
    if collection.revision() != before {
        history.push(snapshot);
    }
    Ok(out)
}

pub struct PaletteSession<S: CollectionStore> {
    store: S,
    source: CollectionSource,
    collection: Collection,
    selection: SelectionEngine,
    ingest: IngestPipeline,
    history: History,
    saved_revision: u64,
}

impl<S: CollectionStore> PaletteSession<S> {
    /// Load the collection named by `settings` and restore the stored sort
    /// mode and active folder.
    pub fn open(store: S, settings: &PaletteSettings) -> anyhow::Result<Self> {
        let source = settings.current_collection.clone();
        let collection = store.load(&source)?;
        tracing::info!("Opened collection '{}' ({})", collection.name(), source.display_name());
        let saved_revision = collection.revision();
        Ok(Self {
            store,
            source,
            collection,
            selection: SelectionEngine::new(settings.sort_mode, settings.active_folder.clone()),
            ingest: IngestPipeline::new(),
            history: History::new(settings.history_limit),
            saved_revision,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &CollectionSource {
        &self.source
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// `true` when the collection changed since it was loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.collection.revision() != self.saved_revision
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.store.save(&self.source, &self.collection)?;
        self.saved_revision = self.collection.revision();
        tracing::debug!("Saved collection '{}'", self.collection.name());
        Ok(())
    }

    /// Make another collection current. Any ingest in progress is abandoned
    /// and the active folder, selection and history start over.
    pub fn switch_collection(&mut self, source: CollectionSource) -> anyhow::Result<()> {
        let collection = self.store.load(&source)?;
        self.ingest.cancel();
        self.selection.reset();
        self.history.clear();
        self.saved_revision = collection.revision();
        self.collection = collection;
        tracing::info!("Switched to collection '{}' ({})", self.collection.name(), source.display_name());
        self.source = source;
        Ok(())
    }

    /// Write the session state that outlives the process back into `settings`
    pub fn apply_to_settings(&mut self, settings: &mut PaletteSettings) {
        settings.sort_mode = self.selection.sort_mode();
        settings.active_folder = self.selection.current_active_folder(&mut self.collection);
        settings.current_collection = self.source.clone();
    }

    // Folders

    pub fn add_folder(&mut self, parent: Option<NodeId>, name: impl Into<String>) -> PaletteResult<NodeId> {
        let name = name.into();
        tracked(&mut self.history, &mut self.collection, |c| c.add_folder(parent, name))?
    }

    pub fn remove_folder(&mut self, id: NodeId) -> PaletteResult<()> {
        let removed = tracked(&mut self.history, &mut self.collection, |c| c.remove_folder(id))??;
        tracing::info!("Deleted folder '{}'", removed.name());
        Ok(())
    }

    pub fn rename_folder(&mut self, id: NodeId, name: impl Into<String>) -> PaletteResult<()> {
        let name = name.into();
        tracked(&mut self.history, &mut self.collection, |c| c.rename_folder(id, name))?
    }

    /// Move a folder. The active folder and the selection follow the nodes
    /// they name, wherever the move puts them.
    pub fn move_folder(&mut self, id: NodeId, new_parent: Option<NodeId>, index: Option<usize>) -> PaletteResult<()> {
        let (active, selected) = self.anchors();
        tracked(&mut self.history, &mut self.collection, |c| c.move_folder(id, new_parent, index))??;
        self.selection.reanchor(&self.collection, active, &selected);
        Ok(())
    }

    fn anchors(&mut self) -> (NodeId, Vec<NodeId>) {
        let active = self.active_folder();
        (active, self.selected_ids())
    }

    pub fn active_folder(&mut self) -> NodeId {
        self.selection.active_folder(&mut self.collection)
    }

    pub fn active_folder_path(&mut self) -> Option<ReferencePath> {
        self.selection.current_active_folder(&mut self.collection)
    }

    /// Entries of the active folder in display order
    pub fn active_entries(&mut self) -> &[Entry] {
        let id = self.selection.active_folder(&mut self.collection);
        self.collection.folder(id).map(|f| f.entries()).unwrap_or_default()
    }

    /// Activate the folder at `path`. Returns `false` if it was already active.
    pub fn set_active_folder(&mut self, path: ReferencePath) -> PaletteResult<bool> {
        let Self { history, collection, selection, .. } = self;
        tracked(history, collection, |c| selection.set_active_folder(c, path))
    }

    /// Activate a folder by identity
    pub fn select_folder(&mut self, id: NodeId) -> PaletteResult<bool> {
        let path = ReferencePath::of_folder(&self.collection, id).ok_or(PaletteError::FolderNotFound(id))?;
        self.set_active_folder(path)
    }

    // Sorting

    pub fn sort_mode(&self) -> SortMode {
        self.selection.sort_mode()
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) -> PaletteResult<()> {
        let Self { history, collection, selection, .. } = self;
        tracked(history, collection, |c| selection.set_sort_mode(c, mode))
    }

    // Entry selection

    pub fn select(&mut self, entry: NodeId) -> bool {
        self.selection.select(&mut self.collection, entry)
    }

    pub fn deselect(&mut self, entry: NodeId) {
        self.selection.deselect(entry);
    }

    pub fn toggle(&mut self, entry: NodeId) {
        self.selection.toggle(&mut self.collection, entry);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    pub fn selected_ids(&mut self) -> Vec<NodeId> {
        self.selection.selected_ids(&mut self.collection)
    }

    pub fn selected_entries(&mut self) -> Vec<&Entry> {
        self.selection.selected_entries(&mut self.collection)
    }

    // Entries

    /// Remove an entry wherever it lives
    pub fn remove_entry(&mut self, entry: NodeId) -> PaletteResult<Entry> {
        let folder = match self.collection.find_entry(entry) {
            Some((folder, _)) => folder.id(),
            None => {
                let folder = self.active_folder();
                return Err(PaletteError::EntryNotFound { folder, entry });
            }
        };
        self.selection.deselect(entry);
        tracked(&mut self.history, &mut self.collection, |c| c.remove_entry(folder, entry))?
    }

    /// Remove every selected entry as one undoable command
    pub fn remove_selected_entries(&mut self) -> PaletteResult<usize> {
        let folder = self.active_folder();
        let ids = self.selected_ids();
        self.selection.clear_selection();
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = tracked(&mut self.history, &mut self.collection, |c| {
            ids.iter().filter(|id| c.remove_entry(folder, **id).is_ok()).count()
        })?;
        tracing::info!("Removed {} selected entr{}", removed, if removed == 1 { "y" } else { "ies" });
        Ok(removed)
    }

    // Ingestion

    pub fn ingest_state(&self) -> &IngestState {
        self.ingest.state()
    }

    pub fn begin_ingest<I, C>(&mut self, items: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentRef>,
    {
        self.ingest.begin_ingest(items);
    }

    /// Advance the ingestion pipeline by one item
    pub fn step<R>(&mut self, resolver: &R) -> PaletteResult<StepOutcome>
    where
        R: ContentResolver + ?Sized,
    {
        let Self { history, collection, selection, ingest, .. } = self;
        if ingest.will_commit() {
            tracked(history, collection, |c| ingest.step(c, selection, resolver))
        } else {
            Ok(ingest.step(collection, selection, resolver))
        }
    }

    /// Step until the batch commits or needs a decision
    pub fn run_ingest<R>(&mut self, resolver: &R) -> PaletteResult<StepOutcome>
    where
        R: ContentResolver + ?Sized,
    {
        loop {
            match self.step(resolver)? {
                StepOutcome::Processing => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    pub fn provide_decision(&mut self, variant: EntryVariant) -> bool {
        self.ingest.provide_decision(variant)
    }

    pub fn cancel_ingest(&mut self) {
        self.ingest.cancel();
    }

    // History

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> PaletteResult<()> {
        let (active, selected) = self.anchors();
        self.collection = self.history.undo(&self.collection)?;
        self.selection.reanchor(&self.collection, active, &selected);
        tracing::debug!("Undo");
        Ok(())
    }

    pub fn redo(&mut self) -> PaletteResult<()> {
        let (active, selected) = self.anchors();
        self.collection = self.history.redo(&self.collection)?;
        self.selection.reanchor(&self.collection, active, &selected);
        tracing::debug!("Redo");
        Ok(())
    }
}
