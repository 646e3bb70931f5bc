//! Drop ingestion
//!
//! Turns a batch of dropped items into entries of the active folder. Folders
//! are expanded into their contents, duplicates and scene instances are
//! filtered out, and items whose variant the user has to pick pause the
//! pipeline until a decision is supplied.
//!
//! The pipeline is plain state driven by `step()`: it owns no timers or
//! threads, so the host can ask its question whenever it is able to and call
//! `step()` again later. Nothing touches the collection until the queue is
//! drained, at which point all pending entries are added in one mutation.

use crate::collection::Collection;
use crate::content::{ContentClass, ContentResolver};
use crate::entry::{Entry, EntryVariant};
use crate::id::{ContentRef, NodeId};
use crate::selection::SelectionEngine;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestState {
    #[default]
    Idle,
    Processing,
    /// Halted on `item` until `provide_decision` is called
    AwaitingInput { item: ContentRef },
}

/// What a single `step()` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do
    Idle,
    /// Handled one queue item; call `step()` again
    Processing,
    /// Waiting on a decision for this item
    AwaitingInput(ContentRef),
    /// Queue drained; `added` entries were appended to the active folder
    Committed { added: usize },
}

#[derive(Debug, Default)]
pub struct IngestPipeline {
    state: IngestState,
    queue: VecDeque<ContentRef>,
    pending: Vec<Entry>,
    decision: Option<EntryVariant>,
}

impl IngestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &IngestState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == IngestState::Idle
    }

    /// Items still waiting to be handled, front first
    pub fn queued(&self) -> impl Iterator<Item = &ContentRef> {
        self.queue.iter()
    }

    /// Entries that will be added on commit
    pub fn pending(&self) -> &[Entry] {
        &self.pending
    }

    /// `true` when the next `step()` commits the batch
    pub fn will_commit(&self) -> bool {
        self.state == IngestState::Processing && self.queue.is_empty()
    }

    /// Start a new batch, discarding anything left over from a previous one
    pub fn begin_ingest<I, C>(&mut self, items: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentRef>,
    {
        self.queue = items.into_iter().map(Into::into).collect();
        self.pending.clear();
        self.decision = None;
        self.state = IngestState::Processing;
        tracing::debug!("Ingest started with {} item(s)", self.queue.len());
    }

    /// Abandon the current batch. Nothing is committed.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            tracing::debug!(
                "Ingest cancelled with {} queued and {} pending",
                self.queue.len(),
                self.pending.len()
            );
        }
        self.queue.clear();
        self.pending.clear();
        self.decision = None;
        self.state = IngestState::Idle;
    }

    /// Answer the question the pipeline is waiting on. Ignored unless the
    /// pipeline is awaiting input.
    pub fn provide_decision(&mut self, variant: EntryVariant) -> bool {
        if !matches!(self.state, IngestState::AwaitingInput { .. }) {
            return false;
        }
        self.decision = Some(variant);
        self.state = IngestState::Processing;
        true
    }

    fn is_duplicate(&self, collection: &Collection, folder: NodeId, item: &ContentRef) -> bool {
        collection
            .folder(folder)
            .is_some_and(|f| f.has_entry_for_content(item))
            || self.pending.iter().any(|e| e.content() == item)
    }

    /// Handle the item at the front of the queue, or commit when the queue is
    /// empty.
    pub fn step<R>(
        &mut self,
        collection: &mut Collection,
        selection: &mut SelectionEngine,
        resolver: &R,
    ) -> StepOutcome
    where
        R: ContentResolver + ?Sized,
    {
        match &self.state {
            IngestState::Idle => return StepOutcome::Idle,
            IngestState::AwaitingInput { item } => return StepOutcome::AwaitingInput(item.clone()),
            IngestState::Processing => {}
        }

        let Some(item) = self.queue.front().map(|item| resolver.canonical(item)) else {
            return self.commit(collection, selection);
        };

        let variant = match resolver.classify(&item) {
            ContentClass::Container => {
                let mut leaves = resolver.descendant_leaves(&item);
                leaves.sort();
                tracing::debug!("Expanded '{}' into {} item(s)", item, leaves.len());
                self.queue.pop_front();
                for leaf in leaves.into_iter().rev() {
                    self.queue.push_front(leaf);
                }
                return StepOutcome::Processing;
            }
            ContentClass::LiveInstance => {
                tracing::debug!("Ignoring scene instance '{}'", item);
                None
            }
            ContentClass::Unsupported => {
                tracing::debug!("Ignoring unsupported item '{}'", item);
                None
            }
            ContentClass::Library(variant) => Some(variant),
            ContentClass::Ambiguous => match self.decision.take() {
                Some(variant) => Some(variant),
                None => {
                    tracing::debug!("Waiting for a decision on '{}'", item);
                    self.state = IngestState::AwaitingInput { item: item.clone() };
                    return StepOutcome::AwaitingInput(item);
                }
            },
        };

        if let Some(variant) = variant {
            let folder = selection.active_folder(collection);
            if self.is_duplicate(collection, folder, &item) {
                tracing::debug!("Skipping '{}', already in the palette", item);
            } else {
                self.pending.push(Entry::new(variant, item));
            }
        }

        self.queue.pop_front();
        StepOutcome::Processing
    }

    /// Step until the batch is committed or the pipeline needs a decision
    pub fn run<R>(
        &mut self,
        collection: &mut Collection,
        selection: &mut SelectionEngine,
        resolver: &R,
    ) -> StepOutcome
    where
        R: ContentResolver + ?Sized,
    {
        loop {
            match self.step(collection, selection, resolver) {
                StepOutcome::Processing => continue,
                outcome => return outcome,
            }
        }
    }

    fn commit(&mut self, collection: &mut Collection, selection: &mut SelectionEngine) -> StepOutcome {
        self.state = IngestState::Idle;
        self.decision = None;

        if self.pending.is_empty() {
            tracing::debug!("Ingest finished with nothing to add");
            return StepOutcome::Committed { added: 0 };
        }

        // The host may have switched folders while the batch was paused
        let folder = selection.active_folder(collection);
        if let Some(target) = collection.folder(folder) {
            self.pending.retain(|e| !target.has_entry_for_content(e.content()));
        }
        if self.pending.is_empty() {
            tracing::debug!("Every dropped item is already in the target folder");
            return StepOutcome::Committed { added: 0 };
        }

        selection.clear_selection();
        let entries = std::mem::take(&mut self.pending);
        match collection.add_entries(folder, entries) {
            Ok(added) => {
                tracing::info!("Added {} entr{} to the palette", added, if added == 1 { "y" } else { "ies" });
                selection.sort_active_folder(collection);
                StepOutcome::Committed { added }
            }
            Err(e) => {
                // active_folder() always yields a folder of this collection
                tracing::error!("Failed to add dropped entries: {}", e);
                StepOutcome::Committed { added: 0 }
            }
        }
    }
}
