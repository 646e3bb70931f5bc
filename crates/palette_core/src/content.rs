//! Content-reference resolution
//!
//! The ingestion pipeline does not know what the dropped identifiers point at.
//! It asks a `ContentResolver` to classify each one and to enumerate the
//! leaves under a container.

use crate::entry::EntryVariant;
use crate::id::ContentRef;
use std::collections::{HashMap, HashSet};

/// How a dropped item should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Folder-like item: replaced by its descendant leaves
    Container,
    /// Instance living in an open scene rather than library content
    LiveInstance,
    /// Library content that becomes an entry of the given variant
    Library(EntryVariant),
    /// Library content whose variant the user has to choose
    Ambiguous,
    /// Anything the resolver does not recognize
    Unsupported,
}

pub trait ContentResolver {
    /// The one spelling of `item` that is stored in entries. Duplicates are
    /// found by comparing references, so two spellings of the same content
    /// must map to the same value.
    fn canonical(&self, item: &ContentRef) -> ContentRef {
        item.clone()
    }

    fn classify(&self, item: &ContentRef) -> ContentClass;

    /// Every non-container item anywhere below `container`, in canonical order
    fn descendant_leaves(&self, container: &ContentRef) -> Vec<ContentRef>;
}

impl<T: ContentResolver + ?Sized> ContentResolver for &T {
    fn canonical(&self, item: &ContentRef) -> ContentRef {
        (**self).canonical(item)
    }

    fn classify(&self, item: &ContentRef) -> ContentClass {
        (**self).classify(item)
    }

    fn descendant_leaves(&self, container: &ContentRef) -> Vec<ContentRef> {
        (**self).descendant_leaves(container)
    }
}

/// In-memory content tree.
///
/// Used by embedding hosts that already know their content layout, and by
/// tests. Containers are registered explicitly with their direct children.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    classes: HashMap<ContentRef, ContentClass>,
    children: HashMap<ContentRef, Vec<ContentRef>>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, item: ContentRef, class: ContentClass) {
        self.classes.insert(item, class);
    }

    pub fn with_asset(mut self, item: impl Into<ContentRef>) -> Self {
        self.insert(item.into(), ContentClass::Library(EntryVariant::Asset));
        self
    }

    pub fn with_macro(mut self, item: impl Into<ContentRef>) -> Self {
        self.insert(item.into(), ContentClass::Library(EntryVariant::Macro));
        self
    }

    pub fn with_ambiguous(mut self, item: impl Into<ContentRef>) -> Self {
        self.insert(item.into(), ContentClass::Ambiguous);
        self
    }

    pub fn with_live_instance(mut self, item: impl Into<ContentRef>) -> Self {
        self.insert(item.into(), ContentClass::LiveInstance);
        self
    }

    /// Register a container and its direct children. Children must be
    /// registered separately unless they are containers added later.
    pub fn with_container<I, C>(mut self, item: impl Into<ContentRef>, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContentRef>,
    {
        let item = item.into();
        self.insert(item.clone(), ContentClass::Container);
        self.children
            .insert(item, children.into_iter().map(Into::into).collect());
        self
    }

    fn collect_leaves(
        &self,
        container: &ContentRef,
        visited: &mut HashSet<ContentRef>,
        out: &mut Vec<ContentRef>,
    ) {
        if !visited.insert(container.clone()) {
            tracing::debug!("Container '{}' already expanded, skipping", container);
            return;
        }
        let Some(children) = self.children.get(container) else {
            return;
        };
        for child in children {
            match self.classify(child) {
                ContentClass::Container => self.collect_leaves(child, visited, out),
                _ => out.push(child.clone()),
            }
        }
    }
}

impl ContentResolver for InMemoryContent {
    fn classify(&self, item: &ContentRef) -> ContentClass {
        self.classes
            .get(item)
            .copied()
            .unwrap_or(ContentClass::Unsupported)
    }

    fn descendant_leaves(&self, container: &ContentRef) -> Vec<ContentRef> {
        let mut leaves = Vec::new();
        self.collect_leaves(container, &mut HashSet::new(), &mut leaves);
        leaves.sort();
        leaves.dedup();
        leaves
    }
}
