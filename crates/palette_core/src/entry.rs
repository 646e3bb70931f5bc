//! Palette entries
//!
//! An entry is a leaf of the collection tree that references one external
//! content item. Variants are serialized with an explicit `type` tag so new
//! kinds can be added without breaking stored collections.

use crate::id::{ContentRef, NodeId};
use serde::{Deserialize, Serialize};

/// Which variant an accepted item becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryVariant {
    /// Plain reference to a piece of content
    Asset,
    /// Reference to a script that is run when the entry is opened
    Macro,
}

impl EntryVariant {
    pub fn display_name(&self) -> &'static str {
        match self {
            EntryVariant::Asset => "Asset",
            EntryVariant::Macro => "Macro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Asset { reference: ContentRef },
    Macro { script: ContentRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: NodeId,
    #[serde(flatten)]
    kind: EntryKind,
}

impl Entry {
    pub fn new(variant: EntryVariant, content: ContentRef) -> Self {
        let kind = match variant {
            EntryVariant::Asset => EntryKind::Asset { reference: content },
            EntryVariant::Macro => EntryKind::Macro { script: content },
        };
        Self { id: NodeId::new(), kind }
    }

    pub fn asset(reference: impl Into<ContentRef>) -> Self {
        Self::new(EntryVariant::Asset, reference.into())
    }

    pub fn macro_script(script: impl Into<ContentRef>) -> Self {
        Self::new(EntryVariant::Macro, script.into())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn variant(&self) -> EntryVariant {
        match self.kind {
            EntryKind::Asset { .. } => EntryVariant::Asset,
            EntryKind::Macro { .. } => EntryVariant::Macro,
        }
    }

    /// The content item this entry points at, whatever its variant
    pub fn content(&self) -> &ContentRef {
        match &self.kind {
            EntryKind::Asset { reference } => reference,
            EntryKind::Macro { script } => script,
        }
    }

    /// Derived from the referenced content, never stored
    pub fn display_name(&self) -> &str {
        self.content().display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_variants() {
        let asset = Entry::asset("Assets/Props/chair.prefab");
        assert_eq!(asset.variant(), EntryVariant::Asset);
        assert_eq!(asset.display_name(), "chair");

        let script = Entry::macro_script("Scripts/bake_lights.rhai");
        assert_eq!(script.variant(), EntryVariant::Macro);
        assert_eq!(script.content().as_str(), "Scripts/bake_lights.rhai");
        assert_ne!(asset.id(), script.id());
    }

    #[test]
    fn test_entry_serialized_shape() {
        let entry = Entry::macro_script("Scripts/bake_lights.rhai");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "macro");
        assert_eq!(json["script"], "Scripts/bake_lights.rhai");
        assert_eq!(json["id"], entry.id().to_string());

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
