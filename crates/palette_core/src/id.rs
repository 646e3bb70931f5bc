//! Identity tokens and content references
//!
//! Every folder and entry carries a `NodeId` that is assigned once and never
//! reused. External content is addressed through an opaque `ContentRef`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identity token of a folder or entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh, never before used token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Scheme used by references to live scene instances
pub const SCENE_SCHEME: &str = "scene://";

/// Opaque identifier of one external content item.
///
/// For project content this is a project-relative path using `/` separators
/// (e.g. `Assets/Props/chair.prefab`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for references that point at an instance living in an open scene
    pub fn is_scene_instance(&self) -> bool {
        self.0.starts_with(SCENE_SCHEME)
    }

    /// Name shown for an entry referencing this content: the last path
    /// segment without its extension.
    pub fn display_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        let file_name = trimmed.rsplit('/').next().unwrap_or(trimmed);
        match file_name.find('.') {
            Some(0) | None => file_name,
            Some(dot) => &file_name[..dot],
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_node_id_text_roundtrip() {
        let id = NodeId::new();
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-token".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(ContentRef::from("Assets/Props/chair.prefab").display_name(), "chair");
        assert_eq!(ContentRef::from("Assets/Props/rock.mesh.json").display_name(), "rock");
        assert_eq!(ContentRef::from("Assets/Props/").display_name(), "Props");
        assert_eq!(ContentRef::from("readme").display_name(), "readme");
        assert_eq!(ContentRef::from("Assets/.hidden").display_name(), ".hidden");
    }

    #[test]
    fn test_scene_instance_detection() {
        assert!(ContentRef::from("scene://Level01/Chair (3)").is_scene_instance());
        assert!(!ContentRef::from("Assets/chair.prefab").is_scene_instance());
    }
}
