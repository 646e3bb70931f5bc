//! Palette Filesystem Layer
//!
//! Resolves dropped items against a project directory. Items are paths
//! relative to the project root, written with `/` separators.
//! - Directories are containers and expand into every file below them
//! - `scene://` references are live scene instances
//! - Files with a script extension may be an asset or a macro
//! - Every other file is an asset
//!
//! Hidden files and directories are ignored.

use anyhow::{Context, Result};
use palette_core::{ContentClass, ContentRef, ContentResolver, EntryVariant};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub struct FsContentResolver {
    root: PathBuf,
    script_extensions: Vec<String>,
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

impl FsContentResolver {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root {:?} is not accessible", root))?;
        Ok(Self {
            root,
            script_extensions: Vec::new(),
        })
    }

    pub fn with_script_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.script_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `item`, or `None` if it escapes the root or passes
    /// through something hidden
    fn path_of(&self, item: &ContentRef) -> Option<PathBuf> {
        let relative = Path::new(item.as_str());
        for component in relative.components() {
            match component {
                Component::Normal(name) if !is_hidden(name) => {}
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(self.root.join(relative))
    }

    /// Content reference for a path below the root
    pub fn content_ref(&self, path: &Path) -> Option<ContentRef> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(ContentRef::new(parts.join("/")))
    }

    fn is_script(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.script_extensions.iter().any(|s| *s == ext))
    }
}

impl ContentResolver for FsContentResolver {
    /// Drops `.` segments and repeated or trailing separators. Anything that
    /// leaves the root is returned as is and classified as unsupported.
    fn canonical(&self, item: &ContentRef) -> ContentRef {
        if item.is_scene_instance() {
            return item.clone();
        }
        let mut parts = Vec::new();
        for component in Path::new(item.as_str()).components() {
            match component {
                Component::Normal(name) => parts.push(name.to_string_lossy()),
                Component::CurDir => {}
                _ => return item.clone(),
            }
        }
        if parts.is_empty() {
            return item.clone();
        }
        ContentRef::new(parts.join("/"))
    }

    fn classify(&self, item: &ContentRef) -> ContentClass {
        if item.is_scene_instance() {
            return ContentClass::LiveInstance;
        }
        let Some(path) = self.path_of(item) else {
            return ContentClass::Unsupported;
        };
        if path.is_dir() {
            ContentClass::Container
        } else if !path.is_file() {
            tracing::debug!("'{}' does not exist under {:?}", item, self.root);
            ContentClass::Unsupported
        } else if self.is_script(&path) {
            ContentClass::Ambiguous
        } else {
            ContentClass::Library(EntryVariant::Asset)
        }
    }

    fn descendant_leaves(&self, container: &ContentRef) -> Vec<ContentRef> {
        let Some(path) = self.path_of(container) else {
            return Vec::new();
        };

        let visible = |entry: &DirEntry| entry.depth() == 0 || !is_hidden(entry.file_name());
        let mut leaves: Vec<ContentRef> = WalkDir::new(&path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(visible)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {:?}: {}", path, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.content_ref(entry.path()))
            .collect();
        leaves.sort();
        leaves
    }
}
