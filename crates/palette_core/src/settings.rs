//! App data directories and persisted palette settings
//
// Settings live in `<config_dir>/palette.toml`, the personal collection and
// logs under the data directory.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::reference_path::ReferencePath;
use crate::sort::SortMode;
use crate::store::CollectionSource;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "palette.toml";
pub const PERSONAL_COLLECTION_FILE_NAME: &str = "personal_palette.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub settings_file: PathBuf,
    pub personal_collection_file: PathBuf,
}

impl AppPaths {
    /// Platform app data locations
    pub fn from_project_dirs() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "Pulsar", "Asset_Palette")
            .context("Could not determine app data directory")?;
        Ok(Self::with_dirs(
            proj_dirs.data_dir().to_path_buf(),
            proj_dirs.config_dir().to_path_buf(),
        ))
    }

    /// Everything under a single root, for tests and portable installs
    pub fn at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::with_dirs(root.join("data"), root.join("config"))
    }

    fn with_dirs(data_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            logs_dir: data_dir.join("logs"),
            settings_file: config_dir.join(SETTINGS_FILE_NAME),
            personal_collection_file: data_dir.join(PERSONAL_COLLECTION_FILE_NAME),
            data_dir,
            config_dir,
        }
    }
}

fn default_script_extensions() -> Vec<String> {
    ["rs", "rhai", "lua"].into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub sort_mode: SortMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_folder: Option<ReferencePath>,
    /// Files with these extensions could be either an asset or a macro
    pub script_extensions: Vec<String>,
    pub history_limit: usize,
    // Kept last: toml writes tables after plain values
    pub current_collection: CollectionSource,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            active_folder: None,
            script_extensions: default_script_extensions(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            current_collection: CollectionSource::default(),
        }
    }
}

impl PaletteSettings {
    /// Read settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read settings {:?}: {}", path, e);
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Malformed settings {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write settings {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::reference_path::PathTarget;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under_root() {
        let paths = AppPaths::at("/tmp/palette");
        assert_eq!(paths.settings_file, PathBuf::from("/tmp/palette/config/palette.toml"));
        assert_eq!(
            paths.personal_collection_file,
            PathBuf::from("/tmp/palette/data/personal_palette.json")
        );
        assert_eq!(paths.logs_dir, PathBuf::from("/tmp/palette/data/logs"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = PaletteSettings::load(&temp_dir.path().join("palette.toml"));
        assert_eq!(settings, PaletteSettings::default());
        assert_eq!(settings.script_extensions, vec!["rs", "rhai", "lua"]);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config").join("palette.toml");
        let settings = PaletteSettings {
            sort_mode: SortMode::ByKind,
            active_folder: Some(ReferencePath::new(PathTarget::Folder, vec![NodeId::new(), NodeId::new()])),
            script_extensions: vec!["py".to_string()],
            history_limit: 8,
            current_collection: CollectionSource::File(temp_dir.path().join("Props.json")),
        };
        settings.save(&path).unwrap();
        assert_eq!(PaletteSettings::load(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("palette.toml");
        fs::write(&path, "sort_mode = \"alphabetical\"\n").unwrap();
        let settings = PaletteSettings::load(&path);
        assert_eq!(settings.sort_mode, SortMode::Alphabetical);
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(settings.current_collection, CollectionSource::Personal);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("palette.toml");
        fs::write(&path, "sort_mode = [").unwrap();
        assert_eq!(PaletteSettings::load(&path), PaletteSettings::default());
    }
}
