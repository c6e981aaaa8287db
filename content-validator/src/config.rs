//! Configuration for a validation run.
//!
//! Layout defaults follow the conventional project tree:
//!
//! ```text
//! <root>/config/categories.json
//! <root>/config/media-types.json
//! <root>/config/languages.json   (translation check only)
//! <root>/config/app.json         (schema check only)
//! <root>/data/<category>.json    (reference lists)
//! <root>/data/...                (item collections, via `dataFile`)
//! <root>/lang/<code>.json        (translation check only)
//! ```

use std::path::{Path, PathBuf};

/// Options for one validation pass over a project directory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidationConfig {
    /// Project root. Every other path is relative to it.
    pub root: PathBuf,
    /// Directory holding the configuration documents (default: `config`).
    pub config_dir: PathBuf,
    /// Directory holding reference lists and item collections (default: `data`).
    pub data_dir: PathBuf,
    /// Directory holding translation files (default: `lang`).
    pub lang_dir: PathBuf,
    /// Category document name inside `config_dir` (default: `categories.json`).
    pub categories_file: String,
    /// Media-type document name inside `config_dir` (default: `media-types.json`).
    pub media_types_file: String,
    /// Maximum size of any single file in bytes (default: 10 MB).
    pub max_file_size: u64,
    /// Syntax-check every JSON file under the config, data and translation
    /// directories, and report data files nothing claims (default: on).
    pub sweep_files: bool,
    /// Glob patterns excluded from the sweep.
    pub exclude: Vec<String>,
    /// Check translation files for missing keys (default: off).
    pub check_translations: bool,
    /// Check display attributes, `app.json` and required item fields
    /// (default: off).
    pub check_schema: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            config_dir: PathBuf::from("config"),
            data_dir: PathBuf::from("data"),
            lang_dir: PathBuf::from("lang"),
            categories_file: "categories.json".to_owned(),
            media_types_file: "media-types.json".to_owned(),
            max_file_size: 10_485_760,
            sweep_files: true,
            exclude: Vec::new(),
            check_translations: false,
            check_schema: false,
        }
    }
}

impl ValidationConfig {
    /// Default configuration rooted at `root`.
    #[must_use]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Absolute (root-joined) form of a project-relative path.
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub(crate) fn categories_path(&self) -> PathBuf {
        self.config_dir.join(&self.categories_file)
    }

    pub(crate) fn media_types_path(&self) -> PathBuf {
        self.config_dir.join(&self.media_types_file)
    }

    pub(crate) fn languages_path(&self) -> PathBuf {
        self.config_dir.join("languages.json")
    }

    pub(crate) fn app_path(&self) -> PathBuf {
        self.config_dir.join("app.json")
    }
}
