//! Archive configuration
//!
//! Settings live in `<root>/config.json`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the configuration file inside the archive root.
pub const CONFIG_FILE: &str = "config.json";
/// Name of the archive index file inside the archive root.
pub const INDEX_FILE: &str = "library.json";

/// Archive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Archive root directory (not serialized).
    #[serde(skip)]
    pub root: PathBuf,

    /// Maximum sound name length in characters.
    pub max_name_len: usize,

    /// Maximum author length in characters.
    pub max_author_len: usize,

    /// Maximum tag length in characters.
    pub max_tag_len: usize,

    /// Directory (relative to root) holding archived sound files.
    pub sounds_dir: String,

    /// Directory (relative to root) where edited sounds are staged before
    /// being added to the archive.
    pub edits_dir: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("archive"),
            max_name_len: 64,
            max_author_len: 64,
            max_tag_len: 32,
            sounds_dir: "sounds".to_string(),
            edits_dir: "edits".to_string(),
        }
    }
}

impl ArchiveConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Load the configuration for the archive at `root`.
    ///
    /// Falls back to defaults if `config.json` does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::with_root(root));
        }

        let content = fs::read_to_string(&path)?;
        let mut config: ArchiveConfig = serde_json::from_str(&content)?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn sounds_path(&self) -> PathBuf {
        self.root.join(&self.sounds_dir)
    }

    pub fn edits_path(&self) -> PathBuf {
        self.root.join(&self.edits_dir)
    }
}
