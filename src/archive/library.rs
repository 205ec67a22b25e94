//! File-backed archive
//!
//! The index lives in `<root>/library.json` and is rewritten after every
//! mutation. Added sounds are copied into `<root>/sounds/` under a generated
//! file name so renames never touch the file system.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::archive::{AudioMetadata, Storage};
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};

/// Persisted archive index, keyed by sound name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryIndex {
    pub sounds: BTreeMap<String, AudioMetadata>,
}

/// Archive stored in a directory on disk.
pub struct Library {
    config: ArchiveConfig,
    index: Mutex<LibraryIndex>,
}

impl Library {
    /// Open the archive described by `config`, creating an empty index if
    /// none exists yet.
    pub fn open(config: ArchiveConfig) -> Result<Self> {
        let index_path = config.index_path();
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            serde_json::from_str(&content)?
        } else {
            LibraryIndex::default()
        };

        Ok(Self {
            config,
            index: Mutex::new(index),
        })
    }

    /// Open the archive rooted at `root`, reading its `config.json` if present.
    pub fn open_dir(root: &Path) -> Result<Self> {
        Self::open(ArchiveConfig::load(root)?)
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, LibraryIndex> {
        self.index.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persist `index` atomically, then make it the live index.
    fn commit(&self, guard: &mut MutexGuard<'_, LibraryIndex>, index: LibraryIndex) -> Result<()> {
        fs::create_dir_all(&self.config.root)?;

        let path = self.config.index_path();
        let partial = path.with_extension("json.part");
        let content = serde_json::to_string_pretty(&index)?;
        fs::write(&partial, content)?;
        fs::rename(&partial, &path)?;

        **guard = index;
        Ok(())
    }

    fn check_len(what: &str, value: &str, max: usize) -> Result<()> {
        let len = value.chars().count();
        if len == 0 {
            return Err(ArchiveError::invalid_argument(format!("{} must not be empty", what)));
        }
        if len > max {
            return Err(ArchiveError::invalid_argument(format!(
                "{} is {} characters long (maximum {})",
                what, len, max
            )));
        }
        Ok(())
    }

    fn stored_path(&self, source: &Path) -> PathBuf {
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "wav".to_string());
        self.config
            .sounds_path()
            .join(format!("{}.{}", uuid::Uuid::new_v4(), extension))
    }
}

fn missing(name: &str) -> ArchiveError {
    ArchiveError::NameNotFound {
        name: name.to_string(),
    }
}

impl Storage for Library {
    fn get_by_name(&self, name: &str) -> Result<AudioMetadata> {
        self.lock().sounds.get(name).cloned().ok_or_else(|| missing(name))
    }

    fn update_last_played(&self, name: &str) -> Result<()> {
        let mut guard = self.lock();
        let mut index = guard.clone();
        let entry = index.sounds.get_mut(name).ok_or_else(|| missing(name))?;
        entry.last_played = Some(Utc::now());
        self.commit(&mut guard, index)
    }

    fn add_sound(&self, path: &Path, name: Option<&str>, author: Option<&str>) -> Result<bool> {
        if !path.is_file() {
            return Err(ArchiveError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        };
        Self::check_len("name", &name, self.config.max_name_len)?;
        if let Some(author) = author {
            Self::check_len("author", author, self.config.max_author_len)?;
        }

        let mut guard = self.lock();
        if guard.sounds.contains_key(&name) {
            return Err(ArchiveError::NameAlreadyExists { name });
        }

        let stored = self.stored_path(path);
        fs::create_dir_all(self.config.sounds_path())?;
        fs::copy(path, &stored)?;

        let mut metadata = AudioMetadata::new(name.clone(), stored.clone());
        metadata.author = author.map(str::to_string);

        let mut index = guard.clone();
        index.sounds.insert(name.clone(), metadata);
        if let Err(e) = self.commit(&mut guard, index) {
            let _ = fs::remove_file(&stored);
            return Err(e);
        }

        info!(name = %name, path = %stored.display(), "added sound");
        Ok(true)
    }

    fn remove_sound(&self, name: &str) -> Result<bool> {
        let mut guard = self.lock();
        let mut index = guard.clone();
        let removed = index.sounds.remove(name).ok_or_else(|| missing(name))?;
        self.commit(&mut guard, index)?;

        match fs::remove_file(&removed.file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %removed.file_path.display(),
                error = %e,
                "could not delete sound file"
            ),
        }

        info!(name = %name, "removed sound");
        Ok(true)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> Result<bool> {
        Self::check_len("name", new_name, self.config.max_name_len)?;

        let mut guard = self.lock();
        if !guard.sounds.contains_key(old_name) {
            return Err(missing(old_name));
        }
        if guard.sounds.contains_key(new_name) {
            return Err(ArchiveError::NameAlreadyExists {
                name: new_name.to_string(),
            });
        }

        let mut index = guard.clone();
        if let Some(mut entry) = index.sounds.remove(old_name) {
            entry.name = new_name.to_string();
            index.sounds.insert(new_name.to_string(), entry);
        }
        self.commit(&mut guard, index)?;

        info!(from = %old_name, to = %new_name, "renamed sound");
        Ok(true)
    }

    fn add_tag(&self, name: &str, tag: &str) -> Result<()> {
        Self::check_len("tag", tag, self.config.max_tag_len)?;

        let mut guard = self.lock();
        let mut index = guard.clone();
        let entry = index.sounds.get_mut(name).ok_or_else(|| missing(name))?;
        entry.tags.insert(tag.to_string());
        self.commit(&mut guard, index)
    }

    fn remove_tag(&self, name: &str, tag: &str) -> Result<()> {
        let mut guard = self.lock();
        let mut index = guard.clone();
        let entry = index.sounds.get_mut(name).ok_or_else(|| missing(name))?;
        if !entry.tags.remove(tag) {
            return Ok(());
        }
        self.commit(&mut guard, index)
    }

    fn get_all(&self) -> Result<Vec<AudioMetadata>> {
        Ok(self.lock().sounds.values().cloned().collect())
    }

    fn get_by_tags(&self, tags: &[String]) -> Result<Vec<AudioMetadata>> {
        Ok(self
            .lock()
            .sounds
            .values()
            .filter(|meta| tags.iter().any(|tag| meta.tags.contains(tag)))
            .cloned()
            .collect())
    }

    fn fuzzy_search(&self, target: &str, n: usize) -> Result<Vec<AudioMetadata>> {
        let guard = self.lock();
        let mut ranked: Vec<(usize, &AudioMetadata)> = guard
            .sounds
            .values()
            .map(|meta| (strsim::levenshtein(target, &meta.name), meta))
            .collect();

        // BTreeMap iteration is already name ordered, so a stable sort keeps
        // ties alphabetical.
        ranked.sort_by_key(|(distance, _)| *distance);

        Ok(ranked
            .into_iter()
            .take(n)
            .map(|(_, meta)| meta.clone())
            .collect())
    }

    fn clean(&self) -> Result<Vec<AudioMetadata>> {
        let mut guard = self.lock();
        let mut index = guard.clone();

        let stale: Vec<String> = index
            .sounds
            .values()
            .filter(|meta| !meta.file_path.is_file())
            .map(|meta| meta.name.clone())
            .collect();
        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let removed: Vec<AudioMetadata> = stale
            .iter()
            .filter_map(|name| index.sounds.remove(name))
            .collect();
        self.commit(&mut guard, index)?;

        info!(count = removed.len(), "cleaned sounds with missing files");
        Ok(removed)
    }
}
