//! Archive Storage Module
//!
//! The [`Storage`] trait is everything the command layer needs from the
//! archive. [`Library`] is the file-backed implementation.

pub mod library;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use library::Library;

/// One archived sound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Unique key within the archive
    pub name: String,
    /// Backing sound file
    pub file_path: PathBuf,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Last time playback of this sound was attempted
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl AudioMetadata {
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            author: None,
            tags: BTreeSet::new(),
            last_played: None,
        }
    }
}

impl fmt::Display for AudioMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(author) = &self.author {
            write!(f, " by {}", author)?;
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            write!(f, " [{}]", tags.join(", "))?;
        }
        match &self.last_played {
            Some(at) => write!(f, " (last played {})", at.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, " (never played)"),
        }
    }
}

/// Name-indexed sound archive
///
/// Methods take `&self`; implementations must tolerate concurrent reads and
/// `update_last_played` calls from several playback requests.
pub trait Storage: Send + Sync {
    /// Look up a sound by name
    ///
    /// # Errors
    /// * `NameNotFound` - no sound is archived under `name`
    fn get_by_name(&self, name: &str) -> Result<AudioMetadata>;

    /// Stamp the sound's `last_played` with the current time
    fn update_last_played(&self, name: &str) -> Result<()>;

    /// Add a sound file to the archive
    ///
    /// `name` defaults to the file stem.
    ///
    /// # Errors
    /// * `FileNotFound` - `path` is not a file
    /// * `NameAlreadyExists` - the name is taken
    /// * `InvalidArgument` - name or author exceeds the archive's limits
    fn add_sound(&self, path: &Path, name: Option<&str>, author: Option<&str>) -> Result<bool>;

    /// Remove a sound and delete its backing file
    fn remove_sound(&self, name: &str) -> Result<bool>;

    /// Re-key a sound
    ///
    /// # Errors
    /// * `NameNotFound` - `old_name` is not archived
    /// * `NameAlreadyExists` - `new_name` is taken
    fn rename(&self, old_name: &str, new_name: &str) -> Result<bool>;

    fn add_tag(&self, name: &str, tag: &str) -> Result<()>;

    fn remove_tag(&self, name: &str, tag: &str) -> Result<()>;

    fn get_all(&self) -> Result<Vec<AudioMetadata>>;

    /// Sounds carrying any of `tags`
    fn get_by_tags(&self, tags: &[String]) -> Result<Vec<AudioMetadata>>;

    /// Up to `n` sounds in non-descending edit distance from `target`
    fn fuzzy_search(&self, target: &str, n: usize) -> Result<Vec<AudioMetadata>>;

    /// Drop every sound whose backing file is missing and return them
    fn clean(&self) -> Result<Vec<AudioMetadata>>;
}
