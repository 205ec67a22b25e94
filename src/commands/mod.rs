//! Archive Commands
//!
//! [`Commander`] is the public entry point: playback goes through the
//! [`PlaybackOrchestrator`], everything else is forwarded to storage.

pub mod orchestrator;
pub mod save;

use std::path::Path;
use std::sync::Arc;

use crate::archive::{AudioMetadata, Library, Storage};
use crate::engine::effects::{EffectsEngine, PlaybackOptions};
use crate::engine::playback::{PlaybackHandle, PlaybackSink};
use crate::error::Result;

pub use orchestrator::PlaybackOrchestrator;
pub use save::SaveCoordinator;

/// Applies commands to the audio archive
pub struct Commander {
    storage: Arc<dyn Storage>,
    orchestrator: PlaybackOrchestrator,
}

impl Commander {
    /// Wire a commander from its collaborators
    ///
    /// # Arguments
    /// * `storage` - The archive
    /// * `effects` - Decodes files and applies effects
    /// * `sink` - Plays decoded audio
    /// * `staging_dir` - Where edited sounds are written before being archived
    pub fn new(
        storage: Arc<dyn Storage>,
        effects: Arc<dyn EffectsEngine>,
        sink: Arc<dyn PlaybackSink>,
        staging_dir: &Path,
    ) -> Self {
        let saver = SaveCoordinator::new(Arc::clone(&storage), staging_dir);
        let orchestrator = PlaybackOrchestrator::new(Arc::clone(&storage), effects, sink, saver);
        Self {
            storage,
            orchestrator,
        }
    }

    /// Commander over a [`Library`], staging edits in the library's edits directory
    pub fn with_library(
        library: Library,
        effects: Arc<dyn EffectsEngine>,
        sink: Arc<dyn PlaybackSink>,
    ) -> Self {
        let staging_dir = library.config().edits_path();
        Self::new(Arc::new(library), effects, sink, &staging_dir)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Play a sound after applying effects; returns without waiting
    pub fn play_audio(&self, name: &str, options: &PlaybackOptions) -> Result<PlaybackHandle> {
        self.orchestrator.play_one(name, options)
    }

    /// Play a sound and wait for it to finish
    pub fn play_audio_wait(&self, name: &str, options: &PlaybackOptions) -> Result<()> {
        self.orchestrator.play_one_and_wait(name, options)
    }

    /// Play sounds back to back, in list order
    pub fn play_sequence<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &PlaybackOptions,
    ) -> Result<()> {
        self.orchestrator.play_sequence(names, options)
    }

    /// Play sounds simultaneously
    pub fn play_parallel<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &PlaybackOptions,
    ) -> Result<()> {
        self.orchestrator.play_parallel(names, options)
    }

    // ========================================================================
    // Archive pass-through
    // ========================================================================

    pub fn get_sounds(&self) -> Result<Vec<AudioMetadata>> {
        self.storage.get_all()
    }

    pub fn get_by_tags(&self, tags: &[String]) -> Result<Vec<AudioMetadata>> {
        self.storage.get_by_tags(tags)
    }

    /// Up to `n` sounds closest to `target` by edit distance
    pub fn fuzzy_search(&self, target: &str, n: usize) -> Result<Vec<AudioMetadata>> {
        self.storage.fuzzy_search(target, n)
    }

    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<bool> {
        self.storage.rename(old_name, new_name)
    }

    pub fn add_sound(&self, path: &Path, name: Option<&str>, author: Option<&str>) -> Result<bool> {
        self.storage.add_sound(path, name, author)
    }

    /// Remove a sound and its file
    pub fn remove_sound(&self, name: &str) -> Result<bool> {
        self.storage.remove_sound(name)
    }

    pub fn add_tag(&self, name: &str, tag: &str) -> Result<()> {
        self.storage.add_tag(name, tag)
    }

    pub fn remove_tag(&self, name: &str, tag: &str) -> Result<()> {
        self.storage.remove_tag(name, tag)
    }

    /// Remove sounds whose files are missing; returns what was removed
    pub fn clean(&self) -> Result<Vec<AudioMetadata>> {
        self.storage.clean()
    }
}
