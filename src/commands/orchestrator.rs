//! Playback orchestration
//!
//! Resolves sounds, runs them through the effects engine and the crop
//! calculator, hands the result to the sink and optionally saves it back.
//!
//! Ordering rules:
//! - `last_played` is stamped as soon as a name resolves, before playback is
//!   issued, and is never reverted.
//! - `play_sequence` waits for each sound before issuing the next.
//! - `play_parallel` issues every sound before waiting on any, then waits in
//!   issuance order.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::archive::Storage;
use crate::commands::save::SaveCoordinator;
use crate::engine::effects::{EffectsEngine, PlaybackOptions};
use crate::engine::playback::{PlaybackHandle, PlaybackSink};
use crate::error::{ArchiveError, PlaybackFailure, Result};

/// Issues single, sequential and parallel playback requests
#[derive(Clone)]
pub struct PlaybackOrchestrator {
    storage: Arc<dyn Storage>,
    effects: Arc<dyn EffectsEngine>,
    sink: Arc<dyn PlaybackSink>,
    saver: SaveCoordinator,
}

impl PlaybackOrchestrator {
    pub fn new(
        storage: Arc<dyn Storage>,
        effects: Arc<dyn EffectsEngine>,
        sink: Arc<dyn PlaybackSink>,
        saver: SaveCoordinator,
    ) -> Self {
        Self {
            storage,
            effects,
            sink,
            saver,
        }
    }

    /// Start playing `name` and return without waiting
    ///
    /// If `options.save` is set the edited audio is saved once playback has
    /// been issued. Saving under the sound's own name replaces the original
    /// entry.
    ///
    /// # Errors
    /// * `NameNotFound` - `name` is not archived
    /// * `FileNotFound` - the archived file is gone (`last_played` is still updated)
    /// * `InvalidArgument` - crop bounds fall outside the sound
    /// * Any effects, sink or save error
    pub fn play_one(&self, name: &str, options: &PlaybackOptions) -> Result<PlaybackHandle> {
        let audio = self.storage.get_by_name(name)?;
        self.storage.update_last_played(name)?;

        if !audio.file_path.is_file() {
            return Err(ArchiveError::FileNotFound {
                path: audio.file_path,
            });
        }

        let mut buffer = self.effects.apply(&audio.file_path, options)?;
        if options.has_crop() && !self.effects.applies_crop() {
            buffer = buffer.cropped_secs(options.start_sec, options.end_sec)?;
        }
        debug!(
            name = %name,
            frames = buffer.frame_count(),
            secs = buffer.duration_secs(),
            "prepared sound"
        );

        let handle = self.sink.submit(&buffer)?;
        info!(name = %name, "playing sound");

        if let Some(target) = &options.save {
            if target == name {
                self.storage.remove_sound(name)?;
            }
            self.saver.save_audio(target, &buffer)?;
        }

        Ok(handle)
    }

    /// Play `name` and block until it has finished
    pub fn play_one_and_wait(&self, name: &str, options: &PlaybackOptions) -> Result<()> {
        self.play_one(name, options)?.wait_done()
    }

    /// Play `names` back to back
    ///
    /// Stops at the first failure; sounds already played stay played.
    ///
    /// # Errors
    /// * `UnsupportedOperation` - more than one name together with a save target
    pub fn play_sequence<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &PlaybackOptions,
    ) -> Result<()> {
        check_save_arity(names.len(), options)?;

        for name in names {
            self.play_one_and_wait(name.as_ref(), options)?;
        }
        Ok(())
    }

    /// Play `names` at the same time
    ///
    /// Every name is attempted even if an earlier one fails to start. All
    /// started handles are waited on in start order, and the call fails with
    /// `ParallelPlayback` if any name failed to start or finish.
    ///
    /// # Errors
    /// * `UnsupportedOperation` - more than one name together with a save target
    pub fn play_parallel<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &PlaybackOptions,
    ) -> Result<()> {
        check_save_arity(names.len(), options)?;

        let mut failures = Vec::new();
        let mut handles = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            match self.play_one(name, options) {
                Ok(handle) => handles.push((name, handle)),
                Err(error) => {
                    warn!(name = %name, error = %error, "sound failed to start");
                    failures.push(PlaybackFailure {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }

        for (name, handle) in handles {
            if let Err(error) = handle.wait_done() {
                warn!(name = %name, error = %error, "sound failed during playback");
                failures.push(PlaybackFailure {
                    name: name.to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ArchiveError::ParallelPlayback { failures })
        }
    }
}

fn check_save_arity(count: usize, options: &PlaybackOptions) -> Result<()> {
    if count > 1 && options.save.is_some() {
        return Err(ArchiveError::UnsupportedOperation {
            reason: format!("cannot save {} sounds at once", count),
        });
    }
    Ok(())
}
