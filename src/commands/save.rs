//! Save-back of edited audio
//!
//! The only path by which edited audio re-enters the archive. The WAV file is
//! fully written and renamed into place before the archive learns about it,
//! so a partial file is never indexed.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::archive::Storage;
use crate::engine::buffer::SampleBuffer;
use crate::engine::io;
use crate::error::{ArchiveError, Result};

/// Persists edited buffers as new archive entries
#[derive(Clone)]
pub struct SaveCoordinator {
    storage: Arc<dyn Storage>,
    staging_dir: PathBuf,
}

impl SaveCoordinator {
    /// # Arguments
    /// * `storage` - Archive that receives the saved sound
    /// * `staging_dir` - Directory where encoded files are written before registration
    pub fn new(storage: Arc<dyn Storage>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            staging_dir: staging_dir.into(),
        }
    }

    /// Staging path for `name`: `<staging_dir>/<encoded name>output.wav`
    ///
    /// Letters, digits, `-` and `_` are kept; every other character is
    /// percent-encoded byte by byte, so distinct names never share a file.
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.staging_dir.join(format!("{}output.wav", encode_stem(name)))
    }

    /// Encode `buffer` and add it to the archive as `name`
    ///
    /// # Errors
    /// * `NameAlreadyExists` - `name` is already archived; nothing is written
    /// * `Io` (`AlreadyExists`) - a file is already staged for `name`, possibly
    ///   still backing another entry; it is left untouched
    /// * Any encoding or storage error; the staged file is removed and
    ///   nothing is indexed
    pub fn save_audio(&self, name: &str, buffer: &SampleBuffer) -> Result<bool> {
        match self.storage.get_by_name(name) {
            Ok(_) => {
                return Err(ArchiveError::NameAlreadyExists {
                    name: name.to_string(),
                })
            }
            Err(ArchiveError::NameNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        fs::create_dir_all(&self.staging_dir)?;
        let staged = self.staging_path(name);
        if staged.exists() {
            return Err(ArchiveError::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} is already staged", staged.display()),
            )));
        }
        io::write_wav_atomic(buffer, &staged)?;

        if let Err(e) = self.storage.add_sound(&staged, Some(name), None) {
            let _ = fs::remove_file(&staged);
            return Err(e);
        }

        // Storage may have copied the file into its own layout.
        let stored = self.storage.get_by_name(name)?.file_path;
        if stored != staged {
            if let Err(e) = fs::remove_file(&staged) {
                warn!(path = %staged.display(), error = %e, "could not remove staged file");
            }
        }

        info!(name = %name, path = %stored.display(), "saved edited sound");
        Ok(true)
    }
}

fn encode_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            stem.push(c);
        } else {
            let mut utf8 = [0u8; 4];
            for byte in c.encode_utf8(&mut utf8).bytes() {
                stem.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    stem
}
