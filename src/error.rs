//! Error handling for the sound archive
//!
//! Every failure names the sound, path or argument that caused it so
//! callers can decide whether to retry or abort a batch.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// One failed sound inside a parallel playback request
#[derive(Debug)]
pub struct PlaybackFailure {
    /// Name of the sound that failed
    pub name: String,
    /// What went wrong
    pub error: ArchiveError,
}

impl fmt::Display for PlaybackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.name, self.error)
    }
}

/// Main error type for archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    // Archive Errors
    #[error("Sound not found in archive: {name}")]
    NameNotFound { name: String },

    #[error("Sound already exists in archive: {name}")]
    NameAlreadyExists { name: String },

    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    // Argument Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },

    // Audio Errors
    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Playback Errors
    #[error("Playback failed: {reason}")]
    Playback { reason: String },

    #[error(
        "Parallel playback failed for {} sound(s): {}",
        failures.len(),
        join_failures(failures)
    )]
    ParallelPlayback { failures: Vec<PlaybackFailure> },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join_failures(failures: &[PlaybackFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<hound::Error> for ArchiveError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => ArchiveError::Io(e),
            hound::Error::Unsupported => ArchiveError::UnsupportedFormat {
                format: "WAV variant not supported by the codec".to_string(),
            },
            other => ArchiveError::InvalidAudio {
                reason: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl ArchiveError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        ArchiveError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ArchiveError::NameNotFound { .. } => "NAME_NOT_FOUND",
            ArchiveError::NameAlreadyExists { .. } => "NAME_ALREADY_EXISTS",
            ArchiveError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ArchiveError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ArchiveError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            ArchiveError::InvalidAudio { .. } => "INVALID_AUDIO",
            ArchiveError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ArchiveError::Playback { .. } => "PLAYBACK_ERROR",
            ArchiveError::ParallelPlayback { .. } => "PARALLEL_PLAYBACK_ERROR",
            ArchiveError::Io(_) => "IO_ERROR",
            ArchiveError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ArchiveError::NameNotFound { .. } => {
                Some("Run 'sound-archive search <name>' to find the closest match.")
            }
            ArchiveError::NameAlreadyExists { .. } => {
                Some("Pick a different name or remove the existing sound first.")
            }
            ArchiveError::FileNotFound { .. } => Some(
                "The file may have been moved. Run 'sound-archive clean' to drop stale entries.",
            ),
            ArchiveError::UnsupportedOperation { .. } => {
                Some("Save one sound at a time.")
            }
            ArchiveError::InvalidAudio { .. } | ArchiveError::UnsupportedFormat { .. } => {
                Some("Convert the file to 8, 16, 24 or 32-bit PCM WAV.")
            }
            _ => None,
        }
    }
}
