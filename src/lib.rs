//! Sound Archive - Personal Audio Archive
//!
//! Plays archived sounds through a chain of effects and an optional time
//! crop, and can save the edited result back into the archive.
//!
//! # Architecture
//!
//! - `engine`: sample buffers, crop calculation, WAV I/O, effects, playback sinks
//! - `archive`: the storage contract and a file-backed library
//! - `commands`: playback orchestration, save-back and the `Commander` facade

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;

pub use commands::Commander;
pub use error::{ArchiveError, Result};
