//! CLI Module
//!
//! Command-line interface for the sound archive.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sound Archive - play, edit and organise a personal audio archive
#[derive(Parser, Debug)]
#[command(name = "sound-archive")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Archive directory
    #[arg(short, long, global = true, env = "SOUND_ARCHIVE_DIR", default_value = "archive")]
    pub archive: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one or more sounds
    #[command(name = "play")]
    Play {
        /// Sounds to play, in order
        #[arg(required = true)]
        names: Vec<String>,

        /// Play all sounds at the same time instead of back to back
        #[arg(short, long)]
        parallel: bool,

        /// Start playback this many seconds in
        #[arg(long)]
        start: Option<f64>,

        /// Stop playback this many seconds in
        #[arg(long)]
        end: Option<f64>,

        /// Save the edited sound under this name
        #[arg(short, long)]
        save: Option<String>,

        /// Play backwards
        #[arg(long)]
        reverse: bool,

        /// Volume change in dB
        #[arg(long, allow_negative_numbers = true)]
        volume: Option<f32>,

        /// Playback speed factor
        #[arg(long)]
        speed: Option<f64>,
    },

    /// List every sound in the archive
    #[command(name = "list")]
    List,

    /// List sounds carrying any of the given tags
    #[command(name = "tags")]
    Tags {
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Find the sounds whose names are closest to a search string
    #[command(name = "search")]
    Search {
        target: String,

        /// Maximum number of results
        #[arg(short, default_value_t = 5)]
        n: usize,
    },

    /// Rename a sound
    #[command(name = "rename")]
    Rename { old_name: String, new_name: String },

    /// Add a sound file to the archive
    #[command(name = "add")]
    Add {
        path: PathBuf,

        /// Name in the archive (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        author: Option<String>,
    },

    /// Remove a sound and delete its file
    #[command(name = "remove")]
    Remove { name: String },

    /// Tag a sound
    #[command(name = "tag")]
    Tag { name: String, tag: String },

    /// Remove a tag from a sound
    #[command(name = "untag")]
    Untag { name: String, tag: String },

    /// Remove sounds whose files no longer exist
    #[command(name = "clean")]
    Clean,
}
