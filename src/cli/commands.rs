//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::archive::{AudioMetadata, Library};
use crate::cli::Commands;
use crate::commands::Commander;
use crate::engine::effects::{Effect, PlaybackOptions, WavEffectsEngine};
use crate::engine::playback::PlaybackSink;
use crate::error::Result;

/// Open the archive at `root` with the default effects engine and sink.
pub fn open_commander(root: &Path) -> Result<Commander> {
    info!("Opening archive: {}", root.display());
    let library = Library::open_dir(root)?;
    Ok(Commander::with_library(
        library,
        Arc::new(WavEffectsEngine::new()),
        default_sink(),
    ))
}

#[cfg(feature = "device-output")]
fn default_sink() -> Arc<dyn PlaybackSink> {
    Arc::new(crate::engine::playback::DeviceSink::new())
}

#[cfg(not(feature = "device-output"))]
fn default_sink() -> Arc<dyn PlaybackSink> {
    Arc::new(crate::engine::playback::ClockSink::new())
}

/// Run one parsed command against `commander`.
pub fn run(commander: &Commander, command: Commands) -> Result<()> {
    match command {
        Commands::Play {
            names,
            parallel,
            start,
            end,
            save,
            reverse,
            volume,
            speed,
        } => {
            let options = build_options(start, end, save, reverse, volume, speed);
            play(commander, &names, parallel, &options)
        }
        Commands::List => {
            print_sounds(&commander.get_sounds()?);
            Ok(())
        }
        Commands::Tags { tags } => {
            print_sounds(&commander.get_by_tags(&tags)?);
            Ok(())
        }
        Commands::Search { target, n } => {
            print_sounds(&commander.fuzzy_search(&target, n)?);
            Ok(())
        }
        Commands::Rename { old_name, new_name } => {
            commander.rename(&old_name, &new_name)?;
            println!("Renamed '{}' to '{}'", old_name, new_name);
            Ok(())
        }
        Commands::Add { path, name, author } => {
            commander.add_sound(&path, name.as_deref(), author.as_deref())?;
            println!("Added: {}", path.display());
            Ok(())
        }
        Commands::Remove { name } => {
            commander.remove_sound(&name)?;
            println!("Removed: {}", name);
            Ok(())
        }
        Commands::Tag { name, tag } => {
            commander.add_tag(&name, &tag)?;
            println!("Tagged '{}' with '{}'", name, tag);
            Ok(())
        }
        Commands::Untag { name, tag } => {
            commander.remove_tag(&name, &tag)?;
            println!("Removed tag '{}' from '{}'", tag, name);
            Ok(())
        }
        Commands::Clean => {
            let removed = commander.clean()?;
            if removed.is_empty() {
                println!("Nothing to clean.");
            } else {
                println!("Removed {} sound(s) with missing files:", removed.len());
                print_sounds(&removed);
            }
            Ok(())
        }
    }
}

/// Translate play flags into [`PlaybackOptions`].
///
/// Effects run in a fixed order: speed, volume, reverse.
pub fn build_options(
    start: Option<f64>,
    end: Option<f64>,
    save: Option<String>,
    reverse: bool,
    volume: Option<f32>,
    speed: Option<f64>,
) -> PlaybackOptions {
    let mut options = PlaybackOptions::new().with_crop(start, end);
    if let Some(factor) = speed {
        options = options.with_effect(Effect::Speed { factor });
    }
    if let Some(gain_db) = volume {
        options = options.with_effect(Effect::Volume { gain_db });
    }
    if reverse {
        options = options.with_effect(Effect::Reverse);
    }
    options.save = save;
    options
}

fn play(
    commander: &Commander,
    names: &[String],
    parallel: bool,
    options: &PlaybackOptions,
) -> Result<()> {
    if parallel {
        info!("Playing {} sound(s) in parallel", names.len());
        commander.play_parallel(names, options)?;
    } else {
        info!("Playing {} sound(s) in sequence", names.len());
        commander.play_sequence(names, options)?;
    }

    if let Some(target) = &options.save {
        println!("Saved edited sound as '{}'", target);
    }
    Ok(())
}

fn print_sounds(sounds: &[AudioMetadata]) {
    if sounds.is_empty() {
        println!("No sounds found.");
        return;
    }
    for sound in sounds {
        println!("{}", sound);
    }
}
