//! Effects engine
//!
//! Turns a sound file plus [`PlaybackOptions`] into a decoded [`SampleBuffer`].
//! Effects are applied in the order they are listed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::buffer::{decode_sample, encode_sample, SampleBuffer};
use crate::engine::io;
use crate::error::{ArchiveError, Result};

/// A single edit applied to decoded audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Play frames back to front
    Reverse,
    /// Scale every sample by a gain in decibels
    Volume { gain_db: f32 },
    /// Change playback speed (and pitch) by rescaling the frame rate
    Speed { factor: f64 },
}

/// Per-invocation playback configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    /// Effects to apply, in order
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Crop start in seconds
    pub start_sec: Option<f64>,
    /// Crop end in seconds
    pub end_sec: Option<f64>,
    /// Archive name to save the edited sound under
    pub save: Option<String>,
}

impl PlaybackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_crop(mut self, start_sec: Option<f64>, end_sec: Option<f64>) -> Self {
        self.start_sec = start_sec;
        self.end_sec = end_sec;
        self
    }

    pub fn with_save(mut self, name: impl Into<String>) -> Self {
        self.save = Some(name.into());
        self
    }

    /// True if a start or end bound was given
    pub fn has_crop(&self) -> bool {
        self.start_sec.is_some() || self.end_sec.is_some()
    }
}

/// Produces playable audio from a file and a set of options
pub trait EffectsEngine: Send + Sync {
    /// Decode `path` and apply `options`
    ///
    /// Must be deterministic for identical inputs.
    fn apply(&self, path: &Path, options: &PlaybackOptions) -> Result<SampleBuffer>;

    /// Whether [`apply`](Self::apply) already honours `start_sec`/`end_sec`
    ///
    /// When false the caller crops the returned buffer itself.
    fn applies_crop(&self) -> bool {
        false
    }
}

/// Effects engine for PCM WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEffectsEngine;

impl WavEffectsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl EffectsEngine for WavEffectsEngine {
    fn apply(&self, path: &Path, options: &PlaybackOptions) -> Result<SampleBuffer> {
        let mut buffer = io::read_wav(path)?;
        for effect in &options.effects {
            apply_effect(&mut buffer, effect)?;
        }
        Ok(buffer)
    }
}

/// Apply one effect to `buffer` in place
pub fn apply_effect(buffer: &mut SampleBuffer, effect: &Effect) -> Result<()> {
    match effect {
        Effect::Reverse => {
            let frame_size = buffer.frame_size();
            let reversed: Vec<u8> = buffer
                .frames
                .chunks_exact(frame_size)
                .rev()
                .flatten()
                .copied()
                .collect();
            buffer.frames = reversed;
        }
        Effect::Volume { gain_db } => {
            let width = buffer.sample_width as usize;
            if !(1..=4).contains(&width) {
                return Err(ArchiveError::UnsupportedFormat {
                    format: format!("{}-byte samples", width),
                });
            }
            let gain = 10.0_f64.powf(*gain_db as f64 / 20.0);
            for sample in buffer.frames.chunks_exact_mut(width) {
                let scaled = (decode_sample(sample) as f64 * gain).round() as i64;
                encode_sample(scaled, sample);
            }
        }
        Effect::Speed { factor } => {
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(ArchiveError::invalid_argument(format!(
                    "speed factor must be positive, got {}",
                    factor
                )));
            }
            let rate = (buffer.frame_rate as f64 * factor).round();
            if rate < 1.0 || rate > u32::MAX as f64 {
                return Err(ArchiveError::invalid_argument(format!(
                    "speed factor {} gives an unusable frame rate",
                    factor
                )));
            }
            buffer.frame_rate = rate as u32;
        }
    }
    Ok(())
}
