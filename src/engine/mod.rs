//! Audio Engine Module
//!
//! Everything that touches sample data:
//! - Sample buffers and PCM sample encoding
//! - Crop calculation
//! - WAV file I/O
//! - Effects engine
//! - Playback sinks

pub mod buffer;
pub mod crop;
pub mod effects;
pub mod io;
pub mod playback;

pub use buffer::SampleBuffer;
pub use crop::{crop, time_to_percent};
pub use effects::{Effect, EffectsEngine, PlaybackOptions, WavEffectsEngine};
pub use io::{read_wav, write_wav, write_wav_atomic};
#[cfg(feature = "device-output")]
pub use playback::DeviceSink;
pub use playback::{ClockSink, PlaybackHandle, PlaybackSink};
