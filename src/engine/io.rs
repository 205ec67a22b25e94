//! WAV file I/O
//!
//! Decodes WAV files into raw [`SampleBuffer`]s and encodes them back.
//! Integer PCM is kept byte-exact; 32-bit float files are converted to
//! 16-bit integer PCM on import.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{decode_sample, encode_sample, SampleBuffer};
use crate::error::{ArchiveError, Result};

/// Read a WAV file into a [`SampleBuffer`]
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the bit depth has no byte-aligned PCM layout
pub fn read_wav(path: &Path) -> Result<SampleBuffer> {
    if !path.is_file() {
        return Err(ArchiveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let (frames, sample_width) = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => (collect_samples::<i8, _>(&mut reader, 1)?, 1),
        (SampleFormat::Int, 16) => (collect_samples::<i16, _>(&mut reader, 2)?, 2),
        (SampleFormat::Int, 24) => (collect_samples::<i32, _>(&mut reader, 3)?, 3),
        (SampleFormat::Int, 32) => (collect_samples::<i32, _>(&mut reader, 4)?, 4),
        (SampleFormat::Float, 32) => {
            let mut frames = Vec::with_capacity(reader.len() as usize * 2);
            for sample in reader.samples::<f32>() {
                let scaled = (sample? * 32767.0).round() as i64;
                let mut out = [0u8; 2];
                encode_sample(scaled, &mut out);
                frames.extend_from_slice(&out);
            }
            (frames, 2)
        }
        (format, bits) => {
            return Err(ArchiveError::UnsupportedFormat {
                format: format!("{}-bit {:?} WAV", bits, format),
            })
        }
    };

    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_width,
        frame_rate = spec.sample_rate,
        bytes = frames.len(),
        "decoded wav"
    );

    SampleBuffer::new(frames, spec.channels, sample_width, spec.sample_rate)
}

/// Write a [`SampleBuffer`] to a WAV file
pub fn write_wav(buffer: &SampleBuffer, path: &Path) -> Result<()> {
    let width = buffer.sample_width as usize;
    if !(1..=4).contains(&width) {
        return Err(ArchiveError::UnsupportedFormat {
            format: format!("{}-byte samples", width),
        });
    }

    let spec = WavSpec {
        channels: buffer.num_channels,
        sample_rate: buffer.frame_rate,
        bits_per_sample: buffer.sample_width * 8,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for bytes in buffer.frames.chunks_exact(width) {
        let value = decode_sample(bytes);
        match width {
            1 => writer.write_sample(value as i8)?,
            2 => writer.write_sample(value as i16)?,
            _ => writer.write_sample(value)?,
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Write a [`SampleBuffer`] so that `path` either holds the complete file or
/// is untouched
///
/// The file is written to a hidden sibling, finalized, then renamed into place.
pub fn write_wav_atomic(buffer: &SampleBuffer, path: &Path) -> Result<()> {
    let partial = partial_path(path);

    if let Err(e) = write_wav(buffer, &partial) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn partial_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4()))
}

/// Read every sample and append its little-endian bytes (`width` bytes each)
fn collect_samples<S, R>(reader: &mut WavReader<R>, width: usize) -> Result<Vec<u8>>
where
    S: hound::Sample + Into<i32>,
    R: std::io::Read,
{
    let mut frames = Vec::with_capacity(reader.len() as usize * width);
    let mut out = [0u8; 4];

    for sample in reader.samples::<S>() {
        let value: i32 = sample?.into();
        encode_sample(value as i64, &mut out[..width]);
        frames.extend_from_slice(&out[..width]);
    }

    Ok(frames)
}
