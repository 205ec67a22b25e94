//! Crop Calculator
//!
//! Converts time bounds into fractional positions and slices raw PCM bytes
//! by fractional position. Every computed boundary is a multiple of the
//! frame size, so a crop never splits a sample or a frame across channels.

use crate::error::{ArchiveError, Result};

/// Convert optional start/end times in seconds into fractional positions
///
/// Total duration is `len(frames) / (sample_rate * bytes_per_sample * num_channels)`.
/// A missing start maps to `0.0` and a missing end to `1.0`. Values are not
/// validated here; out of range positions are rejected by [`crop`].
///
/// # Arguments
/// * `frames` - Raw interleaved sample bytes
/// * `bytes_per_sample` - Bytes per sample per channel
/// * `num_channels` - Number of interleaved channels
/// * `sample_rate` - Frames per second
/// * `start_sec` - Start of the crop in seconds
/// * `end_sec` - End of the crop in seconds
///
/// # Returns
/// `(start_percent, end_percent)`
pub fn time_to_percent(
    frames: &[u8],
    bytes_per_sample: usize,
    num_channels: usize,
    sample_rate: u32,
    start_sec: Option<f64>,
    end_sec: Option<f64>,
) -> (f64, f64) {
    let bytes_per_second = sample_rate as f64 * bytes_per_sample as f64 * num_channels as f64;
    let total_duration_secs = frames.len() as f64 / bytes_per_second;

    let start_percent = start_sec.map_or(0.0, |s| s / total_duration_secs);
    let end_percent = end_sec.map_or(1.0, |s| s / total_duration_secs);

    (start_percent, end_percent)
}

/// Slice `frames` between two fractional positions
///
/// Boundaries are `floor(p * frame_count) * frame_size`. An empty slice is a
/// valid result when both boundaries floor to the same frame.
///
/// # Errors
/// * `InvalidArgument` - a position outside `[0, 1]` (including NaN), `start >= end`,
///   or a zero frame size
pub fn crop(
    frames: &[u8],
    bytes_per_sample: usize,
    num_channels: usize,
    start_percent: Option<f64>,
    end_percent: Option<f64>,
) -> Result<&[u8]> {
    let start_percent = start_percent.unwrap_or(0.0);
    let end_percent = end_percent.unwrap_or(1.0);

    let unit = 0.0..=1.0;
    if !unit.contains(&start_percent) || !unit.contains(&end_percent) {
        return Err(ArchiveError::invalid_argument(format!(
            "start and end percent must be between 0 and 1 (got {} and {})",
            start_percent, end_percent
        )));
    }
    if start_percent >= end_percent {
        return Err(ArchiveError::invalid_argument(format!(
            "start ({}) must be less than end ({})",
            start_percent, end_percent
        )));
    }

    let frame_size = bytes_per_sample * num_channels;
    if frame_size == 0 {
        return Err(ArchiveError::invalid_argument(
            "bytes per sample and channel count must be positive",
        ));
    }

    let frame_count = frames.len() / frame_size;
    let frame_index = |percent: f64| (percent * frame_count as f64).floor() as usize * frame_size;

    let start_index = frame_index(start_percent);
    let end_index = frame_index(end_percent);

    tracing::debug!(
        start_index,
        end_index,
        total = frames.len(),
        "cropping sample buffer"
    );

    Ok(&frames[start_index..end_index])
}
