//! Sample Buffer
//!
//! Decoded PCM payload handed between the effects engine, the crop
//! calculator and the playback sink. Frames are kept as raw interleaved
//! little-endian bytes, the same layout the WAV container stores.

use crate::engine::crop;
use crate::error::{ArchiveError, Result};

// ============================================================================
// Sample encoding
// ============================================================================

/// Smallest and largest signed value a sample of `width` bytes can hold
pub fn sample_range(width: usize) -> (i32, i32) {
    match width {
        1 => (i8::MIN as i32, i8::MAX as i32),
        2 => (i16::MIN as i32, i16::MAX as i32),
        3 => (-(1 << 23), (1 << 23) - 1),
        _ => (i32::MIN, i32::MAX),
    }
}

/// Decode one little-endian PCM sample into a signed value
///
/// 8-bit samples are stored unsigned (offset by 128) as in the WAV container.
/// 24-bit samples are sign extended.
pub fn decode_sample(bytes: &[u8]) -> i32 {
    match bytes.len() {
        1 => bytes[0] as i32 - 128,
        2 => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        3 => {
            let sign = if bytes[2] & 0x80 != 0 { 0xff } else { 0x00 };
            i32::from_le_bytes([bytes[0], bytes[1], bytes[2], sign])
        }
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Encode a signed value into `out`, saturating at the width's range
pub fn encode_sample(value: i64, out: &mut [u8]) {
    let (min, max) = sample_range(out.len());
    let value = value.clamp(min as i64, max as i64) as i32;
    match out.len() {
        1 => out[0] = (value + 128) as u8,
        2 => out.copy_from_slice(&(value as i16).to_le_bytes()),
        3 => out.copy_from_slice(&value.to_le_bytes()[..3]),
        _ => out.copy_from_slice(&value.to_le_bytes()),
    }
}

/// Decoded PCM audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    /// Raw interleaved sample bytes
    pub(crate) frames: Vec<u8>,
    /// Number of channels (1 = mono, 2 = stereo, ...)
    pub(crate) num_channels: u16,
    /// Bytes per sample per channel
    pub(crate) sample_width: u16,
    /// Frames per second
    pub(crate) frame_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer, checking that `frames` holds whole frames only
    ///
    /// # Errors
    /// * `InvalidArgument` - zero channels, width or rate, or a trailing partial frame
    pub fn new(
        frames: Vec<u8>,
        num_channels: u16,
        sample_width: u16,
        frame_rate: u32,
    ) -> Result<Self> {
        if num_channels == 0 || sample_width == 0 || frame_rate == 0 {
            return Err(ArchiveError::invalid_argument(format!(
                "channels ({}), sample width ({}) and frame rate ({}) must be positive",
                num_channels, sample_width, frame_rate
            )));
        }

        let frame_size = num_channels as usize * sample_width as usize;
        if frames.len() % frame_size != 0 {
            return Err(ArchiveError::invalid_argument(format!(
                "{} bytes is not a whole number of {}-byte frames",
                frames.len(),
                frame_size
            )));
        }

        Ok(Self {
            frames,
            num_channels,
            sample_width,
            frame_rate,
        })
    }

    /// Raw interleaved sample bytes
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    /// Bytes per sample per channel
    pub fn sample_width(&self) -> u16 {
        self.sample_width
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Bytes in one frame (one sample for every channel)
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.num_channels as usize * self.sample_width as usize
    }

    /// Number of whole frames in the buffer
    pub fn frame_count(&self) -> usize {
        self.frames.len() / self.frame_size()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.frame_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Crop by time, converting seconds to fractional positions first
    ///
    /// `None` bounds mean "from the start" and "to the end".
    pub fn cropped_secs(&self, start_sec: Option<f64>, end_sec: Option<f64>) -> Result<Self> {
        let (start_percent, end_percent) = crop::time_to_percent(
            &self.frames,
            self.sample_width as usize,
            self.num_channels as usize,
            self.frame_rate,
            start_sec,
            end_sec,
        );
        self.cropped(Some(start_percent), Some(end_percent))
    }

    /// Crop by fractional position, keeping all other metadata
    pub fn cropped(&self, start_percent: Option<f64>, end_percent: Option<f64>) -> Result<Self> {
        let frames = crop::crop(
            &self.frames,
            self.sample_width as usize,
            self.num_channels as usize,
            start_percent,
            end_percent,
        )?;

        Ok(Self {
            frames: frames.to_vec(),
            ..*self
        })
    }
}
