//! Playback sinks and handles
//!
//! A sink accepts a [`SampleBuffer`] and starts playing it in the background,
//! returning a [`PlaybackHandle`]. The only blocking operation is
//! [`PlaybackHandle::wait_done`].

use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::buffer::SampleBuffer;
use crate::error::{ArchiveError, Result};

type DeferredWait = Box<dyn FnOnce() -> Result<()> + Send>;

enum HandleState {
    Thread(JoinHandle<Result<()>>),
    Deferred(DeferredWait),
    Finished,
}

/// Token for an in-flight or finished playback
///
/// Consumed by [`wait_done`](Self::wait_done), so it can be awaited exactly once.
pub struct PlaybackHandle {
    state: HandleState,
}

impl PlaybackHandle {
    /// Handle backed by a playback thread; waiting joins it
    pub fn from_thread(thread: JoinHandle<Result<()>>) -> Self {
        Self {
            state: HandleState::Thread(thread),
        }
    }

    /// Handle whose wait runs `wait` on the caller's thread
    pub fn deferred<F>(wait: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            state: HandleState::Deferred(Box::new(wait)),
        }
    }

    /// Handle for playback that has already completed
    pub fn finished() -> Self {
        Self {
            state: HandleState::Finished,
        }
    }

    /// Block until the audio has fully played
    pub fn wait_done(self) -> Result<()> {
        match self.state {
            HandleState::Thread(thread) => thread.join().map_err(|_| ArchiveError::Playback {
                reason: "playback thread panicked".to_string(),
            })?,
            HandleState::Deferred(wait) => wait(),
            HandleState::Finished => Ok(()),
        }
    }
}

impl fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            HandleState::Thread(_) => "thread",
            HandleState::Deferred(_) => "deferred",
            HandleState::Finished => "finished",
        };
        f.debug_struct("PlaybackHandle").field("state", &state).finish()
    }
}

/// Destination for decoded audio
pub trait PlaybackSink: Send + Sync {
    /// Start playing `buffer` without waiting for it to finish
    fn submit(&self, buffer: &SampleBuffer) -> Result<PlaybackHandle>;
}

// ============================================================================
// Clock sink
// ============================================================================

/// Headless sink that only keeps time
///
/// Each submission runs on its own thread for the buffer's duration. Used when
/// no output device support is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSink;

impl ClockSink {
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackSink for ClockSink {
    fn submit(&self, buffer: &SampleBuffer) -> Result<PlaybackHandle> {
        if buffer.is_empty() {
            return Ok(PlaybackHandle::finished());
        }

        let duration = Duration::from_secs_f64(buffer.duration_secs());
        tracing::debug!(secs = duration.as_secs_f64(), "clock sink playing");

        let thread = thread::Builder::new()
            .name("clock-sink".to_string())
            .spawn(move || {
                thread::sleep(duration);
                Ok(())
            })?;

        Ok(PlaybackHandle::from_thread(thread))
    }
}

// ============================================================================
// Device sink
// ============================================================================

#[cfg(feature = "device-output")]
pub use device::DeviceSink;

#[cfg(feature = "device-output")]
mod device {
    use std::sync::mpsc;
    use std::thread;

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, Sink};

    use super::{PlaybackHandle, PlaybackSink};
    use crate::engine::buffer::{decode_sample, SampleBuffer};
    use crate::error::{ArchiveError, Result};

    /// Sink that plays through the default output device
    ///
    /// The output stream is not `Send`, so every submission opens the device
    /// on its own playback thread and reports open failures back before
    /// `submit` returns.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DeviceSink;

    impl DeviceSink {
        pub fn new() -> Self {
            Self
        }
    }

    impl PlaybackSink for DeviceSink {
        fn submit(&self, buffer: &SampleBuffer) -> Result<PlaybackHandle> {
            let samples = to_i16(buffer);
            let channels = buffer.num_channels();
            let rate = buffer.frame_rate();
            let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

            let thread = thread::Builder::new()
                .name("device-sink".to_string())
                .spawn(move || {
                    let opened = OutputStream::try_default()
                        .map_err(|e| e.to_string())
                        .and_then(|(stream, handle)| {
                            Sink::try_new(&handle)
                                .map(|sink| (stream, sink))
                                .map_err(|e| e.to_string())
                        });

                    let (_stream, sink) = match opened {
                        Ok(opened) => {
                            let _ = ready_tx.send(Ok(()));
                            opened
                        }
                        Err(reason) => {
                            let _ = ready_tx.send(Err(ArchiveError::Playback {
                                reason: reason.clone(),
                            }));
                            return Err(ArchiveError::Playback { reason });
                        }
                    };

                    sink.append(SamplesBuffer::new(channels, rate, samples));
                    sink.sleep_until_end();
                    Ok(())
                })?;

            match ready_rx.recv() {
                Ok(Ok(())) => Ok(PlaybackHandle::from_thread(thread)),
                Ok(Err(e)) => {
                    let _ = thread.join();
                    Err(e)
                }
                Err(_) => Err(ArchiveError::Playback {
                    reason: "output thread exited before opening the device".to_string(),
                }),
            }
        }
    }

    pub(super) fn to_i16(buffer: &SampleBuffer) -> Vec<i16> {
        let width = buffer.sample_width() as usize;
        let shift = (width.saturating_sub(2) * 8) as u32;
        buffer
            .frames()
            .chunks_exact(width)
            .map(|bytes| {
                let value = decode_sample(bytes);
                if width == 1 {
                    (value << 8) as i16
                } else {
                    (value >> shift) as i16
                }
            })
            .collect()
    }
}
