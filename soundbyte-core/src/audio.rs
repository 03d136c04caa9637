//! # Audio Capability Module
//!
//! The core never touches files or hardware itself. These traits describe the
//! outside collaborators it is handed: something that loads audio files,
//! something that encodes waveforms to disk, and a microphone.
//!
//! ## Resource handling
//! A [`CaptureStream`] owns a live hardware stream. Implementations release
//! the stream in `Drop`, so it is closed on every exit path, including a
//! failed [`CaptureStream::read_chunk`] propagated with `?`.

use std::path::Path;

use anyhow::Result;

use crate::waveform::Waveform;

/// Audio buffer size for live analysis frames.
///
/// Larger buffers give finer frequency resolution but increase latency.
pub const BUFFER_SIZE: usize = 2048;

/// Sample rate used when nothing else is configured (CD quality).
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Loads an audio file as a mono waveform at the file's own sample rate.
pub trait AudioFileLoader {
    fn load(&self, path: &Path) -> Result<Waveform>;
}

/// Writes a waveform to an uncompressed PCM container.
///
/// Implementations normalize the amplitude to the target bit depth and clip
/// to the valid integer range; the core hands over ±1 for a single tone and
/// ±N for an N-note chord.
pub trait WaveformEncoder {
    fn encode(&self, wave: &Waveform, path: &Path) -> Result<()>;
}

/// An audio input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub index: usize,
    pub name: String,
}

/// Enumerates input devices and opens capture streams on them.
pub trait MicrophoneCapture {
    type Stream: CaptureStream;

    fn devices(&self) -> Result<Vec<InputDevice>>;

    /// Opens a stream on `device` (the system default when `None`) that
    /// yields chunks of `chunk_size` samples.
    fn open(&self, device: Option<usize>, sample_rate: u32, chunk_size: usize) -> Result<Self::Stream>;
}

/// An open capture stream. Dropping it closes the stream.
pub trait CaptureStream {
    /// Rate the device actually runs at, which may differ from the request.
    fn sample_rate(&self) -> u32;

    /// Blocks until the next chunk of mono samples is available.
    fn read_chunk(&mut self) -> Result<Vec<f32>>;
}

/// Reads `chunks` consecutive chunks from a stream into one waveform.
pub fn record<S: CaptureStream + ?Sized>(stream: &mut S, chunks: usize) -> Result<Waveform> {
    let mut samples = Vec::new();
    for _ in 0..chunks {
        samples.extend(stream.read_chunk()?);
    }
    Ok(Waveform::new(samples, stream.sample_rate()))
}
