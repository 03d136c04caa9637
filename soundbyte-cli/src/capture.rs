//! # Audio Capture Module
//!
//! Live microphone input through CPAL (Cross-Platform Audio Library).
//!
//! ## Features
//! - Input device enumeration and selection by index
//! - Closest supported sample rate to the request, f32 samples
//! - Multi-channel input mixed down to mono in the callback
//! - Fixed-size chunks handed to the reader over a crossbeam channel
//! - The stream is paused and released when [`CpalStream`] is dropped

use std::time::Duration;

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::Receiver;
use soundbyte_core::audio::{CaptureStream, InputDevice, MicrophoneCapture};

/// How long a read waits for the device before giving up.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Microphone capture on the default CPAL host.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCapture;

/// An open input stream delivering mono chunks.
pub struct CpalStream {
    stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl MicrophoneCapture for CpalCapture {
    type Stream = CpalStream;

    fn devices(&self) -> Result<Vec<InputDevice>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()?
            .enumerate()
            .map(|(index, device)| InputDevice {
                index,
                name: device.name().unwrap_or_else(|_| "<unnamed>".to_string()),
            })
            .collect();
        Ok(devices)
    }

    /// Starts audio capture from the chosen input device.
    ///
    /// This function:
    /// 1. Selects the device (system default when `device` is `None`)
    /// 2. Picks the f32 configuration closest to `sample_rate`
    /// 3. Sets up a callback that mixes to mono and sends full chunks
    fn open(&self, device: Option<usize>, sample_rate: u32, chunk_size: usize) -> Result<CpalStream> {
        anyhow::ensure!(chunk_size > 0, "chunk size must be positive");
        let host = cpal::default_host();
        let device = match device {
            Some(index) => host
                .input_devices()?
                .nth(index)
                .ok_or_else(|| anyhow!("No input device with index {index}"))?,
            None => host
                .default_input_device()
                .ok_or_else(|| anyhow!("No input device available"))?,
        };

        let name = device.name()?;
        tracing::info!(device = %name, "using audio input device");

        let configs = device.supported_input_configs()?.collect::<Vec<_>>();
        let supported_config = find_supported_config(configs, sample_rate)
            .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

        let rate = sample_rate.clamp(
            supported_config.min_sample_rate().0,
            supported_config.max_sample_rate().0,
        );
        let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
        let channels = usize::from(config.channels().max(1));
        let config: cpal::StreamConfig = config.into();

        tracing::info!(sample_rate = rate, channels, chunk_size, "selected input format");

        let (sender, receiver) = crossbeam_channel::unbounded::<Vec<f32>>();
        let err_fn = |err: cpal::StreamError| tracing::warn!(%err, "an error occurred on the audio stream");

        // This buffer accumulates mono audio from the callback.
        let mut audio_buffer: Vec<f32> = Vec::with_capacity(chunk_size * 2);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                audio_buffer.extend(
                    data.chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
                );

                // While we have enough data for a full chunk, send it.
                while audio_buffer.len() >= chunk_size {
                    let chunk: Vec<f32> = audio_buffer.drain(..chunk_size).collect();
                    // The reader may already be gone during shutdown.
                    let _ = sender.send(chunk);
                }
            },
            err_fn,
            None,
        )?;

        stream.play()?;

        Ok(CpalStream {
            stream,
            receiver,
            sample_rate: rate,
        })
    }
}

impl CaptureStream for CpalStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_chunk(&mut self) -> Result<Vec<f32>> {
        self.receiver
            .recv_timeout(READ_TIMEOUT)
            .map_err(|err| anyhow!("no audio from input device: {err}"))
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            tracing::warn!(%err, "error pausing capture stream");
        }
        tracing::info!("capture stream closed");
    }
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only f32 formats qualify. Mono is preferred over multi-channel, then the
/// range closest to `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (i64::from(c.min_sample_rate().0) - i64::from(target_rate)).abs();
            let max_diff = (i64::from(c.max_sample_rate().0) - i64::from(target_rate)).abs();
            let in_range = c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0;
            let rate_penalty = if in_range { 0 } else { min_diff.min(max_diff) };
            (c.channels() != 1, rate_penalty)
        })
}
