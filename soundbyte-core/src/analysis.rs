//! # Frame Analysis Module
//!
//! Turns one frame of captured audio into tuner feedback: detected
//! frequency, nearest note, cent deviation and tuning band, plus a display
//! spectrum.

use serde::Serialize;

use crate::fft;
use crate::spectrum;
use crate::tuning::{PitchConverter, TuningBand};

/// Represents the result of a single audio analysis frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    /// The dominant frequency in Hz.
    pub detected_frequency: Option<f64>,
    /// The name of the nearest note.
    pub note_name: Option<String>,
    /// The deviation from the nearest reference note in cents.
    pub cents_deviation: Option<f64>,
    /// How far out of tune the frame is.
    pub band: Option<TuningBand>,
    /// Windowed magnitude spectrum below Nyquist, for display.
    pub spectrogram_data: Vec<f32>,
}

/// Root mean square level of a frame.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Performs a full analysis on a single frame of audio data.
///
/// This function processes raw audio data through the analysis pipeline:
/// 1. Computes a windowed spectrum for display
/// 2. Removes the DC offset and gates out frames whose remaining RMS is
///    below `amplitude_threshold`
/// 3. Finds the dominant frequency of the centered frame
/// 4. Converts it to a note name, cent deviation and tuning band
///
/// Frames that are silent, too short or yield no usable frequency come back
/// with every optional field set to `None`.
pub fn analyze_frame(
    frame: &[f32],
    sample_rate: u32,
    converter: &PitchConverter<'_>,
    amplitude_threshold: f32,
) -> AnalysisResult {
    let spectrogram_data = fft::spectrum_to_magnitudes(&fft::windowed_forward(frame));
    let mut result = AnalysisResult {
        spectrogram_data,
        ..AnalysisResult::default()
    };

    // Microphone bias would otherwise win the 0 Hz bin and pass the gate.
    let mut centered = frame.to_vec();
    fft::remove_dc_offset(&mut centered);

    // --- Noise Gate: filter out silence/noise ---
    if rms(&centered) < amplitude_threshold {
        return result;
    }

    let reading = spectrum::dominant_frequency(&centered, sample_rate)
        .and_then(|freq| converter.reading(freq));
    match reading {
        Ok(reading) => {
            result.detected_frequency = Some(reading.frequency);
            result.note_name = Some(reading.pitch_name);
            result.cents_deviation = Some(reading.cents);
            result.band = Some(reading.band);
        }
        // A frame with no usable peak lands on 0 Hz, which has no pitch.
        Err(err) => tracing::debug!(%err, "frame has no usable pitch"),
    }
    result
}
