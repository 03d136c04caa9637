//! # Spectral Analysis Module
//!
//! Dominant-frequency extraction and full magnitude spectra.
//!
//! Every call takes the sample rate explicitly. There is no internal default:
//! analysing a 48 kHz capture against a 44.1 kHz frequency axis would
//! silently shift every reported frequency.

use std::path::Path;

use anyhow::Context;

use crate::audio::AudioFileLoader;
use crate::error::{Error, Result};
use crate::fft;

/// Magnitude spectrum with the frequency of every bin.
///
/// Bins are in transform order: non-negative frequencies first, then the
/// mirrored negative half.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f32>,
}

impl Spectrum {
    /// Bin with the largest magnitude over the *whole* spectrum.
    ///
    /// For a real signal the mirrored bins carry the same magnitude as their
    /// positive twins, so the winner may be a negative frequency when rounding
    /// tips the balance. Use [`dominant_frequency`] for a non-negative answer.
    pub fn peak(&self) -> Option<(f64, f32)> {
        let index = argmax(&self.magnitudes)?;
        Some((self.frequencies[index], self.magnitudes[index]))
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Index of the first maximum.
fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

fn check_input(samples: &[f32], sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::Domain("sample rate must be positive".to_string()));
    }
    if samples.len() < 2 {
        return Err(Error::Domain(format!(
            "need at least 2 samples for a spectrum, got {}",
            samples.len()
        )));
    }
    Ok(())
}

/// Frequency of the strongest non-negative FFT bin.
///
/// The whole sequence is transformed without windowing; only bins with
/// index `< n/2` are searched. Resolution is `sample_rate / n` Hz.
pub fn dominant_frequency(samples: &[f32], sample_rate: u32) -> Result<f64> {
    check_input(samples, sample_rate)?;
    let spectrum = fft::forward(samples);
    let magnitudes = fft::spectrum_to_magnitudes(&spectrum);
    let index = argmax(&magnitudes).unwrap_or(0);
    let frequency = fft::bin_frequency(index, samples.len(), sample_rate);
    tracing::debug!(
        len = samples.len(),
        sample_rate,
        bin = index,
        frequency,
        "dominant frequency"
    );
    Ok(frequency)
}

/// All bins of the transform, positive and mirrored negative, with their
/// magnitudes. Intended for plotting and inspection.
pub fn full_spectrum(samples: &[f32], sample_rate: u32) -> Result<Spectrum> {
    check_input(samples, sample_rate)?;
    let len = samples.len();
    let spectrum = fft::forward(samples);
    Ok(Spectrum {
        frequencies: (0..len)
            .map(|k| fft::bin_frequency(k, len, sample_rate))
            .collect(),
        magnitudes: spectrum.iter().map(|c| c.norm()).collect(),
    })
}

/// Loads an audio file and returns its dominant frequency, using the file's
/// own sample rate for the frequency axis.
pub fn dominant_frequency_of_file<L>(loader: &L, path: &Path) -> anyhow::Result<f64>
where
    L: AudioFileLoader + ?Sized,
{
    let wave = loader
        .load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let frequency = dominant_frequency(wave.samples(), wave.sample_rate())
        .with_context(|| format!("analysing {}", path.display()))?;
    Ok(frequency)
}
