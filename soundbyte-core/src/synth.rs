//! # Waveform Synthesis Module
//!
//! Pure sine tones and unnormalized chords sampled on an even time grid.

use std::f64::consts::TAU;

use crate::waveform::Waveform;

/// Number of samples covering `duration_s` seconds, rounded down.
///
/// Non-positive or non-finite durations cover no samples.
pub fn sample_count(duration_s: f64, sample_rate: u32) -> usize {
    let exact = duration_s * f64::from(sample_rate);
    if exact.is_finite() && exact > 0.0 {
        exact.floor() as usize
    } else {
        0
    }
}

/// Sample times `t_i = i * duration / n` for `i` in `0..n` (end excluded).
fn time_grid(duration_s: f64, len: usize) -> impl Iterator<Item = f64> {
    let step = if len > 0 { duration_s / len as f64 } else { 0.0 };
    (0..len).map(move |i| i as f64 * step)
}

/// Generates `floor(duration * sample_rate)` samples of `sin(2π·f·t)`.
///
/// The amplitude spans [-1, 1].
pub fn sine_wave(duration_s: f64, sample_rate: u32, frequency: f64) -> Waveform {
    let len = sample_count(duration_s, sample_rate);
    let samples = time_grid(duration_s, len)
        .map(|t| (TAU * frequency * t).sin() as f32)
        .collect();
    Waveform::new(samples, sample_rate)
}

/// Pointwise sum of one sine wave per frequency.
///
/// The result is **not** normalized: with N frequencies the amplitude can
/// reach ±N, so it must be normalized or clipped before encoding.
pub fn chord(duration_s: f64, sample_rate: u32, frequencies: &[f64]) -> Waveform {
    let len = sample_count(duration_s, sample_rate);
    let samples = time_grid(duration_s, len)
        .map(|t| {
            frequencies
                .iter()
                .map(|&f| (TAU * f * t).sin())
                .sum::<f64>() as f32
        })
        .collect();
    Waveform::new(samples, sample_rate)
}
