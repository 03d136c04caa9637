//! # Fast Fourier Transform (FFT) Module
//!
//! Frequency domain transforms shared by the spectral analyzer and the live
//! frame analysis.
//!
//! ## Features
//! - Forward FFT of any length using RustFFT
//! - Hann windowing for reduced spectral leakage
//! - DC offset removal for accurate analysis
//! - Bin-to-frequency mapping in the usual FFT ordering (negative half last)

use rustfft::{FftPlanner, num_complex::Complex};

/// Removes the DC offset from a signal by making its average value zero.
///
/// DC offset shows up as a large component at 0 Hz, which would otherwise
/// win any peak search on a quiet signal.
///
/// # Arguments
/// * `signal` - Audio signal to process (modified in-place)
pub fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 {
        return;
    }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Applies a Hann window to the input buffer to reduce spectral leakage.
///
/// # Arguments
/// * `buffer` - Audio buffer to window (modified in-place)
pub fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Performs a forward FFT on a signal and returns the complex spectrum.
///
/// The input is transformed as-is, with no windowing, so the result is the
/// plain discrete Fourier transform of the whole sequence.
///
/// # Arguments
/// * `signal` - Input audio signal, any length
///
/// # Returns
/// * `Vec<Complex<f32>>` - Complex spectrum with `signal.len()` bins
pub fn forward(signal: &[f32]) -> Vec<Complex<f32>> {
    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&sample| Complex { re: sample, im: 0.0 })
        .collect();
    if buffer.is_empty() {
        return buffer;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Performs a forward FFT after DC offset removal and Hann windowing.
///
/// This is the transform used for display spectra of live frames.
pub fn windowed_forward(signal: &[f32]) -> Vec<Complex<f32>> {
    let mut processed_signal = signal.to_vec();
    remove_dc_offset(&mut processed_signal);
    apply_hann_window(&mut processed_signal);
    forward(&processed_signal)
}

/// Calculates the magnitude vector from a complex spectrum for display.
///
/// Only the first half of the spectrum (below the Nyquist frequency) is kept.
///
/// # Arguments
/// * `spectrum` - Complex frequency spectrum from FFT
///
/// # Returns
/// * `Vec<f32>` - Magnitude spectrum for visualization
pub fn spectrum_to_magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum
        .iter()
        .take(spectrum.len() / 2)
        .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
        .collect()
}

/// Frequency in Hz of bin `index` of an `len`-point transform.
///
/// Bins in the upper half map to negative frequencies, matching the
/// conventional `fftfreq` layout: `[0, 1, ..., -2, -1] * sample_rate / len`.
pub fn bin_frequency(index: usize, len: usize, sample_rate: u32) -> f64 {
    let resolution = f64::from(sample_rate) / len as f64;
    if index < len.div_ceil(2) {
        index as f64 * resolution
    } else {
        (index as f64 - len as f64) * resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_offset_is_removed() {
        let mut signal = vec![1.5_f32, 2.5, 1.5, 2.5];
        remove_dc_offset(&mut signal);
        assert!(signal.iter().sum::<f32>().abs() < 1e-6);
        assert_eq!(signal, vec![-0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn hann_window_tapers_edges() {
        let mut buffer = vec![1.0_f32; 9];
        apply_hann_window(&mut buffer);
        assert!(buffer[0].abs() < 1e-6);
        assert!(buffer[8].abs() < 1e-6);
        assert!((buffer[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_of_impulse_is_flat() {
        let mut impulse = vec![0.0_f32; 16];
        impulse[0] = 1.0;
        let spectrum = forward(&impulse);
        assert_eq!(spectrum.len(), 16);
        assert!(spectrum.iter().all(|c| (c.norm() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn forward_of_empty_signal_is_empty() {
        assert!(forward(&[]).is_empty());
    }

    #[test]
    fn magnitudes_keep_lower_half() {
        let spectrum = forward(&[0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0]);
        let magnitudes = spectrum_to_magnitudes(&spectrum);
        assert_eq!(magnitudes.len(), 4);
        // Quarter-rate sine lands in bin 2.
        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(2));
    }

    #[test]
    fn bin_frequencies_follow_fft_layout() {
        let even: Vec<f64> = (0..4).map(|k| bin_frequency(k, 4, 4)).collect();
        assert_eq!(even, vec![0.0, 1.0, -2.0, -1.0]);
        let odd: Vec<f64> = (0..5).map(|k| bin_frequency(k, 5, 5)).collect();
        assert_eq!(odd, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }
}
