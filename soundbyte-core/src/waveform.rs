//! Time-domain sample buffers.

use crate::error::{Error, Result};

/// An ordered run of mono samples at a fixed sample rate.
///
/// Samples are dimensionless: a single tone spans [-1, 1], a chord of N
/// tones spans [-N, N]. Quantization is left to a
/// [`WaveformEncoder`](crate::audio::WaveformEncoder).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Waveform {
            samples,
            sample_rate,
        }
    }

    pub fn silent(len: usize, sample_rate: u32) -> Self {
        Waveform::new(vec![0.0; len], sample_rate)
    }

    /// Joins waveforms end to end, in order, with no cross-fade.
    ///
    /// Every part must share `sample_rate`.
    pub fn concat<I>(sample_rate: u32, parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Waveform>,
    {
        let mut samples = Vec::new();
        for part in parts {
            if part.sample_rate != sample_rate {
                return Err(Error::Domain(format!(
                    "cannot join a {} Hz waveform into a {} Hz one",
                    part.sample_rate, sample_rate
                )));
            }
            samples.extend(part.samples);
        }
        Ok(Waveform::new(samples, sample_rate))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds, 0 when the sample rate is unset.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Scales the waveform so its peak absolute sample is exactly 1.
    ///
    /// An all-silent (or empty) waveform has no peak to scale by and is
    /// reported as a domain error instead of producing NaN samples.
    pub fn normalized(&self) -> Result<Waveform> {
        let peak = self.peak();
        if peak == 0.0 || !peak.is_finite() {
            return Err(Error::Domain(format!(
                "cannot normalize a waveform with peak amplitude {peak}"
            )));
        }
        let samples = self.samples.iter().map(|s| s / peak).collect();
        Ok(Waveform::new(samples, self.sample_rate))
    }
}
