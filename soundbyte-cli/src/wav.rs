//! WAV file reading and writing.

use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use soundbyte_core::Waveform;
use soundbyte_core::audio::{AudioFileLoader, WaveformEncoder};

/// Mono PCM WAV files through `hound`.
#[derive(Debug, Clone, Copy)]
pub struct WavFile {
    /// Integer bit depth used when encoding (16 or 24).
    pub bits_per_sample: u16,
}

impl Default for WavFile {
    fn default() -> Self {
        WavFile { bits_per_sample: 16 }
    }
}

impl WaveformEncoder for WavFile {
    /// Normalizes to full scale, quantizes, clips to the integer range and
    /// writes a single-channel PCM file.
    fn encode(&self, wave: &Waveform, path: &Path) -> Result<()> {
        if !matches!(self.bits_per_sample, 16 | 24) {
            bail!("unsupported bit depth {}", self.bits_per_sample);
        }
        let normalized = wave
            .normalized()
            .context("waveform has no signal to encode")?;

        let spec = WavSpec {
            channels: 1,
            sample_rate: wave.sample_rate(),
            bits_per_sample: self.bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        let max_val = ((1_i32 << (self.bits_per_sample - 1)) - 1) as f32;
        let min_val = -(1_i32 << (self.bits_per_sample - 1)) as f32;

        let mut writer = WavWriter::create(path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for &sample in normalized.samples() {
            let int_sample = (sample * max_val).clamp(min_val, max_val) as i32;
            writer.write_sample(int_sample)?;
        }
        writer.finalize()?;

        tracing::info!(
            path = %path.display(),
            samples = wave.len(),
            sample_rate = wave.sample_rate(),
            "wrote wav"
        );
        Ok(())
    }
}

impl AudioFileLoader for WavFile {
    /// Reads any PCM or float WAV, scaling integers to [-1, 1] and mixing
    /// multi-channel files down to mono by averaging.
    fn load(&self, path: &Path) -> Result<Waveform> {
        let reader =
            WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        // Mix down to mono if multi-channel
        let mono = if channels > 1 {
            samples
                .chunks(channels)
                .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
                .collect()
        } else {
            samples
        };

        tracing::debug!(
            path = %path.display(),
            channels,
            sample_rate = spec.sample_rate,
            frames = mono.len(),
            "loaded wav"
        );
        Ok(Waveform::new(mono, spec.sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundbyte_core::{dominant_frequency, synth};
    use tempfile::NamedTempFile;

    #[test]
    fn encode_then_load_keeps_length_and_pitch() {
        let wave = synth::sine_wave(0.5, 22050, 440.0);
        let file = NamedTempFile::new().unwrap();
        WavFile::default().encode(&wave, file.path()).unwrap();

        let loaded = WavFile::default().load(file.path()).unwrap();
        assert_eq!(loaded.len(), wave.len());
        assert_eq!(loaded.sample_rate(), 22050);
        let freq = dominant_frequency(loaded.samples(), loaded.sample_rate()).unwrap();
        assert!((freq - 440.0).abs() < 2.0);
    }

    #[test]
    fn chords_are_normalized_before_quantizing() {
        let wave = synth::chord(0.25, 8000, &[440.0, 550.0, 660.0]);
        assert!(wave.peak() > 1.0);
        let file = NamedTempFile::new().unwrap();
        WavFile::default().encode(&wave, file.path()).unwrap();

        let loaded = WavFile::default().load(file.path()).unwrap();
        assert!(loaded.peak() <= 1.0);
        assert!(loaded.peak() > 0.99);
    }

    #[test]
    fn silent_waveform_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let err = WavFile::default()
            .encode(&Waveform::silent(100, 44100), file.path())
            .unwrap_err();
        assert!(err.to_string().contains("no signal"));
    }

    #[test]
    fn stereo_files_are_mixed_to_mono() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(16384_i16).unwrap();
            writer.write_sample(0_i16).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = WavFile::default().load(file.path()).unwrap();
        assert_eq!(loaded.len(), 10);
        assert!(loaded.samples().iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn unsupported_bit_depth_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        let wave = synth::sine_wave(0.1, 8000, 440.0);
        assert!(WavFile { bits_per_sample: 12 }.encode(&wave, file.path()).is_err());
    }
}
