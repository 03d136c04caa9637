//! User-adjustable tuner settings.

use serde::{Deserialize, Serialize};

use crate::audio::{BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use crate::error::Result;
use crate::tuning::{PitchTable, STANDARD_A4};

/// Settings persisted between sessions.
///
/// Missing fields fall back to their defaults when deserializing, so older
/// settings files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerSettings {
    /// Concert pitch for A4 in Hz.
    pub reference_a4: f64,
    /// Sample rate for synthesis and capture.
    pub sample_rate: u32,
    /// Samples per live analysis frame.
    pub chunk_size: usize,
    /// RMS level below which a live frame counts as silence.
    pub amplitude_threshold: f32,
    /// Input device index; `None` uses the system default.
    pub input_device: Option<usize>,
}

impl Default for TunerSettings {
    fn default() -> Self {
        TunerSettings {
            reference_a4: STANDARD_A4,
            sample_rate: DEFAULT_SAMPLE_RATE,
            chunk_size: BUFFER_SIZE,
            amplitude_threshold: 0.01,
            input_device: None,
        }
    }
}

impl TunerSettings {
    /// Builds the pitch table these settings describe.
    pub fn pitch_table(&self) -> Result<PitchTable> {
        PitchTable::new(self.reference_a4)
    }
}
