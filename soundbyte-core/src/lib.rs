// soundbyte-core/src/lib.rs

//! The core logic for the SoundByte pitch toolkit.
//! This crate is responsible for pitch/frequency conversion, tuning
//! classification, tone synthesis, song rendering and spectral analysis.
//! It is completely headless: files, devices and the command line live
//! behind the traits in [`audio`].

pub mod analysis;
pub mod audio;
pub mod error;
pub mod fft;
pub mod note;
pub mod settings;
pub mod song;
pub mod spectrum;
pub mod synth;
pub mod tuning;
pub mod waveform;

pub use analysis::{AnalysisResult, analyze_frame};
pub use error::{Error, Result};
pub use note::{Accidental, Pitch};
pub use settings::TunerSettings;
pub use song::{NoteEvent, Song, SongSequencer, Tone, parse_song};
pub use spectrum::{Spectrum, dominant_frequency, full_spectrum};
pub use tuning::{Direction, PitchConverter, PitchTable, TuningBand, TuningReading};
pub use waveform::Waveform;
