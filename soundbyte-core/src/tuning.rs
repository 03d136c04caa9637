//! # Musical Tuning Module
//!
//! Equal temperament reference data and the conversions built on it:
//! pitch names to frequencies and back, cent deviations, and tuning
//! classification for a measured frequency.
//!
//! ## Features
//! - Configurable reference pitch (A4 = 440 Hz by default), C0 derived from it
//! - Frequency to sharp-spelled pitch name with floor-division octaves
//! - Cent deviation against a fixed reference table of naturals, C2 to B5
//! - Tuning bands with an explicit unclassified outcome

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{Error, Result, ensure_positive};
use crate::note::{self, Pitch};

/// Concert pitch used by the standard table.
pub const STANDARD_A4: f64 = 440.0;

/// Octaves covered by the cents reference table.
const REFERENCE_OCTAVES: std::ops::RangeInclusive<i32> = 2..=5;
const NATURALS: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

/// A4 sits 4.75 octaves (57 semitones) above C0.
const A4_SEMITONES: i64 = 57;

/// Statically computed standard table (A4 = 440 Hz).
///
/// Built once on first use and only ever read afterwards.
static STANDARD: Lazy<PitchTable> = Lazy::new(|| PitchTable::build(STANDARD_A4));

/// A single entry of the cents reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNote {
    /// Note name (e.g., "A4", "C2")
    pub name: String,
    /// Frequency in Hz
    pub frequency: f64,
}

/// Immutable equal temperament reference data.
#[derive(Debug, Clone)]
pub struct PitchTable {
    a4: f64,
    c0: f64,
    reference: Vec<ReferenceNote>,
}

impl PitchTable {
    /// Builds a table around a custom reference pitch for A4.
    pub fn new(a4: f64) -> Result<Self> {
        ensure_positive(a4)?;
        Ok(Self::build(a4))
    }

    /// The shared A4 = 440 Hz table.
    pub fn standard() -> &'static PitchTable {
        &STANDARD
    }

    fn build(a4: f64) -> Self {
        let c0 = a4 * 2.0_f64.powf(-4.75);
        let mut table = PitchTable {
            a4,
            c0,
            reference: Vec::new(),
        };

        let reference = REFERENCE_OCTAVES
            .flat_map(|octave| NATURALS.iter().map(move |&name| (name, octave)))
            .map(|(name, octave)| {
                let index = note::semitone_of(name).unwrap_or(0) as i64;
                ReferenceNote {
                    name: format!("{name}{octave}"),
                    frequency: table.equal_tempered(index + i64::from(octave) * 12),
                }
            })
            .collect();
        table.reference = reference;
        table
    }

    /// Frequency `semitones` above C0, measured from A4 so that A4 itself
    /// is exact.
    fn equal_tempered(&self, semitones: i64) -> f64 {
        self.a4 * 2.0_f64.powf((semitones - A4_SEMITONES) as f64 / 12.0)
    }

    pub fn a4(&self) -> f64 {
        self.a4
    }

    /// Frequency of C in octave 0.
    pub fn c0(&self) -> f64 {
        self.c0
    }

    /// The 28 reference frequencies `cents_off` measures against.
    pub fn reference_notes(&self) -> &[ReferenceNote] {
        &self.reference
    }
}

/// Ordered bands for the magnitude of a cent deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TuningBand {
    /// `|cents| < 4`
    InTune,
    /// `4 <= |cents| < 13`
    SlightlyOut,
    /// `13 <= |cents| < 26`
    ReallyOut,
    /// `26 <= |cents| < 99`
    VeryOut,
    /// `|cents| >= 99`: too far from any reference to classify.
    Unclassified,
}

impl TuningBand {
    pub fn from_cents(cents: f64) -> Self {
        let magnitude = cents.abs();
        if magnitude < 4.0 {
            TuningBand::InTune
        } else if magnitude < 13.0 {
            TuningBand::SlightlyOut
        } else if magnitude < 26.0 {
            TuningBand::ReallyOut
        } else if magnitude < 99.0 {
            TuningBand::VeryOut
        } else {
            TuningBand::Unclassified
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TuningBand::InTune => "In Tune",
            TuningBand::SlightlyOut => "Out of Tune",
            TuningBand::ReallyOut => "Really Out of Tune",
            TuningBand::VeryOut => "Very Out of Tune",
            TuningBand::Unclassified => "Unclassified",
        }
    }
}

/// Direction label derived from the sign of [`PitchConverter::cents_off`].
///
/// Negative cents (input above the reference) are labelled `Flat` and
/// everything else `Sharp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Sharp,
    Flat,
}

/// Everything the tuner reports for one measured frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningReading {
    pub frequency: f64,
    /// Nearest pitch in equal temperament, sharp spelling.
    pub pitch_name: String,
    /// Reference table entry the cents were measured against.
    pub reference_name: String,
    pub cents: f64,
    pub band: TuningBand,
    pub direction: Direction,
}

/// Frequency/pitch conversions over a borrowed [`PitchTable`].
#[derive(Debug, Clone, Copy)]
pub struct PitchConverter<'t> {
    table: &'t PitchTable,
}

impl Default for PitchConverter<'static> {
    fn default() -> Self {
        PitchConverter::new(PitchTable::standard())
    }
}

impl<'t> PitchConverter<'t> {
    pub fn new(table: &'t PitchTable) -> Self {
        PitchConverter { table }
    }

    pub fn table(&self) -> &'t PitchTable {
        self.table
    }

    /// Parses a pitch name and returns its equal temperament frequency.
    pub fn pitch_to_frequency(&self, name: &str) -> Result<f64> {
        let pitch: Pitch = name.parse()?;
        self.frequency_of(&pitch)
    }

    /// Frequency of an already-parsed pitch.
    ///
    /// Octaves so extreme that the result overflows to infinity or
    /// underflows to zero are a domain error.
    pub fn frequency_of(&self, pitch: &Pitch) -> Result<f64> {
        let freq = self.table.equal_tempered(pitch.absolute_semitones());
        if freq.is_finite() && freq > 0.0 {
            Ok(freq)
        } else {
            Err(Error::Domain(format!(
                "{pitch} has no representable frequency"
            )))
        }
    }

    /// Nearest equal temperament pitch, spelled with sharps.
    pub fn frequency_to_pitch(&self, freq: f64) -> Result<Pitch> {
        let freq = ensure_positive(freq)?;
        let semitones = (12.0 * (freq / self.table.c0).log2()).round_ties_even();
        Ok(Pitch::from_semitones(semitones as i64))
    }

    /// Name of the nearest pitch, e.g. `"A4"` for 440 Hz.
    pub fn frequency_to_pitch_name(&self, freq: f64) -> Result<String> {
        Ok(self.frequency_to_pitch(freq)?.to_string())
    }

    /// Index of a note name in the chromatic scale, 0 = C.
    ///
    /// A trailing octave number is ignored, so `"C#9"` and `"C#"` both give 1.
    /// Returns `None` when the note part is in neither name table.
    pub fn semitone_index(&self, name: &str) -> Option<usize> {
        let without_digits = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let note_part = if without_digits.len() < name.len() {
            without_digits.strip_suffix('-').unwrap_or(without_digits)
        } else {
            without_digits
        };
        note::semitone_of(note_part)
    }

    /// Closest entry of the reference table by absolute difference in Hz.
    fn nearest_reference(&self, freq: f64) -> &'t ReferenceNote {
        let reference = &self.table.reference;
        let mut nearest = &reference[0];
        for candidate in &reference[1..] {
            if (candidate.frequency - freq).abs() < (nearest.frequency - freq).abs() {
                nearest = candidate;
            }
        }
        nearest
    }

    /// Cents between `freq` and the nearest reference note.
    ///
    /// Positive when `freq` is below the reference, negative when above.
    /// Frequencies outside C2-B5 are measured against the nearest table edge.
    pub fn cents_off(&self, freq: f64) -> Result<f64> {
        let freq = ensure_positive(freq)?;
        let nearest = self.nearest_reference(freq);
        Ok(1200.0 * (nearest.frequency / freq).log2())
    }

    pub fn tuning_classification(&self, freq: f64) -> Result<TuningBand> {
        Ok(TuningBand::from_cents(self.cents_off(freq)?))
    }

    pub fn sharp_or_flat(&self, freq: f64) -> Result<Direction> {
        let cents = self.cents_off(freq)?;
        Ok(if cents < 0.0 {
            Direction::Flat
        } else {
            Direction::Sharp
        })
    }

    /// Computes the full [`TuningReading`] for a measured frequency.
    pub fn reading(&self, freq: f64) -> Result<TuningReading> {
        let pitch_name = self.frequency_to_pitch_name(freq)?;
        let nearest = self.nearest_reference(freq);
        let cents = 1200.0 * (nearest.frequency / freq).log2();
        let reading = TuningReading {
            frequency: freq,
            pitch_name,
            reference_name: nearest.name.clone(),
            cents,
            band: TuningBand::from_cents(cents),
            direction: if cents < 0.0 {
                Direction::Flat
            } else {
                Direction::Sharp
            },
        };
        tracing::debug!(
            freq,
            cents = reading.cents,
            band = ?reading.band,
            "tuning reading"
        );
        Ok(reading)
    }
}
