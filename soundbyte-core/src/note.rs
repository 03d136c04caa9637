//! # Note Name Module
//!
//! Spelled pitches (`C4`, `F#3`, `Bb-1`) and the twelve-tone name tables they
//! are checked against.
//!
//! ## Features
//! - Sharp and flat spellings of the chromatic scale, index 0 = C
//! - Parsing of `<letter>[accidental]<octave>` with typed errors
//! - Enharmonic spellings resolve to the same semitone index

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Chromatic note names spelled with sharps, starting at C.
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Chromatic note names spelled with flats, starting at C.
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Looks up a note name (no octave) in the sharp table, then the flat table.
///
/// The lookup is exact and case-sensitive.
pub fn semitone_of(name: &str) -> Option<usize> {
    SHARP_NAMES
        .iter()
        .position(|&n| n == name)
        .or_else(|| FLAT_NAMES.iter().position(|&n| n == name))
}

/// Accidental attached to a note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// A spelled pitch: letter, accidental and octave.
///
/// A `Pitch` can only hold spellings that appear in [`SHARP_NAMES`] or
/// [`FLAT_NAMES`], so its semitone index is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    letter: char,
    accidental: Accidental,
    octave: i32,
}

impl Pitch {
    /// Builds a pitch, rejecting letters outside A-G and spellings such as
    /// `E#` or `Cb` that neither name table contains.
    pub fn new(letter: char, accidental: Accidental, octave: i32) -> Result<Self> {
        let pitch = Pitch { letter, accidental, octave };
        if !('A'..='G').contains(&letter) {
            return Err(Error::Parse(pitch.to_string()));
        }
        if semitone_of(&pitch.name()).is_none() {
            return Err(Error::UnknownPitch(pitch.to_string()));
        }
        Ok(pitch)
    }

    /// Sharp-spelled pitch for an absolute semitone count above C0.
    ///
    /// Negative counts land in negative octaves (floor division).
    pub fn from_semitones(semitones: i64) -> Self {
        let octave = semitones.div_euclid(12) as i32;
        let index = semitones.rem_euclid(12) as usize;
        let name = SHARP_NAMES[index];
        let letter = name.chars().next().unwrap_or('C');
        let accidental = if name.len() > 1 {
            Accidental::Sharp
        } else {
            Accidental::Natural
        };
        Pitch { letter, accidental, octave }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Note name without the octave, as spelled (`"Db"`, `"F#"`, `"A"`).
    pub fn name(&self) -> String {
        format!("{}{}", self.letter, self.accidental.symbol())
    }

    /// Index into the twelve-tone octave, 0 = C.
    pub fn semitone(&self) -> usize {
        // Construction guarantees the name is in one of the tables.
        semitone_of(&self.name()).unwrap_or(0)
    }

    /// Semitones above C0.
    pub fn absolute_semitones(&self) -> i64 {
        self.semitone() as i64 + i64::from(self.octave) * 12
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter, self.accidental.symbol(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::Parse(s.to_string());
        let mut chars = s.chars();

        let letter = chars.next().ok_or_else(malformed)?;
        if !('A'..='G').contains(&letter) {
            return Err(malformed());
        }

        let rest = chars.as_str();
        let (accidental, octave_text) = match rest.chars().next() {
            Some('#') => (Accidental::Sharp, &rest[1..]),
            Some('b') => (Accidental::Flat, &rest[1..]),
            _ => (Accidental::Natural, rest),
        };

        let digits = octave_text.strip_prefix('-').unwrap_or(octave_text);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let octave: i32 = octave_text.parse().map_err(|_| malformed())?;

        Pitch::new(letter, accidental, octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_natural_sharp_and_flat() {
        let a4: Pitch = "A4".parse().unwrap();
        assert_eq!(a4.letter(), 'A');
        assert_eq!(a4.accidental(), Accidental::Natural);
        assert_eq!(a4.octave(), 4);

        let cs: Pitch = "C#3".parse().unwrap();
        assert_eq!(cs.accidental(), Accidental::Sharp);
        assert_eq!(cs.semitone(), 1);

        let bb: Pitch = "Bb-1".parse().unwrap();
        assert_eq!(bb.accidental(), Accidental::Flat);
        assert_eq!(bb.octave(), -1);
        assert_eq!(bb.semitone(), 10);
    }

    #[test]
    fn enharmonic_spellings_share_a_semitone() {
        let sharp: Pitch = "C#4".parse().unwrap();
        let flat: Pitch = "Db4".parse().unwrap();
        assert_ne!(sharp, flat);
        assert_eq!(sharp.absolute_semitones(), flat.absolute_semitones());
    }

    #[test]
    fn malformed_names_are_parse_errors() {
        for text in ["", "Z#4", "a4", "C", "C#", "Cd9", "C4.5", "C--1", "H2"] {
            assert!(
                matches!(text.parse::<Pitch>(), Err(Error::Parse(_))),
                "{text:?} should be a parse error"
            );
        }
    }

    #[test]
    fn spellings_missing_from_both_tables_are_lookup_errors() {
        for text in ["E#4", "B#2", "Cb5", "Fb1"] {
            assert!(
                matches!(text.parse::<Pitch>(), Err(Error::UnknownPitch(_))),
                "{text:?} should be an unknown pitch"
            );
        }
    }

    #[test]
    fn from_semitones_uses_floor_division() {
        assert_eq!(Pitch::from_semitones(57).to_string(), "A4");
        assert_eq!(Pitch::from_semitones(0).to_string(), "C0");
        assert_eq!(Pitch::from_semitones(-1).to_string(), "B-1");
        assert_eq!(Pitch::from_semitones(-13).to_string(), "B-2");
    }

    #[test]
    fn display_round_trips() {
        for text in ["G#7", "Eb2", "F0", "A-3"] {
            let pitch: Pitch = text.parse().unwrap();
            assert_eq!(pitch.to_string(), text);
        }
    }

    #[test]
    fn table_lookup_prefers_sharps_then_flats() {
        assert_eq!(semitone_of("E"), Some(4));
        assert_eq!(semitone_of("Gb"), Some(6));
        assert_eq!(semitone_of("A#"), Some(10));
        assert_eq!(semitone_of("gb"), None);
    }
}
