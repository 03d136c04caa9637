//! # Song Sequencer Module
//!
//! Parses the plain-text song format and renders it to a single waveform.
//!
//! ```text
//! 120
//! C4, 0.5
//! E4, 0.5
//! 392.0, 1
//! ```
//!
//! The first line is the tempo in beats per minute. Every following
//! non-blank line is `<pitch>, <beats>`, where `<pitch>` is a pitch name or a
//! frequency in Hz. Notes are rendered as pure sine tones and joined end to
//! end with no envelope, so note boundaries are abrupt.

use std::str::FromStr;

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::error::{Error, Result};
use crate::note::Pitch;
use crate::synth;
use crate::tuning::PitchConverter;
use crate::waveform::Waveform;

/// Longest single note accepted, in seconds.
pub const MAX_NOTE_SECONDS: f64 = 600.0;
/// Longest song accepted, in seconds.
pub const MAX_SONG_SECONDS: f64 = 3600.0;

/// What a note event sounds: a spelled pitch or a raw frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Pitch(Pitch),
    Frequency(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub tone: Tone,
    /// Duration in beats, always positive.
    pub beats: f64,
}

impl NoteEvent {
    /// Seconds this note lasts at `bpm`.
    pub fn seconds(&self, bpm: u32) -> f64 {
        self.beats * 60.0 / f64::from(bpm)
    }
}

/// A tempo plus an ordered list of notes.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Tempo in beats per minute, always positive.
    pub bpm: u32,
    pub notes: Vec<NoteEvent>,
}

impl Song {
    /// Total length in seconds, before rounding to whole samples.
    pub fn duration_secs(&self) -> f64 {
        self.notes.iter().map(|n| n.seconds(self.bpm)).sum()
    }
}

impl FromStr for Song {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        parse_song(text)
    }
}

fn format_error(line: usize, message: impl Into<String>) -> Error {
    Error::Format {
        line,
        message: message.into(),
    }
}

fn parse_tone(token: &str, line: usize) -> Result<Tone> {
    match token.parse::<Pitch>() {
        Ok(pitch) => Ok(Tone::Pitch(pitch)),
        Err(pitch_err) => match token.parse::<f64>() {
            Ok(freq) if freq.is_finite() && freq > 0.0 => Ok(Tone::Frequency(freq)),
            Ok(freq) => Err(format_error(line, format!("frequency must be positive, got {freq}"))),
            Err(_) => Err(format_error(line, pitch_err.to_string())),
        },
    }
}

fn parse_note(text: &str, line: usize) -> Result<NoteEvent> {
    let (pitch, beats) = text
        .split_once(',')
        .ok_or_else(|| format_error(line, format!("expected `<pitch>, <beats>`, got {text:?}")))?;

    let tone = parse_tone(pitch.trim(), line)?;
    let beats: f64 = beats
        .trim()
        .parse()
        .map_err(|_| format_error(line, format!("invalid beat count {:?}", beats.trim())))?;
    if !(beats.is_finite() && beats > 0.0) {
        return Err(format_error(line, format!("beat count must be positive, got {beats}")));
    }

    Ok(NoteEvent { tone, beats })
}

/// Parses song text: a BPM header line followed by note lines.
///
/// Blank note lines are skipped. Line numbers in errors are 1-based.
/// Notes longer than [`MAX_NOTE_SECONDS`], or songs running past
/// [`MAX_SONG_SECONDS`], are rejected before anything is synthesized.
pub fn parse_song(text: &str) -> Result<Song> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let (_, header) = lines
        .next()
        .ok_or_else(|| format_error(1, "missing tempo line"))?;
    let bpm: u32 = header
        .parse()
        .map_err(|_| format_error(1, format!("tempo must be a whole number, got {header:?}")))?;
    if bpm == 0 {
        return Err(format_error(1, "tempo must be positive"));
    }

    let mut notes = Vec::new();
    let mut total_seconds = 0.0;
    for (number, text) in lines.filter(|(_, l)| !l.is_empty()) {
        let note = parse_note(text, number)?;
        let seconds = note.seconds(bpm);
        if seconds > MAX_NOTE_SECONDS {
            return Err(format_error(
                number,
                format!("note lasts {seconds} s, longer than {MAX_NOTE_SECONDS} s"),
            ));
        }
        total_seconds += seconds;
        if total_seconds > MAX_SONG_SECONDS {
            return Err(format_error(
                number,
                format!("song runs past {MAX_SONG_SECONDS} s"),
            ));
        }
        notes.push(note);
    }

    tracing::debug!(bpm, notes = notes.len(), "parsed song");
    Ok(Song { bpm, notes })
}

/// Renders songs through a [`PitchConverter`] at a fixed sample rate.
#[derive(Debug, Clone, Copy)]
pub struct SongSequencer<'t> {
    converter: PitchConverter<'t>,
    sample_rate: u32,
}

impl Default for SongSequencer<'static> {
    fn default() -> Self {
        SongSequencer::new(PitchConverter::default(), DEFAULT_SAMPLE_RATE)
    }
}

impl<'t> SongSequencer<'t> {
    pub fn new(converter: PitchConverter<'t>, sample_rate: u32) -> Self {
        SongSequencer {
            converter,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frequency in Hz a note sounds at.
    pub fn frequency(&self, tone: &Tone) -> Result<f64> {
        match tone {
            Tone::Pitch(pitch) => self.converter.frequency_of(pitch),
            Tone::Frequency(freq) => Ok(*freq),
        }
    }

    /// Synthesizes every note in order and concatenates the results.
    pub fn render_song(&self, song: &Song) -> Result<Waveform> {
        let parts = song
            .notes
            .iter()
            .map(|note| {
                let seconds = note.seconds(song.bpm);
                let frequency = self.frequency(&note.tone)?;
                tracing::debug!(seconds, frequency, "rendering note");
                Ok(synth::sine_wave(seconds, self.sample_rate, frequency))
            })
            .collect::<Result<Vec<_>>>()?;
        let wave = Waveform::concat(self.sample_rate, parts)?;
        tracing::info!(
            notes = song.notes.len(),
            seconds = wave.duration_secs(),
            "rendered song"
        );
        Ok(wave)
    }

    /// Parses and renders in one step.
    pub fn render_text(&self, text: &str) -> Result<Waveform> {
        self.render_song(&parse_song(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum;

    const THREE_C4S: &str = "120\nC4, 0.5\nC4, 0.5\nC4, 0.5\n";

    #[test]
    fn parses_header_and_notes() {
        let song = parse_song(THREE_C4S).unwrap();
        assert_eq!(song.bpm, 120);
        assert_eq!(song.notes.len(), 3);
        let c4: Pitch = "C4".parse().unwrap();
        assert!(song.notes.iter().all(|n| n.tone == Tone::Pitch(c4) && n.beats == 0.5));
        assert!((song.duration_secs() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn rendered_length_matches_tempo() {
        let wave = SongSequencer::default().render_text(THREE_C4S).unwrap();
        let expected = (3.0 / 120.0) * 60.0 * 0.5;
        assert!((wave.duration_secs() - expected).abs() < 0.1);
        assert_eq!(wave.len(), 3 * 11025);
    }

    #[test]
    fn blank_lines_and_frequencies_are_accepted() {
        let song: Song = "60\n\nA4, 1\n   \n261.63, 2\n".parse().unwrap();
        assert_eq!(song.notes.len(), 2);
        assert_eq!(song.notes[1].tone, Tone::Frequency(261.63));
        assert_eq!(song.notes[1].seconds(60), 2.0);
    }

    #[test]
    fn notes_render_in_order() {
        let sequencer = SongSequencer::new(PitchConverter::default(), 8000);
        let wave = sequencer.render_text("60\nA4, 1\nA5, 1\n").unwrap();
        assert_eq!(wave.len(), 16000);
        let (first, second) = wave.samples().split_at(8000);
        assert!((spectrum::dominant_frequency(first, 8000).unwrap() - 440.0).abs() < 1.0);
        assert!((spectrum::dominant_frequency(second, 8000).unwrap() - 880.0).abs() < 1.0);
    }

    #[test]
    fn empty_song_renders_silence_of_zero_length() {
        let wave = SongSequencer::default().render_text("90\n").unwrap();
        assert!(wave.is_empty());
    }

    #[test]
    fn unrepresentable_pitches_fail_instead_of_rendering_noise() {
        let err = SongSequencer::default()
            .render_text("60\nC2000, 1\n")
            .unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
    }

    #[test]
    fn long_notes_within_limits_are_accepted() {
        let song = parse_song("60\nC4, 600\nC4, 600\n").unwrap();
        assert_eq!(song.duration_secs(), 1200.0);
    }

    #[test]
    fn malformed_headers_are_format_errors() {
        for text in ["", "fast\nC4, 1", "0\nC4, 1", "-5\nC4, 1", "120.5\nC4, 1"] {
            assert!(
                matches!(parse_song(text), Err(Error::Format { line: 1, .. })),
                "{text:?}"
            );
        }
    }

    #[test]
    fn malformed_note_lines_report_their_line() {
        let cases = [
            ("120\nC4 0.5", 2),
            ("120\nC4, 0.5\nC4, half", 3),
            ("120\nC4, 0", 2),
            ("120\nC4, -1", 2),
            ("120\n\nZ9, 1", 3),
            ("120\nE#4, 1", 2),
            ("120\n-440, 1", 2),
            ("60\nC4, 1e12", 2),
            ("60\nC4, 601", 2),
            ("60\nC4, 600\nC4, 600\nC4, 600\nC4, 600\nC4, 600\nC4, 600\nC4, 1", 8),
        ];
        for (text, line) in cases {
            match parse_song(text) {
                Err(Error::Format { line: got, .. }) => assert_eq!(got, line, "{text:?}"),
                other => panic!("{text:?} gave {other:?}"),
            }
        }
    }
}
